//! Repository for the `defaulters` table.

use sqlx::PgPool;

use estato_core::query::{
    avg_across, counts_by_key, paginate, sum_across, summarize, FilterBuilder, GroupSpec,
    ListConfig, Page, QueryError, Sort, SortOrder,
};
use estato_core::types::DbId;

use crate::models::defaulter::{
    CreateDefaulter, Defaulter, DefaulterListQuery, DefaulterSummary, UpdateDefaulter,
};
use crate::store::PgStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, member_id, plot_id, outstanding_amount, oldest_due_date, stage, \
    created_by, updated_by, created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &[],
    sortable_fields: &["outstanding_amount", "oldest_due_date", "stage", "created_at"],
    default_sort: Sort {
        field: "outstanding_amount",
        order: SortOrder::Desc,
    },
    default_limit: 20,
};

/// By-stage groups carrying the outstanding amount per stage, both summed
/// and averaged.
const BY_STAGE: GroupSpec = GroupSpec {
    group_by: "stage",
    sum_fields: &["outstanding_amount"],
    avg_fields: &["outstanding_amount"],
};

/// Provides CRUD, listing, and escalation operations for defaulters.
pub struct DefaulterRepo;

impl DefaulterRepo {
    /// Open a defaulter record, returning the created row.
    /// Stage starts at `notice_1`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDefaulter,
        actor: Option<DbId>,
    ) -> Result<Defaulter, sqlx::Error> {
        let query = format!(
            "INSERT INTO defaulters
                (member_id, plot_id, outstanding_amount, oldest_due_date,
                 created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Defaulter>(&query)
            .bind(input.member_id)
            .bind(input.plot_id)
            .bind(input.outstanding_amount)
            .bind(input.oldest_due_date)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a defaulter record by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Defaulter>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM defaulters WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Defaulter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with filters and a recovery summary computed over
    /// the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &DefaulterListQuery,
    ) -> Result<Page<Defaulter, DefaulterSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.reference("member_id", params.member_id.as_deref())?;
        filter.one_of("stage", &params.stages);
        filter.amount_range(
            "outstanding_amount",
            params.min_outstanding,
            params.max_outstanding,
        );
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<Defaulter>::new(pool, "defaulters", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_STAGE).await?;

        let summary = DefaulterSummary {
            total: groups.iter().map(|g| g.count).sum(),
            by_stage: counts_by_key(&groups),
            total_outstanding: sum_across(&groups, 0),
            avg_outstanding: avg_across(&groups, 0),
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Update the outstanding position. Only non-`None` fields are
    /// applied. Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDefaulter,
        actor: Option<DbId>,
    ) -> Result<Option<Defaulter>, sqlx::Error> {
        let query = format!(
            "UPDATE defaulters SET
                outstanding_amount = COALESCE($2, outstanding_amount),
                oldest_due_date = COALESCE($3, oldest_due_date),
                updated_by = $4,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Defaulter>(&query)
            .bind(id)
            .bind(input.outstanding_amount)
            .bind(input.oldest_due_date)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Escalate a defaulter to a later stage. Ladder legality is checked
    /// by the caller. Returns `None` if no live row matches.
    pub async fn set_stage(
        pool: &PgPool,
        id: DbId,
        stage: &str,
        actor: Option<DbId>,
    ) -> Result<Option<Defaulter>, sqlx::Error> {
        let query = format!(
            "UPDATE defaulters SET stage = $2, updated_by = $3, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Defaulter>(&query)
            .bind(id)
            .bind(stage)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Close (soft-delete) a defaulter record, e.g. after full recovery.
    /// Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE defaulters SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
