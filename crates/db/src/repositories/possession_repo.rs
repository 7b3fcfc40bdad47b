//! Repository for the `possessions` table.

use sqlx::PgPool;

use estato_core::query::{
    counts_by_key, paginate, summarize, FilterBuilder, GroupSpec, ListConfig, Page, QueryError,
    Sort, SortOrder,
};
use estato_core::status::possession as possession_status;
use estato_core::types::DbId;

use crate::models::possession::{
    CreatePossession, Possession, PossessionListQuery, PossessionSummary, UpdatePossession,
};
use crate::store::PgStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, plot_id, member_id, status, scheduled_for, handed_over_at, remarks, \
    created_by, updated_by, created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &[],
    sortable_fields: &["created_at", "status", "scheduled_for"],
    default_sort: Sort {
        field: "created_at",
        order: SortOrder::Desc,
    },
    default_limit: 20,
};

const BY_STATUS: GroupSpec = GroupSpec {
    group_by: "status",
    sum_fields: &[],
    avg_fields: &[],
};

/// Provides CRUD, listing, and workflow operations for possessions.
pub struct PossessionRepo;

impl PossessionRepo {
    /// Open a possession request, returning the created row.
    /// Status starts at `requested`.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePossession,
        actor: Option<DbId>,
    ) -> Result<Possession, sqlx::Error> {
        let query = format!(
            "INSERT INTO possessions (plot_id, member_id, remarks, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Possession>(&query)
            .bind(input.plot_id)
            .bind(input.member_id)
            .bind(&input.remarks)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a possession by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Possession>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM possessions WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Possession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with filters and a by-status summary computed
    /// over the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &PossessionListQuery,
    ) -> Result<Page<Possession, PossessionSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.reference("member_id", params.member_id.as_deref())?;
        filter.one_of("status", &params.statuses);
        filter.date_range("created_at", params.requested_from, params.requested_to);
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<Possession>::new(pool, "possessions", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_STATUS).await?;

        let summary = PossessionSummary {
            total: groups.iter().map(|g| g.count).sum(),
            by_status: counts_by_key(&groups),
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Amend schedule or remarks. Only non-`None` fields are applied.
    /// Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePossession,
        actor: Option<DbId>,
    ) -> Result<Option<Possession>, sqlx::Error> {
        let query = format!(
            "UPDATE possessions SET
                scheduled_for = COALESCE($2, scheduled_for),
                remarks = COALESCE($3, remarks),
                updated_by = $4,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Possession>(&query)
            .bind(id)
            .bind(input.scheduled_for)
            .bind(&input.remarks)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Move a possession to a new workflow status. Transition legality is
    /// checked by the caller. Reaching `handed_over` stamps the handover
    /// time. Returns `None` if no live row matches.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        actor: Option<DbId>,
    ) -> Result<Option<Possession>, sqlx::Error> {
        let handed_over = status == possession_status::HANDED_OVER;
        let query = format!(
            "UPDATE possessions SET
                status = $2,
                handed_over_at = CASE WHEN $3 THEN NOW() ELSE handed_over_at END,
                updated_by = $4,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Possession>(&query)
            .bind(id)
            .bind(status)
            .bind(handed_over)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a possession. Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE possessions SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
