//! Repository for the `members` table.

use sqlx::PgPool;

use estato_core::query::{
    counts_by_key, paginate, summarize, FilterBuilder, GroupSpec, ListConfig, Page, QueryError,
    Sort, SortOrder,
};
use estato_core::types::DbId;

use crate::models::member::{
    CreateMember, Member, MemberListQuery, MemberSummary, UpdateMember,
};
use crate::store::PgStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, membership_no, name, cnic, phone, email, address, status, joined_at, \
    created_by, updated_by, created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &["membership_no", "name", "cnic", "phone"],
    sortable_fields: &["name", "membership_no", "joined_at", "status", "created_at"],
    default_sort: Sort {
        field: "joined_at",
        order: SortOrder::Desc,
    },
    default_limit: 20,
};

const BY_STATUS: GroupSpec = GroupSpec {
    group_by: "status",
    sum_fields: &[],
    avg_fields: &[],
};

/// Provides CRUD and listing operations for members.
pub struct MemberRepo;

impl MemberRepo {
    /// Insert a new member, returning the created row.
    /// Status defaults to `active`; `joined_at` defaults to now.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMember,
        actor: Option<DbId>,
    ) -> Result<Member, sqlx::Error> {
        let query = format!(
            "INSERT INTO members
                (membership_no, name, cnic, phone, email, address, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(&input.membership_no)
            .bind(&input.name)
            .bind(&input.cnic)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.address)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a member by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with filters and a by-status summary computed
    /// over the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &MemberListQuery,
    ) -> Result<Page<Member, MemberSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.search(&LIST_CONFIG, params.list.search.as_deref());
        filter.one_of("status", &params.statuses);
        filter.date_range("joined_at", params.joined_from, params.joined_to);
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<Member>::new(pool, "members", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_STATUS).await?;

        let summary = MemberSummary {
            total: groups.iter().map(|g| g.count).sum(),
            by_status: counts_by_key(&groups),
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Update a member. Only non-`None` fields are applied.
    /// Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMember,
        actor: Option<DbId>,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "UPDATE members SET
                name = COALESCE($2, name),
                cnic = COALESCE($3, cnic),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                address = COALESCE($6, address),
                status = COALESCE($7, status),
                updated_by = $8,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.cnic)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.address)
            .bind(&input.status)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a member. Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE members SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted member. Returns `true` if a row was restored.
    pub async fn restore(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE members SET deleted_at = NULL, updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
