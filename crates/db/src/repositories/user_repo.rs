//! Repository for the `users` table.

use sqlx::PgPool;

use estato_core::query::{
    counts_by_key, paginate, summarize, FilterBuilder, GroupSpec, ListConfig, Page, QueryError,
    Scalar, Sort, SortOrder,
};
use estato_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User, UserListQuery, UserSummary};
use crate::store::PgStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, username, email, password_hash, role_id, is_active, last_login_at, \
    created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &["username", "email"],
    sortable_fields: &["username", "email", "created_at", "last_login_at"],
    default_sort: Sort {
        field: "username",
        order: SortOrder::Asc,
    },
    default_limit: 20,
};

/// Active/inactive headcount groups.
const BY_ACTIVE: GroupSpec = GroupSpec {
    group_by: "is_active",
    sum_fields: &[],
    avg_fields: &[],
};

/// Headcount per role.
const BY_ROLE: GroupSpec = GroupSpec {
    group_by: "role_id",
    sum_fields: &[],
    avg_fields: &[],
};

/// Provides CRUD and listing operations for staff users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username or email, for login. Excludes soft-deleted
    /// rows; inactive users are still returned so the caller can reject
    /// them with a specific message.
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE (username = $1 OR email = $1) AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    /// Paginated staff listing with an active/inactive summary computed
    /// over the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &UserListQuery,
    ) -> Result<Page<User, UserSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.search(&LIST_CONFIG, params.list.search.as_deref());
        filter.reference("role_id", params.role_id.as_deref())?;
        if let Some(active) = params.is_active {
            filter.eq("is_active", Scalar::Bool(active));
        }
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<User>::new(pool, "users", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_ACTIVE).await?;
        let role_groups = summarize(&store, &predicate, &BY_ROLE).await?;

        let count_for = |key: &str| -> i64 {
            groups
                .iter()
                .filter(|g| g.key.as_deref() == Some(key))
                .map(|g| g.count)
                .sum()
        };
        let summary = UserSummary {
            total: groups.iter().map(|g| g.count).sum(),
            active: count_for("true"),
            inactive: count_for("false"),
            by_role: counts_by_key(&role_groups),
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Update a user. Only non-`None` fields are applied.
    /// Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                role_id = COALESCE($4, role_id),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(input.role_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Replace a user's password hash. Returns `true` if a row was updated.
    pub async fn set_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp a successful login.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Soft-delete a user. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
