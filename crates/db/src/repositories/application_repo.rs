//! Repositories for the `applications` and `application_types` tables.

use sqlx::PgPool;

use estato_core::query::{
    counts_by_key, paginate, summarize, FilterBuilder, GroupSpec, ListConfig, Page, QueryError,
    Sort, SortOrder,
};
use estato_core::types::DbId;

use crate::models::application::{
    Application, ApplicationListQuery, ApplicationSummary, ApplicationType, CreateApplication,
    UpdateApplication,
};
use crate::store::PgStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, application_no, applicant_name, cnic, phone, application_type_id, \
    status, submitted_at, remarks, created_by, updated_by, \
    created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &["application_no", "applicant_name", "cnic", "phone"],
    sortable_fields: &["submitted_at", "applicant_name", "status", "created_at"],
    default_sort: Sort {
        field: "submitted_at",
        order: SortOrder::Desc,
    },
    default_limit: 20,
};

const BY_STATUS: GroupSpec = GroupSpec {
    group_by: "status",
    sum_fields: &[],
    avg_fields: &[],
};

/// Provides CRUD and listing operations for applications.
pub struct ApplicationRepo;

impl ApplicationRepo {
    /// Insert a new application, returning the created row.
    /// Status defaults to `pending`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateApplication,
        actor: Option<DbId>,
    ) -> Result<Application, sqlx::Error> {
        let query = format!(
            "INSERT INTO applications
                (application_no, applicant_name, cnic, phone, application_type_id,
                 remarks, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(&input.application_no)
            .bind(&input.applicant_name)
            .bind(&input.cnic)
            .bind(&input.phone)
            .bind(input.application_type_id)
            .bind(&input.remarks)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find an application by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Application>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM applications WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with filters and a by-status summary computed
    /// over the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &ApplicationListQuery,
    ) -> Result<Page<Application, ApplicationSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.search(&LIST_CONFIG, params.list.search.as_deref());
        filter.reference(
            "application_type_id",
            params.application_type_id.as_deref(),
        )?;
        filter.one_of("status", &params.statuses);
        filter.date_range("submitted_at", params.submitted_from, params.submitted_to);
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<Application>::new(pool, "applications", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_STATUS).await?;

        let summary = ApplicationSummary {
            total: groups.iter().map(|g| g.count).sum(),
            by_status: counts_by_key(&groups),
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Update an application's editable fields. Only non-`None` fields
    /// are applied. Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateApplication,
        actor: Option<DbId>,
    ) -> Result<Option<Application>, sqlx::Error> {
        let query = format!(
            "UPDATE applications SET
                applicant_name = COALESCE($2, applicant_name),
                cnic = COALESCE($3, cnic),
                phone = COALESCE($4, phone),
                application_type_id = COALESCE($5, application_type_id),
                remarks = COALESCE($6, remarks),
                updated_by = $7,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(&input.applicant_name)
            .bind(&input.cnic)
            .bind(&input.phone)
            .bind(input.application_type_id)
            .bind(&input.remarks)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Move an application to a new status. Transition legality is checked
    /// by the caller. Returns `None` if no live row matches.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        actor: Option<DbId>,
    ) -> Result<Option<Application>, sqlx::Error> {
        let query = format!(
            "UPDATE applications SET status = $2, updated_by = $3, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(status)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an application. Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE applications
             SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted application. Returns `true` if a row was
    /// restored.
    pub async fn restore(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE applications
             SET deleted_at = NULL, updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Read access to the seeded application types.
pub struct ApplicationTypeRepo;

impl ApplicationTypeRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<ApplicationType>, sqlx::Error> {
        sqlx::query_as::<_, ApplicationType>(
            "SELECT id, name, description, created_at FROM application_types ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ApplicationType>, sqlx::Error> {
        sqlx::query_as::<_, ApplicationType>(
            "SELECT id, name, description, created_at FROM application_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
