//! Repository for the `installments` table.

use sqlx::PgPool;

use estato_core::billing;
use estato_core::query::{
    counts_by_key, paginate, ratio, summarize, FilterBuilder, GroupSpec, ListConfig, Page,
    QueryError, Sort, SortOrder,
};
use estato_core::types::DbId;

use crate::models::installment::{
    CreateInstallment, Installment, InstallmentListQuery, InstallmentSummary, UpdateInstallment,
};
use crate::store::PgStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, plot_id, member_id, installment_no, amount, paid_amount, due_date, \
    status, last_payment_at, created_by, updated_by, \
    created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &[],
    sortable_fields: &["due_date", "installment_no", "amount", "status", "created_at"],
    default_sort: Sort {
        field: "due_date",
        order: SortOrder::Asc,
    },
    default_limit: 20,
};

/// By-status groups carrying scheduled and collected amounts per status.
const BY_STATUS: GroupSpec = GroupSpec {
    group_by: "status",
    sum_fields: &["amount", "paid_amount"],
    avg_fields: &[],
};

/// Provides CRUD, listing, and payment operations for installments.
pub struct InstallmentRepo;

impl InstallmentRepo {
    /// Insert one installment of a payment plan, returning the created row.
    /// Status defaults to `pending` with nothing paid.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInstallment,
        actor: Option<DbId>,
    ) -> Result<Installment, sqlx::Error> {
        let query = format!(
            "INSERT INTO installments
                (plot_id, member_id, installment_no, amount, due_date, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Installment>(&query)
            .bind(input.plot_id)
            .bind(input.member_id)
            .bind(input.installment_no)
            .bind(input.amount)
            .bind(input.due_date)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find an installment by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Installment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM installments WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Installment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with filters and a collection summary computed
    /// over the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &InstallmentListQuery,
    ) -> Result<Page<Installment, InstallmentSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.reference("plot_id", params.plot_id.as_deref())?;
        filter.reference("member_id", params.member_id.as_deref())?;
        filter.one_of("status", &params.statuses);
        filter.date_range("due_date", params.due_from, params.due_to);
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<Installment>::new(pool, "installments", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_STATUS).await?;

        let total_amount: f64 = groups.iter().filter_map(|g| g.sums.first()).sum();
        let total_paid: f64 = groups.iter().filter_map(|g| g.sums.get(1)).sum();

        let summary = InstallmentSummary {
            total: groups.iter().map(|g| g.count).sum(),
            by_status: counts_by_key(&groups),
            total_amount,
            total_paid,
            collection_pct: ratio(total_paid, total_amount) * 100.0,
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Correct an installment's schedule. Only non-`None` fields are
    /// applied. Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInstallment,
        actor: Option<DbId>,
    ) -> Result<Option<Installment>, sqlx::Error> {
        let query = format!(
            "UPDATE installments SET
                amount = COALESCE($2, amount),
                due_date = COALESCE($3, due_date),
                updated_by = $4,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Installment>(&query)
            .bind(id)
            .bind(input.amount)
            .bind(input.due_date)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Record a payment against an installment. The paid amount
    /// accumulates and the status is re-derived from the new total.
    /// Returns `None` if no live row matches.
    pub async fn record_payment(
        pool: &PgPool,
        id: DbId,
        payment: f64,
        actor: Option<DbId>,
    ) -> Result<Option<Installment>, sqlx::Error> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let new_paid = billing::round_money(current.paid_amount + payment);
        let status = billing::installment_status(current.amount, new_paid);

        let query = format!(
            "UPDATE installments SET
                paid_amount = $2,
                status = $3,
                last_payment_at = NOW(),
                updated_by = $4,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Installment>(&query)
            .bind(id)
            .bind(new_paid)
            .bind(status)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an installment. Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE installments SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
