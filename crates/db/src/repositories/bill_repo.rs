//! Repository for the `bills` table.

use sqlx::PgPool;

use estato_core::query::{
    counts_by_key, paginate, ratio, summarize, FilterBuilder, GroupSpec, ListConfig, Page,
    QueryError, Sort, SortOrder,
};
use estato_core::status::bill as bill_status;
use estato_core::types::DbId;

use crate::models::bill::{Bill, BillListQuery, BillSummary, CreateBill, UpdateBill};
use crate::store::PgStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, bill_no, member_id, plot_id, bill_type, amount, late_surcharge_pct, \
    due_date, status, paid_at, created_by, updated_by, \
    created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &["bill_no"],
    sortable_fields: &["due_date", "amount", "status", "bill_no", "created_at"],
    default_sort: Sort {
        field: "due_date",
        order: SortOrder::Desc,
    },
    default_limit: 20,
};

/// By-status groups carrying the billed amount per status.
const BY_STATUS: GroupSpec = GroupSpec {
    group_by: "status",
    sum_fields: &["amount"],
    avg_fields: &[],
};

/// Provides CRUD, listing, and payment operations for bills.
pub struct BillRepo;

impl BillRepo {
    /// Insert a new bill, returning the created row.
    /// Status defaults to `unpaid`; the late surcharge defaults to 10%.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBill,
        actor: Option<DbId>,
    ) -> Result<Bill, sqlx::Error> {
        let query = format!(
            "INSERT INTO bills
                (bill_no, member_id, plot_id, bill_type, amount, late_surcharge_pct,
                 due_date, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 10), $7, $8, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bill>(&query)
            .bind(&input.bill_no)
            .bind(input.member_id)
            .bind(input.plot_id)
            .bind(&input.bill_type)
            .bind(input.amount)
            .bind(input.late_surcharge_pct)
            .bind(input.due_date)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a bill by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bills WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Bill>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with filters and a collection summary computed
    /// over the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &BillListQuery,
    ) -> Result<Page<Bill, BillSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.search(&LIST_CONFIG, params.list.search.as_deref());
        filter.reference("member_id", params.member_id.as_deref())?;
        filter.reference("plot_id", params.plot_id.as_deref())?;
        filter.one_of("bill_type", &params.bill_types);
        filter.one_of("status", &params.statuses);
        filter.date_range("due_date", params.due_from, params.due_to);
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<Bill>::new(pool, "bills", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_STATUS).await?;

        let total_amount: f64 = groups.iter().filter_map(|g| g.sums.first()).sum();
        let paid_amount: f64 = groups
            .iter()
            .filter(|g| g.key.as_deref() == Some(bill_status::PAID))
            .filter_map(|g| g.sums.first())
            .sum();

        let summary = BillSummary {
            total: groups.iter().map(|g| g.count).sum(),
            by_status: counts_by_key(&groups),
            total_amount,
            paid_amount,
            collection_pct: ratio(paid_amount, total_amount) * 100.0,
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Update a bill's editable fields. Only non-`None` fields are applied.
    /// Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBill,
        actor: Option<DbId>,
    ) -> Result<Option<Bill>, sqlx::Error> {
        let query = format!(
            "UPDATE bills SET
                bill_type = COALESCE($2, bill_type),
                amount = COALESCE($3, amount),
                late_surcharge_pct = COALESCE($4, late_surcharge_pct),
                due_date = COALESCE($5, due_date),
                updated_by = $6,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bill>(&query)
            .bind(id)
            .bind(&input.bill_type)
            .bind(input.amount)
            .bind(input.late_surcharge_pct)
            .bind(input.due_date)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Settle an unpaid bill. Returns `None` if there is no live unpaid
    /// bill with this ID.
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<Option<Bill>, sqlx::Error> {
        let query = format!(
            "UPDATE bills
             SET status = 'paid', paid_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'unpaid' AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bill>(&query)
            .bind(id)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Waive an unpaid bill. Returns `None` if there is no live unpaid
    /// bill with this ID.
    pub async fn waive(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<Option<Bill>, sqlx::Error> {
        let query = format!(
            "UPDATE bills
             SET status = 'waived', updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'unpaid' AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bill>(&query)
            .bind(id)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a bill. Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bills SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
