//! Repositories for the `plots` and `plot_categories` tables.

use sqlx::PgPool;

use estato_core::query::{
    counts_by_key, paginate, summarize, FilterBuilder, GroupSpec, ListConfig, Page, QueryError,
    Scalar, Sort, SortOrder,
};
use estato_core::types::DbId;

use crate::models::plot::{
    CreatePlot, CreatePlotCategory, Plot, PlotCategory, PlotListQuery, PlotSummary, UpdatePlot,
    UpdatePlotCategory,
};
use crate::store::PgStore;

/// Column list for `plots` queries.
const COLUMNS: &str = "\
    id, plot_no, block, category_id, is_corner, is_park_facing, is_main_road, \
    status, created_by, updated_by, created_at, updated_at, deleted_at";

/// Column list for `plot_categories` queries.
const CATEGORY_COLUMNS: &str = "\
    id, name, size_marla, base_price, corner_surcharge_pct, \
    park_facing_surcharge_pct, main_road_surcharge_pct, \
    created_by, updated_by, created_at, updated_at, deleted_at";

const LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &["plot_no", "block"],
    sortable_fields: &["plot_no", "block", "status", "created_at"],
    default_sort: Sort {
        field: "plot_no",
        order: SortOrder::Asc,
    },
    default_limit: 20,
};

const CATEGORY_LIST_CONFIG: ListConfig = ListConfig {
    searchable_fields: &["name"],
    sortable_fields: &["name", "size_marla", "base_price", "created_at"],
    default_sort: Sort {
        field: "name",
        order: SortOrder::Asc,
    },
    default_limit: 20,
};

const BY_STATUS: GroupSpec = GroupSpec {
    group_by: "status",
    sum_fields: &[],
    avg_fields: &[],
};

/// Provides CRUD and listing operations for plots.
pub struct PlotRepo;

impl PlotRepo {
    /// Insert a new plot, returning the created row.
    /// Status defaults to `available`; feature flags default to false.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePlot,
        actor: Option<DbId>,
    ) -> Result<Plot, sqlx::Error> {
        let query = format!(
            "INSERT INTO plots
                (plot_no, block, category_id, is_corner, is_park_facing, is_main_road,
                 created_by, updated_by)
             VALUES ($1, $2, $3, COALESCE($4, false), COALESCE($5, false),
                     COALESCE($6, false), $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(&input.plot_no)
            .bind(&input.block)
            .bind(input.category_id)
            .bind(input.is_corner)
            .bind(input.is_park_facing)
            .bind(input.is_main_road)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a plot by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plots WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Plot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with filters and a by-status summary computed
    /// over the full filtered set.
    pub async fn list(
        pool: &PgPool,
        params: &PlotListQuery,
    ) -> Result<Page<Plot, PlotSummary>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.search(&LIST_CONFIG, params.list.search.as_deref());
        filter.reference("category_id", params.category_id.as_deref())?;
        if let Some(block) = params.block.as_deref() {
            if !block.trim().is_empty() {
                filter.eq("block", Scalar::Text(block.trim().to_string()));
            }
        }
        filter.one_of("status", &params.statuses);
        let predicate = filter.build();

        let (page, limit) = LIST_CONFIG.page_and_limit(&params.list);
        let sort =
            LIST_CONFIG.resolve_sort(params.list.sort_by.as_deref(), params.list.sort_order);

        let store = PgStore::<Plot>::new(pool, "plots", COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        let groups = summarize(&store, &predicate, &BY_STATUS).await?;

        let summary = PlotSummary {
            total: groups.iter().map(|g| g.count).sum(),
            by_status: counts_by_key(&groups),
        };
        Ok(Page::with_summary(records, meta, summary))
    }

    /// Update a plot. Only non-`None` fields are applied.
    /// Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlot,
        actor: Option<DbId>,
    ) -> Result<Option<Plot>, sqlx::Error> {
        let query = format!(
            "UPDATE plots SET
                plot_no = COALESCE($2, plot_no),
                block = COALESCE($3, block),
                category_id = COALESCE($4, category_id),
                is_corner = COALESCE($5, is_corner),
                is_park_facing = COALESCE($6, is_park_facing),
                is_main_road = COALESCE($7, is_main_road),
                status = COALESCE($8, status),
                updated_by = $9,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plot>(&query)
            .bind(id)
            .bind(&input.plot_no)
            .bind(&input.block)
            .bind(input.category_id)
            .bind(input.is_corner)
            .bind(input.is_park_facing)
            .bind(input.is_main_road)
            .bind(&input.status)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a plot. Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE plots SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted plot. Returns `true` if a row was restored.
    pub async fn restore(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE plots SET deleted_at = NULL, updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD and listing operations for plot categories.
pub struct PlotCategoryRepo;

impl PlotCategoryRepo {
    /// Insert a new category, returning the created row.
    /// Surcharge percentages default to 0.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePlotCategory,
        actor: Option<DbId>,
    ) -> Result<PlotCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO plot_categories
                (name, size_marla, base_price, corner_surcharge_pct,
                 park_facing_surcharge_pct, main_road_surcharge_pct,
                 created_by, updated_by)
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), COALESCE($6, 0), $7, $7)
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, PlotCategory>(&query)
            .bind(&input.name)
            .bind(input.size_marla)
            .bind(input.base_price)
            .bind(input.corner_surcharge_pct)
            .bind(input.park_facing_surcharge_pct)
            .bind(input.main_road_surcharge_pct)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a category by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PlotCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM plot_categories WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, PlotCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing with name search. Categories carry no summary.
    pub async fn list(
        pool: &PgPool,
        list: &estato_core::query::ListParams,
    ) -> Result<Page<PlotCategory>, QueryError> {
        let mut filter = FilterBuilder::new();
        filter.search(&CATEGORY_LIST_CONFIG, list.search.as_deref());
        let predicate = filter.build();

        let (page, limit) = CATEGORY_LIST_CONFIG.page_and_limit(list);
        let sort = CATEGORY_LIST_CONFIG.resolve_sort(list.sort_by.as_deref(), list.sort_order);

        let store = PgStore::<PlotCategory>::new(pool, "plot_categories", CATEGORY_COLUMNS);
        let (records, meta) = paginate(&store, &predicate, &sort, page, limit).await?;
        Ok(Page::new(records, meta))
    }

    /// Update a category. Only non-`None` fields are applied.
    /// Returns `None` if no live row matches.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlotCategory,
        actor: Option<DbId>,
    ) -> Result<Option<PlotCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE plot_categories SET
                name = COALESCE($2, name),
                size_marla = COALESCE($3, size_marla),
                base_price = COALESCE($4, base_price),
                corner_surcharge_pct = COALESCE($5, corner_surcharge_pct),
                park_facing_surcharge_pct = COALESCE($6, park_facing_surcharge_pct),
                main_road_surcharge_pct = COALESCE($7, main_road_surcharge_pct),
                updated_by = $8,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, PlotCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.size_marla)
            .bind(input.base_price)
            .bind(input.corner_surcharge_pct)
            .bind(input.park_facing_surcharge_pct)
            .bind(input.main_road_surcharge_pct)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a category. Returns `true` if a row was marked.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        actor: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE plot_categories
             SET deleted_at = NOW(), updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
