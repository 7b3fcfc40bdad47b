//! Plot and plot-category entity models and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use estato_core::query::ListParams;
use estato_core::types::{DbId, Timestamp};

/// A row from the `plot_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlotCategory {
    pub id: DbId,
    pub name: String,
    pub size_marla: f64,
    pub base_price: f64,
    pub corner_surcharge_pct: f64,
    pub park_facing_surcharge_pct: f64,
    pub main_road_surcharge_pct: f64,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for creating a plot category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlotCategory {
    pub name: String,
    pub size_marla: f64,
    pub base_price: f64,
    pub corner_surcharge_pct: Option<f64>,
    pub park_facing_surcharge_pct: Option<f64>,
    pub main_road_surcharge_pct: Option<f64>,
}

/// DTO for updating a plot category. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlotCategory {
    pub name: Option<String>,
    pub size_marla: Option<f64>,
    pub base_price: Option<f64>,
    pub corner_surcharge_pct: Option<f64>,
    pub park_facing_surcharge_pct: Option<f64>,
    pub main_road_surcharge_pct: Option<f64>,
}

/// A row from the `plots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plot {
    pub id: DbId,
    pub plot_no: String,
    pub block: String,
    pub category_id: DbId,
    pub is_corner: bool,
    pub is_park_facing: bool,
    pub is_main_road: bool,
    pub status: String,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Plot {
    /// Sale price derived from the category's base price and the
    /// surcharges for this plot's features.
    pub fn price(&self, category: &PlotCategory) -> f64 {
        let mut pcts = Vec::new();
        if self.is_corner {
            pcts.push(category.corner_surcharge_pct);
        }
        if self.is_park_facing {
            pcts.push(category.park_facing_surcharge_pct);
        }
        if self.is_main_road {
            pcts.push(category.main_road_surcharge_pct);
        }
        estato_core::billing::plot_price(category.base_price, &pcts)
    }
}

/// Plot row plus its derived price, for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PlotView {
    #[serde(flatten)]
    pub plot: Plot,
    pub price: Option<f64>,
}

/// DTO for creating a plot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlot {
    pub plot_no: String,
    pub block: String,
    pub category_id: DbId,
    pub is_corner: Option<bool>,
    pub is_park_facing: Option<bool>,
    pub is_main_road: Option<bool>,
}

/// DTO for updating a plot. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlot {
    pub plot_no: Option<String>,
    pub block: Option<String>,
    pub category_id: Option<DbId>,
    pub is_corner: Option<bool>,
    pub is_park_facing: Option<bool>,
    pub is_main_road: Option<bool>,
    pub status: Option<String>,
}

/// Filterable listing parameters.
#[derive(Debug, Default)]
pub struct PlotListQuery {
    pub list: ListParams,
    /// Raw reference id; validated before querying.
    pub category_id: Option<String>,
    pub block: Option<String>,
    pub statuses: Vec<String>,
}

/// Status breakdown over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct PlotSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
}
