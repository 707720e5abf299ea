//! Charts for a directory of benchmark run documents.
//!
//! Run documents are flattened into a [table::MetricTable], optionally filtered by baseline,
//! aggregated per [group::MetricColumnGroup] and rendered into charts that the [web] routes
//! embed into HTML pages.

pub mod aggregate;
pub mod config;
pub mod group;
pub mod page;
pub mod render;
pub mod table;
pub mod units;
pub mod views;
pub mod web;

pub use config::{DashboardCli, DashboardConfig};
pub use table::MetricTable;
pub use web::router;
