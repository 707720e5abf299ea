use crate::config::DashboardConfig;
use crate::group::{PlotType, UnknownPlotType};
use crate::page;
use crate::table::MetricTable;
use crate::views::{self, PageData};
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use thiserror::Error;

/// Form field carrying the selected baselines, repeated once per selection.
pub const BASELINES_FIELD: &str = "baselines";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    UnknownPlotType(#[from] UnknownPlotType),
    #[error("Request failed: {0:#}")]
    Pipeline(#[from] anyhow::Error),
    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UnknownPlotType(_) => StatusCode::NOT_FOUND,
            AppError::Pipeline(_) | AppError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("{self}");
        }

        (status, self.to_string()).into_response()
    }
}

#[derive(Clone)]
struct AppState {
    config: Arc<DashboardConfig>,
}

/// Build the dashboard routes.
///
/// Every request loads the run documents again and renders from scratch, nothing is shared
/// between requests except the configuration.
pub fn router(config: DashboardConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(home).post(home_filtered))
        .route("/plot/{plot_type}", get(plot))
        .route("/stepwise_analysis/{step_type}", get(stepwise_analysis))
        .route("/baseline_analysis/{baseline}", get(baseline_analysis))
        .with_state(state)
}

async fn home(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, AppError> {
    let selected = selected_baselines(query.as_deref().unwrap_or_default());
    render_page(&state, move |table| views::home(table, selected)).await
}

async fn home_filtered(
    State(state): State<AppState>,
    body: String,
) -> Result<Html<String>, AppError> {
    let selected = selected_baselines(&body);
    render_page(&state, move |table| views::home(table, selected)).await
}

async fn plot(
    State(state): State<AppState>,
    Path(plot_type): Path<String>,
) -> Result<Html<String>, AppError> {
    let plot_type: PlotType = plot_type.parse()?;
    render_page(&state, move |table| views::plot(table, plot_type)).await
}

async fn stepwise_analysis(
    State(state): State<AppState>,
    Path(step): Path<String>,
) -> Result<Html<String>, AppError> {
    render_page(&state, move |table| views::stepwise_analysis(table, &step)).await
}

async fn baseline_analysis(
    State(state): State<AppState>,
    Path(baseline): Path<String>,
) -> Result<Html<String>, AppError> {
    render_page(&state, move |table| views::baseline_analysis(table, &baseline)).await
}

/// Load the table and build a page on a blocking thread.
async fn render_page<F>(state: &AppState, build: F) -> Result<Html<String>, AppError>
where
    F: FnOnce(&MetricTable) -> anyhow::Result<PageData> + Send + 'static,
{
    let source = state.config.source();
    let page = tokio::task::spawn_blocking(move || {
        let table = MetricTable::load(&source)?;
        build(&table)
    })
    .await??;

    Ok(Html(page::render(&page)))
}

/// Every `baselines` value of a urlencoded form or query string, in submission order.
fn selected_baselines(encoded: &str) -> Vec<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .filter(|(key, _)| key == BASELINES_FIELD)
        .map(|(_, value)| value.into_owned())
        .collect()
}
