use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tera::Tera;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketmood_core::config::Settings;
use marketmood_core::domain::{LabelCounts, LabelPercentages};
use marketmood_core::pipeline::{run_full_pipeline, PipelineOptions, PipelineReport, PipelineStageError};
use marketmood_core::storage::table::{load_latest, LoadedTable};
use marketmood_core::storage::DataPaths;

mod page;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let state = AppState::new(settings)?;

    if state.settings.auto_run {
        tracing::info!("MARKETMOOD_AUTO_RUN set; running pipeline before serving");
        // Failures are logged and reported inside; the dashboard still starts.
        let _ = run_locked(&state).await;
    }

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/healthz", get(healthz))
        .route("/api/headlines", get(headlines))
        .route("/api/distribution", get(distribution))
        .route("/pipeline/run", post(run_pipeline_json))
        .route("/pipeline/trigger", post(run_pipeline_form))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    settings: Arc<Settings>,
    paths: DataPaths,
    templates: Arc<Tera>,
    // Held for the whole run so two triggers never write the same files.
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    fn new(settings: Settings) -> anyhow::Result<Self> {
        let paths = DataPaths::from_settings(&settings);
        Ok(Self {
            settings: Arc::new(settings),
            paths,
            templates: Arc::new(page::templates()?),
            run_lock: Arc::new(Mutex::new(())),
        })
    }

    fn load(&self) -> Result<Option<LoadedTable>, StatusCode> {
        load_latest(&self.paths).map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "failed to load data table");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

#[derive(Debug, Serialize)]
struct StageFailure {
    stage: String,
    error: String,
}

impl StageFailure {
    fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<PipelineStageError>() {
            Some(stage) => Self {
                stage: stage.stage.to_string(),
                error: stage.detail.clone(),
            },
            None => Self {
                stage: "setup".to_string(),
                error: format!("{err:#}"),
            },
        }
    }
}

async fn run_locked(state: &AppState) -> Result<PipelineReport, StageFailure> {
    let _guard = state.run_lock.lock().await;
    match run_full_pipeline(&state.settings, &PipelineOptions::default()).await {
        Ok(report) => {
            tracing::info!(
                run_id = %report.run_id,
                articles = report.article_count,
                source = %report.news_source,
                "pipeline run succeeded"
            );
            Ok(report)
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            let failure = StageFailure::from_error(&err);
            tracing::error!(stage = %failure.stage, error = %failure.error, "pipeline run failed");
            Err(failure)
        }
    }
}

async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let table = state.load()?;
    page::render_dashboard(&state.templates, table.as_ref())
        .map(Html)
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "failed to render dashboard");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[derive(Debug, Serialize)]
struct ApiHeadlines {
    source: Option<String>,
    #[serde(flatten)]
    table: LoadedTable,
}

async fn headlines(State(state): State<AppState>) -> Result<Json<ApiHeadlines>, StatusCode> {
    let table = state.load()?.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ApiHeadlines {
        source: table.dominant_source(),
        table,
    }))
}

#[derive(Debug, Serialize)]
struct ApiDistribution {
    counts: LabelCounts,
    percentages: LabelPercentages,
    total: u32,
}

async fn distribution(State(state): State<AppState>) -> Result<Json<ApiDistribution>, StatusCode> {
    let counts = state
        .load()?
        .and_then(|t| t.distribution())
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ApiDistribution {
        counts,
        percentages: counts.percentages(),
        total: counts.total(),
    }))
}

async fn run_pipeline_json(State(state): State<AppState>) -> Response {
    match run_locked(&state).await {
        Ok(report) => Json(report).into_response(),
        Err(failure) => (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response(),
    }
}

async fn run_pipeline_form(State(state): State<AppState>) -> Response {
    match run_locked(&state).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(failure) => match page::render_error(&state.templates, &failure.stage, &failure.error) {
            Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "failed to render error panel");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response()
            }
        },
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
