use labeler::api;
use labeler::app_state::AppState;
use labeler::config::Config;
use labeler::store::labels::LabelStore;
use labeler::store::traces::TraceStore;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labeler=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        port = config.port,
        traces_dir = %config.traces_dir.display(),
        data_dir = %config.data_dir.display(),
        "labeler starting"
    );

    std::fs::create_dir_all(&config.data_dir)?;

    let traces = TraceStore::new(&config.traces_dir);
    let labels = LabelStore::new(config.data_dir.join("labels.jsonl"));
    let app_state = AppState::new(traces, labels);

    let app = api::router()
        .with_state(api::ApiState { app_state })
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
