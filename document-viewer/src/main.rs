use document_viewer::config::ViewerConfig;
use document_viewer::startup::Application;
use dotenvy::dotenv;
use viewer_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = ViewerConfig::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "document-viewer",
        &configuration.common.log_level,
        configuration.common.otlp_endpoint.as_deref(),
    );

    let app = Application::build(configuration)?;
    app.run_until_stopped().await?;

    tracing::info!("Document viewer stopped");
    Ok(())
}
