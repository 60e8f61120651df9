use crate::config::ViewerConfig;
use crate::services::transport::{HttpDocumentApi, HttpPushSource};
use crate::services::{DocumentApi, PushSource};
use crate::store::DocumentStore;
use crate::view::{render_table, DocumentListController};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use viewer_core::error::AppError;

/// Wires transports, store and view together for one session.
pub struct Application {
    store: Arc<DocumentStore>,
}

impl Application {
    pub fn build(config: ViewerConfig) -> Result<Self, AppError> {
        let api = HttpDocumentApi::new(&config.api)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("HTTP client: {}", e)))?;
        let push = HttpPushSource::new(&config.api)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Stream client: {}", e)))?;

        tracing::info!(
            base_url = %config.api.base_url,
            page_size = config.page_size,
            "Document viewer configured"
        );

        Ok(Self::with_transports(
            Arc::new(api),
            Arc::new(push),
            config.page_size,
        ))
    }

    pub fn with_transports(
        api: Arc<dyn DocumentApi>,
        push: Arc<dyn PushSource>,
        page_size: usize,
    ) -> Self {
        Self {
            store: Arc::new(DocumentStore::new(api, push, page_size)),
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Load the first page, go live, and write the table to `out` after every
    /// update until `shutdown` resolves or the store stops publishing.
    pub async fn run_until<F, W>(self, shutdown: F, out: &mut W) -> Result<(), AppError>
    where
        F: Future<Output = ()>,
        W: Write,
    {
        let _initial_load = self.store.initialize().await;

        let mut controller = DocumentListController::new(self.store.clone());
        controller.activate();
        writeln!(out, "{}", render_table(&controller))?;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                updated = controller.next_update() => {
                    if !updated {
                        break;
                    }
                    writeln!(out, "{}", render_table(&controller))?;
                    out.flush()?;
                }
            }
        }

        controller.deactivate();
        self.store.close().await;
        Ok(())
    }

    /// Run until Ctrl-C.
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        };
        let mut stdout = std::io::stdout();
        self.run_until(shutdown, &mut stdout).await
    }
}
