//! Session wiring: registry, provider and one transport binding

use hardcover_client::CatalogProvider;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::catalog::{self, CatalogProfile};
use crate::config::GatewayConfig;
use crate::server::McpServer;
use crate::transport::TransportBinding;
use crate::McpResult;

/// One gateway session. The provider is owned by the session and released
/// when its binding closes.
pub struct Session {
    server: Arc<McpServer>,
    provider: Arc<dyn CatalogProvider>,
    profile: CatalogProfile,
}

impl Session {
    /// Register the catalog for `profile` against `provider`
    pub fn new(provider: Arc<dyn CatalogProvider>, profile: CatalogProfile) -> McpResult<Self> {
        let registry = catalog::build_registry(provider.clone(), profile)?;
        Ok(Self { server: Arc::new(McpServer::new(registry)), provider, profile })
    }

    /// Build the Hardcover provider from `config` and register the catalog
    pub fn from_config(config: &GatewayConfig, profile: CatalogProfile) -> McpResult<Self> {
        let provider = config.build_provider()?;
        Self::new(Arc::new(provider), profile)
    }

    pub fn server(&self) -> Arc<McpServer> {
        self.server.clone()
    }

    pub fn profile(&self) -> CatalogProfile {
        self.profile
    }

    /// Serve until the binding closes or Ctrl-C is received
    pub async fn run<B: TransportBinding>(self, binding: B) -> McpResult<()> {
        self.run_until(binding, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "unable to listen for interrupt signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until the binding closes or `shutdown` resolves. Dropping the
    /// binding on shutdown cancels every invocation still in flight.
    pub async fn run_until<B, F>(self, binding: B, shutdown: F) -> McpResult<()>
    where
        B: TransportBinding,
        F: Future<Output = ()> + Send,
    {
        let name = binding.name();
        info!(
            binding = name,
            profile = ?self.profile,
            tools = self.server.definitions().len(),
            "session starting"
        );

        let outcome = tokio::select! {
            result = binding.serve(self.server.clone()) => result,
            _ = shutdown => {
                info!(binding = name, "shutdown signal received");
                Ok(())
            }
        };

        self.provider.close().await;
        info!(binding = name, "session closed");
        outcome
    }
}
