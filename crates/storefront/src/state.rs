//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError, CatalogService};
use crate::claude::{ClaudeClient, ClaudeError, TextCompletion};
use crate::config::StorefrontConfig;
use crate::services::auth::{AuthError, AuthService, FirebaseIdentityClient, IdentityProvider};
use crate::services::recommendations::RecommendationService;
use crate::shoppers::{ShopperRegistry, StorageBackend};

/// Error building application state at start-up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("identity provider: {0}")]
    Identity(#[from] AuthError),
    #[error("claude: {0}")]
    Claude(#[from] ClaudeError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, shopper state and external service adapters.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogService,
    shoppers: ShopperRegistry,
    auth: AuthService,
    recommendations: RecommendationService,
}

impl AppState {
    /// Create application state from already-built collaborators.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        identity: Arc<dyn IdentityProvider>,
        completion: Option<Arc<dyn TextCompletion>>,
    ) -> Self {
        let backend = config
            .state_dir
            .clone()
            .map_or(StorageBackend::Memory, StorageBackend::Directory);
        let auth = AuthService::new(identity, config.identity.require_email_verification);
        let recommendations =
            completion.map_or_else(RecommendationService::disabled, RecommendationService::new);

        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(catalog),
                shoppers: ShopperRegistry::new(backend),
                auth,
                recommendations,
                config,
            }),
        }
    }

    /// Load the catalog and connect the production identity and Claude clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or a client cannot be
    /// constructed.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StartupError> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::bundled()?,
        };
        tracing::info!(products = catalog.len(), "catalog loaded");

        let identity = FirebaseIdentityClient::new(&config.identity, &config.base_url)?;
        let completion: Option<Arc<dyn TextCompletion>> = match &config.claude {
            Some(claude) => Some(Arc::new(ClaudeClient::new(claude)?)),
            None => {
                tracing::warn!("CLAUDE_API_KEY not set, recommendations disabled");
                None
            }
        };

        Ok(Self::new(config, catalog, Arc::new(identity), completion))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The product catalog and its filter cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Per-shopper state.
    #[must_use]
    pub fn shoppers(&self) -> &ShopperRegistry {
        &self.inner.shoppers
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn recommendations(&self) -> &RecommendationService {
        &self.inner.recommendations
    }
}
