//! Application state wiring the store and external collaborators together.

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::store::DocumentStore,
    services::{
        identity::{BcryptCredentialProvider, CredentialProvider, TokenService},
        mailer::{ActivationMailer, LogMailer},
        media::{ImagePipeline, PassthroughImagePipeline},
    },
};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Dependency container built once at process start.
///
/// Handlers stay stateless; everything a workflow operation needs (the
/// document store, token service and the external collaborator gateways)
/// is injected here at construction time.
pub struct AppState {
    store: DocumentStore,
    tokens: TokenService,
    credentials: Arc<dyn CredentialProvider>,
    mailer: Arc<dyn ActivationMailer>,
    images: Arc<dyn ImagePipeline>,
}

impl AppState {
    /// Build the state with the default collaborator implementations.
    pub fn new(config: &AppConfig) -> SharedState {
        Self::with_collaborators(
            config,
            DocumentStore::new(),
            Arc::new(BcryptCredentialProvider::new()),
            Arc::new(LogMailer::new(config.front_url.clone())),
            Arc::new(PassthroughImagePipeline),
        )
    }

    /// Build the state with explicit collaborators (used by tests to swap in
    /// failing or recording doubles).
    pub fn with_collaborators(
        config: &AppConfig,
        store: DocumentStore,
        credentials: Arc<dyn CredentialProvider>,
        mailer: Arc<dyn ActivationMailer>,
        images: Arc<dyn ImagePipeline>,
    ) -> SharedState {
        Arc::new(Self {
            store,
            tokens: TokenService::new(&config.access_secret, &config.refresh_secret),
            credentials,
            mailer,
            images,
        })
    }

    /// The document store adapter.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The token issuing/verifying service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The credential provider gateway.
    pub fn credentials(&self) -> &dyn CredentialProvider {
        &*self.credentials
    }

    /// The activation mail sender.
    pub fn mailer(&self) -> &dyn ActivationMailer {
        &*self.mailer
    }

    /// The image conversion and upload pipeline.
    pub fn images(&self) -> &dyn ImagePipeline {
        &*self.images
    }
}
