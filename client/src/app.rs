use std::path::Path;

use tokio::sync::watch;

use crate::assets::AssetManager;
use crate::config::Config;
use crate::error::ClientError;
use crate::session::{AuthClient, Browser, Session, SessionManager, StoredAuthClient};
use crate::workflows::{ListingWorkflow, UploadRecord, UploadWorkflow};

/// The assembled file storage client: session manager, asset handle
/// derivation, and the upload and listing workflows, wired so every
/// session change rebuilds the visible list for the new identity.
pub struct FileStorage<A: AuthClient> {
    session: SessionManager<A>,
    uploads: UploadWorkflow,
    listing: ListingWorkflow,
}

impl FileStorage<StoredAuthClient> {
    /// Build the client from configuration, probing the state directory
    /// for an existing session.
    pub async fn create(config: Config) -> Result<Self, ClientError> {
        let auth = StoredAuthClient::create(config.state_dir.clone(), config.identity_pem.clone())?;
        Self::with_auth(config, auth).await
    }
}

impl<A: AuthClient> FileStorage<A> {
    /// Build the client over an explicit authentication collaborator.
    pub async fn with_auth(config: Config, auth: A) -> Result<Self, ClientError> {
        let mut storage = Self {
            session: SessionManager::new(config, auth),
            uploads: UploadWorkflow::new(),
            listing: ListingWorkflow::new(),
        };
        storage.session.initialize().await?;
        storage.refresh().await?;
        Ok(storage)
    }

    /// Current session value.
    pub fn session(&self) -> Session {
        self.session.session()
    }

    pub fn config(&self) -> &Config {
        self.session.config()
    }

    /// The visible file list, most recent first.
    pub fn files(&self) -> &[UploadRecord] {
        self.listing.list().records()
    }

    /// Asset handle bound to the current session, derived fresh from the
    /// current communication handle. Absent while logged out.
    pub fn asset_manager(&self) -> Option<AssetManager> {
        let session = self.session.session();
        session
            .agent
            .map(|agent| AssetManager::new(self.config().store_canister_id, agent))
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Identity provider endpoint `login` will drive.
    pub fn provider_url(&self, browser: Browser) -> Result<String, ClientError> {
        self.session.provider_url(browser)
    }

    /// Log in, then rebuild the visible list for the new identity.
    pub async fn login(&mut self, browser: Browser) -> Result<Session, ClientError> {
        let session = self.session.login(browser).await?;
        self.refresh().await?;
        Ok(session)
    }

    /// Log out; clears the visible list and any progress indicator.
    pub async fn logout(&mut self) -> Result<Session, ClientError> {
        let session = self.session.logout().await?;
        self.uploads.reset_progress();
        self.refresh().await?;
        Ok(session)
    }

    /// Rebuild the visible list from the backend for the current session.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let session = self.session.session();
        let store = self.asset_manager();
        self.listing.refresh(&session, store.as_ref()).await
    }

    /// Select `path` for upload.
    pub fn select(&mut self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        self.uploads.select(path)
    }

    /// Drop the pending selection.
    pub fn clear_selection(&mut self) {
        self.uploads.clear_selection();
    }

    /// The pending selection's file name, if any.
    pub fn selection(&self) -> Option<&str> {
        self.uploads.selection().map(|file| file.file_name())
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads.is_uploading()
    }

    /// Upload the pending selection, reporting percentage progress.
    pub async fn upload(
        &mut self,
        on_progress: impl FnMut(f64),
    ) -> Result<UploadRecord, ClientError> {
        let session = self.session.session();
        let store = self
            .asset_manager()
            .ok_or_else(|| ClientError::Session("log in before uploading".to_string()))?;
        self.uploads
            .upload(&session, &store, self.listing.list_mut(), on_progress)
            .await
    }

    /// Remove the file behind `key` from the store and the visible list.
    pub async fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        let session = self.session.session();
        let store = self
            .asset_manager()
            .ok_or_else(|| ClientError::Session("log in before deleting files".to_string()))?;
        self.listing.remove(&session, &store, key).await
    }

    /// Stable URL of the stored file matching `needle` (key or display
    /// name), plus its suggested local file name.
    pub fn download_target(&self, needle: &str) -> Option<(String, String)> {
        let record = self.listing.list().find(needle)?;
        Some((
            self.listing.download_url(self.config(), record),
            record.filename.clone(),
        ))
    }
}
