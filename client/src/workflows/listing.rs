use candid::Principal;
use did::assets::AssetDetails;

use crate::assets::AssetStore;
use crate::config::Config;
use crate::error::ClientError;
use crate::session::Session;
use crate::workflows::upload::upload_namespace;

/// One stored file as displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    /// Backend-assigned storage key; doubles as the asset's locator path.
    pub key: String,
    /// Original file name, recovered from the key.
    pub filename: String,
    /// Creation time embedded in the key, in milliseconds since the epoch.
    pub timestamp_ms: u64,
}

/// In-memory, display-ordered list of the user's files.
///
/// Rebuilt from the backend on every session change; transient UI state,
/// not a system of record.
#[derive(Debug, Default)]
pub struct FileList {
    records: Vec<UploadRecord>,
}

impl FileList {
    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by storage key or display name.
    pub fn find(&self, needle: &str) -> Option<&UploadRecord> {
        self.records
            .iter()
            .find(|record| record.key == needle || record.filename == needle)
    }

    pub(crate) fn prepend(&mut self, record: UploadRecord) {
        self.records.insert(0, record);
    }

    fn clear(&mut self) {
        self.records.clear();
    }

    fn replace(&mut self, records: Vec<UploadRecord>) {
        self.records = records;
    }

    fn remove_key(&mut self, key: &str) {
        self.records.retain(|record| record.key != key);
    }
}

/// Listing and removal workflow over the user's upload namespace.
#[derive(Debug, Default)]
pub struct ListingWorkflow {
    list: FileList,
}

impl ListingWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &FileList {
        &self.list
    }

    pub(crate) fn list_mut(&mut self) -> &mut FileList {
        &mut self.list
    }

    /// Rebuild the list from the backend.
    ///
    /// Logged out, the list is cleared unconditionally. A listing failure
    /// is surfaced and leaves the previous list value intact.
    pub async fn refresh<S: AssetStore>(
        &mut self,
        session: &Session,
        store: Option<&S>,
    ) -> Result<(), ClientError> {
        if !session.is_authenticated {
            self.list.clear();
            return Ok(());
        }
        let Some(store) = store else {
            self.list.clear();
            return Ok(());
        };

        let assets = store.list().await?;
        self.list
            .replace(Self::to_records(assets, &session.principal));
        log::debug!("listed {} file(s)", self.list.len());
        Ok(())
    }

    /// Delete the asset behind `key`. The record leaves the list only when
    /// the backend confirms the delete.
    pub async fn remove<S: AssetStore>(
        &mut self,
        session: &Session,
        store: &S,
        key: &str,
    ) -> Result<(), ClientError> {
        if !session.is_authenticated {
            return Err(ClientError::Session(
                "log in before deleting files".to_string(),
            ));
        }
        store.delete_asset(key).await?;
        self.list.remove_key(key);
        Ok(())
    }

    /// Stable URL the asset behind `record` is served at, for the hosting
    /// environment to fetch and save under the record's display name.
    pub fn download_url(&self, config: &Config, record: &UploadRecord) -> String {
        config.asset_url(&record.key)
    }

    /// Filter to the principal's namespace, order by backend-reported
    /// recency, and derive the display metadata from each key.
    fn to_records(assets: Vec<AssetDetails>, principal: &Principal) -> Vec<UploadRecord> {
        let namespace = format!("{}/", upload_namespace(principal));
        let mut assets: Vec<AssetDetails> = assets
            .into_iter()
            .filter(|asset| asset.key.starts_with(&namespace))
            .collect();
        assets.sort_by(|a, b| b.modified().cmp(&a.modified()));
        assets
            .into_iter()
            .map(|asset| Self::to_record(asset.key))
            .collect()
    }

    /// Strip the path and the timestamp prefix to recover the original
    /// file name.
    fn to_record(key: String) -> UploadRecord {
        let stored_name = key.rsplit('/').next().unwrap_or_default();
        let (timestamp_ms, filename) = match stored_name.split_once('-') {
            Some((prefix, rest))
                if !rest.is_empty() && !prefix.is_empty()
                    && prefix.bytes().all(|byte| byte.is_ascii_digit()) =>
            {
                (prefix.parse::<u64>().unwrap_or(0), rest.to_string())
            }
            _ => (0, stored_name.to_string()),
        };
        UploadRecord {
            key,
            filename,
            timestamp_ms,
        }
    }
}
