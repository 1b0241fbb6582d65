mod batch;
mod manager;
#[cfg(test)]
pub(crate) mod testing;

use did::assets::AssetDetails;

pub use self::batch::UploadBatch;
pub use self::manager::AssetManager;
use crate::error::ClientError;

/// Progress of a store transaction, in uploaded units out of total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction of the transaction, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Placement of a staged file within the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreArgs {
    /// Directory-like prefix the key is placed under.
    pub path: String,
    /// File name appended to the path.
    pub file_name: String,
    /// Content type the asset is served with.
    pub content_type: String,
}

/// Consumed contract of the asset-store collaborator.
pub trait AssetStore {
    type Batch: AssetBatch;

    /// List every asset in the store.
    fn list(&self) -> impl Future<Output = Result<Vec<AssetDetails>, ClientError>>;

    /// Open a store transaction.
    fn batch(&self) -> Self::Batch;

    /// Delete a single asset by key.
    fn delete_asset(&self, key: &str) -> impl Future<Output = Result<(), ClientError>>;
}

/// A grouped store-then-commit transaction with progress reporting.
pub trait AssetBatch {
    /// Stage a file under `{path}/{file_name}`; returns the assigned key.
    fn store(&mut self, content: Vec<u8>, args: StoreArgs) -> Result<String, ClientError>;

    /// Upload the staged content and commit the transaction.
    fn commit(
        self,
        on_progress: impl FnMut(Progress),
    ) -> impl Future<Output = Result<(), ClientError>>;
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_compute_progress_fraction() {
        assert_eq!(Progress { current: 0, total: 4 }.fraction(), 0.0);
        assert_eq!(Progress { current: 1, total: 4 }.fraction(), 0.25);
        assert_eq!(Progress { current: 4, total: 4 }.fraction(), 1.0);
        // an empty transaction is complete by definition
        assert_eq!(Progress { current: 0, total: 0 }.fraction(), 1.0);
    }
}
