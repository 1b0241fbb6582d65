//! In-memory asset store used by the workflow tests.

use std::cell::RefCell;
use std::rc::Rc;

use candid::{Int, Nat};
use did::assets::{AssetDetails, AssetEncodingDetails};

use super::{AssetBatch, AssetStore, Progress, StoreArgs};
use crate::error::ClientError;

/// A file as recorded by [`MockStore`] after a committed batch.
#[derive(Debug, Clone)]
pub(crate) struct StoredFile {
    pub key: String,
    pub args: StoreArgs,
    pub content: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct MockState {
    pub assets: Vec<AssetDetails>,
    pub stored: Vec<StoredFile>,
    pub deleted: Vec<String>,
    pub fail_list: Option<String>,
    pub fail_commit: Option<String>,
    pub fail_delete: Option<String>,
}

#[derive(Default, Clone)]
pub(crate) struct MockStore {
    pub state: Rc<RefCell<MockState>>,
}

impl MockStore {
    pub fn with_assets(assets: Vec<AssetDetails>) -> Self {
        let store = Self::default();
        store.state.borrow_mut().assets = assets;
        store
    }

    pub fn asset(key: &str, modified_ns: i64) -> AssetDetails {
        AssetDetails {
            key: key.to_string(),
            content_type: "application/octet-stream".to_string(),
            encodings: vec![AssetEncodingDetails {
                content_encoding: "identity".to_string(),
                sha256: None,
                length: Nat::from(1u64),
                modified: Int::from(modified_ns),
            }],
        }
    }
}

impl AssetStore for MockStore {
    type Batch = MockBatch;

    async fn list(&self) -> Result<Vec<AssetDetails>, ClientError> {
        if let Some(message) = self.state.borrow().fail_list.clone() {
            return Err(ClientError::backend(message));
        }
        Ok(self.state.borrow().assets.clone())
    }

    fn batch(&self) -> MockBatch {
        MockBatch {
            state: Rc::clone(&self.state),
            staged: Vec::new(),
        }
    }

    async fn delete_asset(&self, key: &str) -> Result<(), ClientError> {
        if let Some(message) = self.state.borrow().fail_delete.clone() {
            return Err(ClientError::backend(message));
        }
        self.state.borrow_mut().deleted.push(key.to_string());
        Ok(())
    }
}

pub(crate) struct MockBatch {
    state: Rc<RefCell<MockState>>,
    staged: Vec<StoredFile>,
}

impl AssetBatch for MockBatch {
    fn store(&mut self, content: Vec<u8>, args: StoreArgs) -> Result<String, ClientError> {
        let key = format!("{}/{}", args.path.trim_end_matches('/'), args.file_name);
        self.staged.push(StoredFile {
            key: key.clone(),
            args,
            content,
        });
        Ok(key)
    }

    async fn commit(self, mut on_progress: impl FnMut(Progress)) -> Result<(), ClientError> {
        if let Some(message) = self.state.borrow().fail_commit.clone() {
            return Err(ClientError::backend(message));
        }
        let total = self.staged.len() + 1;
        for current in 0..=total {
            on_progress(Progress { current, total });
        }
        self.state.borrow_mut().stored.extend(self.staged);
        Ok(())
    }
}
