use candid::Principal;
use did::assets::{AssetDetails, DeleteAssetArguments, ListArguments};
use ic_agent::Agent;
use ic_utils::Canister;
use ic_utils::call::{AsyncCall, SyncCall};

use super::{AssetStore, UploadBatch};
use crate::error::ClientError;

/// Handle to one asset store, bound to a specific canister and to the
/// identity the agent was built with.
///
/// The handle must be recomputed whenever the agent changes identity;
/// construction is cheap, so callers derive a fresh one per session.
#[derive(Clone)]
pub struct AssetManager {
    canister_id: Principal,
    agent: Agent,
}

impl AssetManager {
    pub fn new(canister_id: Principal, agent: Agent) -> Self {
        Self { canister_id, agent }
    }

    pub fn canister_id(&self) -> Principal {
        self.canister_id
    }

    pub(super) fn canister(&self) -> Result<Canister<'_>, ClientError> {
        Canister::builder()
            .with_agent(&self.agent)
            .with_canister_id(self.canister_id)
            .build()
            .map_err(|error| ClientError::Store(error.to_string()))
    }
}

impl AssetStore for AssetManager {
    type Batch = UploadBatch;

    async fn list(&self) -> Result<Vec<AssetDetails>, ClientError> {
        let canister = self.canister()?;
        let (assets,): (Vec<AssetDetails>,) = canister
            .query("list")
            .with_arg(ListArguments {})
            .build()
            .call()
            .await
            .map_err(ClientError::from_agent)?;
        log::debug!("store reported {} asset(s)", assets.len());
        Ok(assets)
    }

    fn batch(&self) -> UploadBatch {
        UploadBatch::new(self.clone())
    }

    async fn delete_asset(&self, key: &str) -> Result<(), ClientError> {
        let canister = self.canister()?;
        canister
            .update("delete_asset")
            .with_arg(DeleteAssetArguments {
                key: key.to_string(),
            })
            .build::<()>()
            .call_and_wait()
            .await
            .map_err(ClientError::from_agent)?;
        log::debug!("deleted asset {key}");
        Ok(())
    }
}
