use candid::Nat;
use did::assets::{
    BatchOperationKind, CommitBatchArguments, CreateAssetArguments, CreateBatchRequest,
    CreateBatchResponse, CreateChunkRequest, CreateChunkResponse, SetAssetContentArguments,
};
use ic_utils::call::AsyncCall;
use serde_bytes::ByteBuf;
use sha2::{Digest as _, Sha256};

use super::{AssetBatch, AssetManager, Progress, StoreArgs};
use crate::error::ClientError;

/// Upper bound on a single `create_chunk` payload, kept under the ingress
/// message limit.
const MAX_CHUNK_SIZE: usize = 1_900_000;

/// Encoding staged content is uploaded as.
const CONTENT_ENCODING: &str = "identity";

/// Store transaction against one asset store: stage files locally, then
/// upload their chunks and commit them in a single batch.
pub struct UploadBatch {
    manager: AssetManager,
    staged: Vec<StagedAsset>,
}

struct StagedAsset {
    key: String,
    content_type: String,
    content: Vec<u8>,
}

impl StagedAsset {
    fn chunk_count(&self) -> usize {
        self.content.len().div_ceil(MAX_CHUNK_SIZE).max(1)
    }
}

impl UploadBatch {
    pub(super) fn new(manager: AssetManager) -> Self {
        Self {
            manager,
            staged: Vec::new(),
        }
    }

    /// Chunk upload units plus the final commit.
    fn total_units(&self) -> usize {
        self.staged.iter().map(StagedAsset::chunk_count).sum::<usize>() + 1
    }
}

impl AssetBatch for UploadBatch {
    fn store(&mut self, content: Vec<u8>, args: StoreArgs) -> Result<String, ClientError> {
        if args.file_name.is_empty() || args.file_name.contains('/') {
            return Err(ClientError::Validation(format!(
                "invalid file name: {:?}",
                args.file_name
            )));
        }
        let key = format!("{}/{}", args.path.trim_end_matches('/'), args.file_name);
        self.staged.push(StagedAsset {
            key: key.clone(),
            content_type: args.content_type,
            content,
        });
        Ok(key)
    }

    async fn commit(self, mut on_progress: impl FnMut(Progress)) -> Result<(), ClientError> {
        let canister = self.manager.canister()?;
        let total = self.total_units();
        let mut current = 0;
        on_progress(Progress { current, total });

        let (batch,): (CreateBatchResponse,) = canister
            .update("create_batch")
            .with_arg(CreateBatchRequest {})
            .build()
            .call_and_wait()
            .await
            .map_err(ClientError::from_agent)?;
        let batch_id: Nat = batch.batch_id;

        let mut operations = Vec::with_capacity(self.staged.len() * 2);
        for asset in &self.staged {
            let mut chunks: Vec<&[u8]> = asset.content.chunks(MAX_CHUNK_SIZE).collect();
            if chunks.is_empty() {
                // a zero-length asset still needs one chunk
                chunks.push(&[]);
            }

            let mut chunk_ids = Vec::with_capacity(chunks.len());
            for chunk in chunks {
                let (response,): (CreateChunkResponse,) = canister
                    .update("create_chunk")
                    .with_arg(CreateChunkRequest {
                        batch_id: batch_id.clone(),
                        content: chunk.to_vec(),
                    })
                    .build()
                    .call_and_wait()
                    .await
                    .map_err(ClientError::from_agent)?;
                chunk_ids.push(response.chunk_id);
                current += 1;
                on_progress(Progress { current, total });
            }

            let sha256 = Sha256::digest(&asset.content);
            operations.push(BatchOperationKind::CreateAsset(CreateAssetArguments {
                key: asset.key.clone(),
                content_type: asset.content_type.clone(),
                max_age: None,
                headers: None,
                enable_aliasing: None,
                allow_raw_access: None,
            }));
            operations.push(BatchOperationKind::SetAssetContent(
                SetAssetContentArguments {
                    key: asset.key.clone(),
                    content_encoding: CONTENT_ENCODING.to_string(),
                    chunk_ids,
                    sha256: Some(ByteBuf::from(sha256.to_vec())),
                },
            ));
        }

        canister
            .update("commit_batch")
            .with_arg(CommitBatchArguments {
                batch_id,
                operations,
            })
            .build::<()>()
            .call_and_wait()
            .await
            .map_err(ClientError::from_agent)?;
        on_progress(Progress {
            current: total,
            total,
        });
        log::info!("committed batch of {} asset(s)", self.staged.len());
        Ok(())
    }
}
