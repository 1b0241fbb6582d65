use candid::CandidType;
use serde::{Deserialize, Serialize};

use super::{BatchId, ChunkId, HeaderField, Key};

/// Arguments for the `create_batch` method.
#[derive(Debug, Default, CandidType, Serialize, Deserialize)]
pub struct CreateBatchRequest {}

/// Response for the `create_batch` method.
#[derive(Debug, Clone, PartialEq, Eq, CandidType, Serialize, Deserialize)]
pub struct CreateBatchResponse {
    pub batch_id: BatchId,
}

/// Arguments for the `create_chunk` method.
#[derive(Debug, Clone, CandidType, Serialize, Deserialize)]
pub struct CreateChunkRequest {
    pub batch_id: BatchId,
    #[serde(with = "serde_bytes")]
    pub content: Vec<u8>,
}

/// Response for the `create_chunk` method.
#[derive(Debug, Clone, PartialEq, Eq, CandidType, Serialize, Deserialize)]
pub struct CreateChunkResponse {
    pub chunk_id: ChunkId,
}

/// Arguments for the `commit_batch` method.
#[derive(Debug, Clone, CandidType, Serialize, Deserialize)]
pub struct CommitBatchArguments {
    pub batch_id: BatchId,
    pub operations: Vec<BatchOperationKind>,
}

/// One operation applied by `commit_batch`.
#[derive(Debug, Clone, CandidType, Serialize, Deserialize)]
pub enum BatchOperationKind {
    CreateAsset(CreateAssetArguments),
    SetAssetContent(SetAssetContentArguments),
    UnsetAssetContent(UnsetAssetContentArguments),
    DeleteAsset(super::DeleteAssetArguments),
    Clear(ClearArguments),
}

/// Create an asset under a key. The asset has no content until a
/// [`SetAssetContentArguments`] operation fills one of its encodings.
#[derive(Debug, Clone, CandidType, Serialize, Deserialize)]
pub struct CreateAssetArguments {
    pub key: Key,
    pub content_type: String,
    pub max_age: Option<u64>,
    pub headers: Option<Vec<HeaderField>>,
    pub enable_aliasing: Option<bool>,
    pub allow_raw_access: Option<bool>,
}

/// Attach previously uploaded chunks to an asset encoding.
#[derive(Debug, Clone, CandidType, Serialize, Deserialize)]
pub struct SetAssetContentArguments {
    pub key: Key,
    pub content_encoding: String,
    pub chunk_ids: Vec<ChunkId>,
    pub sha256: Option<serde_bytes::ByteBuf>,
}

/// Remove an encoding from an asset.
#[derive(Debug, Clone, CandidType, Serialize, Deserialize)]
pub struct UnsetAssetContentArguments {
    pub key: Key,
    pub content_encoding: String,
}

/// Arguments for the `Clear` batch operation.
#[derive(Debug, Default, Clone, CandidType, Serialize, Deserialize)]
pub struct ClearArguments {}

#[cfg(test)]
mod test {

    use candid::{Decode, Encode, Nat};

    use super::*;

    #[test]
    fn test_should_encode_and_decode_create_chunk_request() {
        let request = CreateChunkRequest {
            batch_id: Nat::from(7u64),
            content: vec![1, 2, 3, 4],
        };

        let encoded = Encode!(&request).expect("failed to encode");
        let decoded = Decode!(&encoded, CreateChunkRequest).expect("failed to decode");

        assert_eq!(decoded.batch_id, request.batch_id);
        assert_eq!(decoded.content, request.content);
    }

    #[test]
    fn test_should_encode_and_decode_commit_batch_arguments() {
        let arguments = CommitBatchArguments {
            batch_id: Nat::from(1u64),
            operations: vec![
                BatchOperationKind::CreateAsset(CreateAssetArguments {
                    key: "/uploads/aaaaa-aa/1-a.txt".to_string(),
                    content_type: "text/plain".to_string(),
                    max_age: None,
                    headers: None,
                    enable_aliasing: None,
                    allow_raw_access: None,
                }),
                BatchOperationKind::SetAssetContent(SetAssetContentArguments {
                    key: "/uploads/aaaaa-aa/1-a.txt".to_string(),
                    content_encoding: "identity".to_string(),
                    chunk_ids: vec![Nat::from(0u64)],
                    sha256: None,
                }),
            ],
        };

        let encoded = Encode!(&arguments).expect("failed to encode");
        let decoded = Decode!(&encoded, CommitBatchArguments).expect("failed to decode");

        assert_eq!(decoded.batch_id, arguments.batch_id);
        assert_eq!(decoded.operations.len(), 2);
    }
}
