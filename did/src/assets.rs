mod batch;

use candid::{CandidType, Int, Nat};
use serde::{Deserialize, Serialize};

pub use self::batch::{
    BatchOperationKind, ClearArguments, CommitBatchArguments, CreateAssetArguments,
    CreateBatchRequest, CreateBatchResponse, CreateChunkRequest, CreateChunkResponse,
    SetAssetContentArguments, UnsetAssetContentArguments,
};

/// Key under which an asset is stored. Keys double as retrievable locator paths.
pub type Key = String;

/// Identifier of an open store transaction.
pub type BatchId = Nat;

/// Identifier of a chunk uploaded within a batch.
pub type ChunkId = Nat;

/// HTTP header attached to an asset.
pub type HeaderField = (String, String);

/// Arguments for the `list` query method.
#[derive(Debug, Default, CandidType, Serialize, Deserialize)]
pub struct ListArguments {}

/// One asset as reported by the `list` query method.
#[derive(Debug, Clone, PartialEq, CandidType, Serialize, Deserialize)]
pub struct AssetDetails {
    pub key: Key,
    pub content_type: String,
    pub encodings: Vec<AssetEncodingDetails>,
}

impl AssetDetails {
    /// Backend-reported modification time of the primary encoding, in
    /// nanoseconds since the Unix epoch. `None` when the asset has no
    /// encodings.
    pub fn modified(&self) -> Option<&Int> {
        self.encodings.first().map(|encoding| &encoding.modified)
    }
}

/// Stored encoding of an asset.
#[derive(Debug, Clone, PartialEq, CandidType, Serialize, Deserialize)]
pub struct AssetEncodingDetails {
    pub content_encoding: String,
    pub sha256: Option<serde_bytes::ByteBuf>,
    pub length: Nat,
    pub modified: Int,
}

/// Arguments for the `delete_asset` method.
#[derive(Debug, Clone, PartialEq, Eq, CandidType, Serialize, Deserialize)]
pub struct DeleteAssetArguments {
    pub key: Key,
}
