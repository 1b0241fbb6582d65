//! Wire types consumed from the ic-filestore collaborator services:
//! the certified-asset canister interface and the on-disk identity session record.

pub mod assets;
pub mod session;
