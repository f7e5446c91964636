//! `cadenas-vault` — Vault session and item flows for CADENAS.
//!
//! Builds the lock/unlock state machine and the item save/load paths on
//! top of `cadenas-crypto-core`, and owns the DTOs exchanged with the
//! remote storage collaborator. Persistence, identity, and access control
//! live on the collaborator's side — only opaque base64 blobs and compact
//! JSON parameter structures cross the boundary.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod boundary;
pub mod error;
pub mod session;

pub mod items;

pub mod health;

pub use boundary::{ItemRecord, VaultKeyRecord};
pub use error::VaultError;
pub use health::{audit, CredentialRef, HealthReport, ReusedGroup, WeakCredential};
pub use items::{
    current_code, hash_tags, open_all, open_item, seal_item, ItemPayload, LoadFailure, LoadOutcome,
    LoadedItem, SealedItem,
};
pub use session::VaultSession;
