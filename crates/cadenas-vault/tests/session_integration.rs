#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Vault lifecycle: create, persist the key record, unlock, lock.

use std::sync::Arc;

use cadenas_crypto_core::kdf::{KdfAlgorithm, KdfParams};
use cadenas_vault::{open_item, seal_item, ItemPayload, ItemRecord, VaultError, VaultKeyRecord, VaultSession};

/// Low-cost params so tests stay fast.
const TEST_PARAMS: KdfParams = KdfParams {
    algo: KdfAlgorithm::Pbkdf2Sha256,
    iter: 25,
};

#[test]
fn key_record_survives_storage_serialization() {
    let creator = VaultSession::new();
    let record = creator
        .create_with_params("owner-1", "open sesame", TEST_PARAMS)
        .expect("create");

    // Round-trip through the collaborator's JSON representation.
    let stored = serde_json::to_string(&record).expect("serialize");
    let fetched: VaultKeyRecord = serde_json::from_str(&stored).expect("deserialize");
    assert_eq!(fetched, record);

    let session = VaultSession::new();
    session.unlock(&fetched, "open sesame").expect("unlock");
    assert!(session.is_unlocked());
}

#[test]
fn unlock_flow_end_to_end() {
    // Creation session: derive, persist record, save one item.
    let creator = VaultSession::new();
    let record = creator
        .create_with_params("owner-1", "correct horse battery staple", TEST_PARAMS)
        .expect("create");
    let payload = ItemPayload::Note {
        text: "first note".into(),
    };
    let sealed = seal_item(&creator, &payload, Some("rec-1")).expect("seal");
    let row = ItemRecord {
        id: "rec-1".into(),
        kind: payload.kind().into(),
        title: "first".into(),
        tags_opaque: vec![],
        enc_key_wrapped: sealed.enc_key_wrapped,
        enc_blob: sealed.enc_blob,
        iv: sealed.iv,
        aad: sealed.aad,
        version: 1,
        updated_at: "2026-08-06T00:00:00Z".into(),
    };
    creator.lock();

    // Fresh process: unlock with the stored record, read the item back.
    let session = VaultSession::new();
    session
        .unlock(&record, "correct horse battery staple")
        .expect("unlock");
    let opened = open_item(&session, &row).expect("open");
    assert_eq!(opened, payload);
}

#[test]
fn wrong_passphrase_surfaces_before_any_decrypt() {
    let creator = VaultSession::new();
    let record = creator
        .create_with_params("owner-1", "open sesame", TEST_PARAMS)
        .expect("create");

    let session = VaultSession::new();
    let result = session.unlock(&record, "wrong passphrase");
    assert!(matches!(result, Err(VaultError::InvalidPassphrase)));
    assert!(!session.is_unlocked());
}

#[test]
fn lock_is_a_barrier_for_concurrent_readers() {
    let session = Arc::new(VaultSession::new());
    session
        .create_with_params("owner-1", "open sesame", TEST_PARAMS)
        .expect("create");

    let payload = ItemPayload::Note {
        text: "shared".into(),
    };
    let sealed = seal_item(&session, &payload, Some("rec-1")).expect("seal");
    let row = ItemRecord {
        id: "rec-1".into(),
        kind: payload.kind().into(),
        title: "shared".into(),
        tags_opaque: vec![],
        enc_key_wrapped: sealed.enc_key_wrapped,
        enc_blob: sealed.enc_blob,
        iv: sealed.iv,
        aad: sealed.aad,
        version: 1,
        updated_at: "2026-08-06T00:00:00Z".into(),
    };

    // Concurrent readers decrypt until the vault locks; each in-flight
    // decrypt either completes with the real payload or fails cleanly with
    // `Locked` — never a torn result.
    let mut readers = Vec::new();
    for _ in 0..4 {
        let session = Arc::clone(&session);
        let row = row.clone();
        let expected = payload.clone();
        readers.push(std::thread::spawn(move || {
            loop {
                match open_item(&session, &row) {
                    Ok(opened) => assert_eq!(opened, expected),
                    Err(VaultError::Locked) => break,
                    Err(other) => panic!("unexpected decrypt error: {other}"),
                }
            }
        }));
    }

    session.lock();
    for reader in readers {
        reader.join().expect("reader thread");
    }
    assert!(!session.is_unlocked());
}

#[test]
fn relock_and_reunlock_cycle() {
    let creator = VaultSession::new();
    let record = creator
        .create_with_params("owner-1", "open sesame", TEST_PARAMS)
        .expect("create");

    let session = VaultSession::new();
    for _ in 0..3 {
        session.unlock(&record, "open sesame").expect("unlock");
        assert!(session.is_unlocked());
        session.lock();
        assert!(!session.is_unlocked());
    }
}
