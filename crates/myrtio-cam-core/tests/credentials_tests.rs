//! Credential table layout and persistence.

mod common;

use common::MemoryBlobStore;
use embassy_futures::block_on;
use myrtio_cam_core::credentials::{
    CredentialTable, FIELD_LEN, RECORD_SIZE, SLOT_COUNT, load_or_init,
};

// -----------------------------------------------------------------------------
// Table semantics
// -----------------------------------------------------------------------------

#[test]
fn empty_table_has_no_entries() {
    let table = CredentialTable::empty();

    for index in 0..SLOT_COUNT {
        assert_eq!(table.entry(index), None);
    }
    assert_eq!(table.last_index(), Some(0));
}

#[test]
fn entries_round_trip_as_strings() {
    let mut table = CredentialTable::empty();
    table.set_entry(3, "HomeNet", "hunter2");

    assert_eq!(table.entry(3), Some(("HomeNet", "hunter2")));
    assert_eq!(table.entry(2), None);
}

#[test]
fn oversized_fields_are_truncated_with_room_for_the_terminator() {
    let long = "x".repeat(FIELD_LEN + 10);
    let mut table = CredentialTable::empty();
    table.set_entry(0, &long, &long);

    let (name, password) = table.entry(0).unwrap();
    assert_eq!(name.len(), FIELD_LEN - 1);
    assert_eq!(password.len(), FIELD_LEN - 1);
}

#[test]
fn cleared_entries_read_as_empty() {
    let mut table = CredentialTable::empty();
    table.set_entry(5, "Net", "pass");
    table.clear_entry(5);

    assert_eq!(table.entry(5), None);
}

#[test]
fn out_of_range_last_index_is_ignored() {
    let mut data = CredentialTable::empty().encode();
    data[0..4].copy_from_slice(&99i32.to_le_bytes());

    let table = CredentialTable::decode(&data).unwrap();
    assert_eq!(table.last_index(), None);

    data[0..4].copy_from_slice(&(-1i32).to_le_bytes());
    let table = CredentialTable::decode(&data).unwrap();
    assert_eq!(table.last_index(), None);
}

// -----------------------------------------------------------------------------
// Wire layout
// -----------------------------------------------------------------------------

#[test]
fn encoded_layout_is_last_index_then_names_then_passwords() {
    let mut table = CredentialTable::empty();
    table.set_last_index(2);
    table.set_entry(0, "AB", "cd");

    let data = table.encode();
    assert_eq!(data.len(), RECORD_SIZE);
    assert_eq!(&data[0..4], &2i32.to_le_bytes());
    // name of slot 0 directly after the index, NUL-padded
    assert_eq!(&data[4..6], b"AB");
    assert_eq!(data[6], 0);
    // passwords start after all ten names
    let password_base = 4 + SLOT_COUNT * FIELD_LEN;
    assert_eq!(&data[password_base..password_base + 2], b"cd");
}

#[test]
fn decode_rejects_any_other_size() {
    assert!(CredentialTable::decode(&[0u8; RECORD_SIZE - 1]).is_none());
    assert!(CredentialTable::decode(&[0u8; RECORD_SIZE + 1]).is_none());
    assert!(CredentialTable::decode(&[]).is_none());
}

#[test]
fn encode_decode_round_trip() {
    let mut table = CredentialTable::empty();
    table.set_last_index(7);
    table.set_entry(0, "First", "one");
    table.set_entry(9, "Last", "ten");

    let decoded = CredentialTable::decode(&table.encode()).unwrap();
    assert_eq!(decoded, table);
}

// -----------------------------------------------------------------------------
// load_or_init
// -----------------------------------------------------------------------------

#[test]
fn absent_record_initializes_the_store() {
    let mut store = MemoryBlobStore::default();

    let table = block_on(load_or_init(&mut store)).unwrap();

    assert_eq!(table, CredentialTable::empty());
    assert_eq!(store.writes, 1);
    assert_eq!(store.record.as_ref().map(Vec::len), Some(RECORD_SIZE));
}

#[test]
fn size_mismatch_reads_as_absent_and_reinitializes() {
    let mut store = MemoryBlobStore::with_record(&[0xAAu8; 100]);

    let table = block_on(load_or_init(&mut store)).unwrap();

    assert_eq!(table, CredentialTable::empty());
    assert_eq!(store.writes, 1);
}

#[test]
fn existing_record_is_loaded_without_writing() {
    let mut stored = CredentialTable::empty();
    stored.set_last_index(4);
    stored.set_entry(4, "Known", "secret");
    let mut store = MemoryBlobStore::with_record(&stored.encode());

    let table = block_on(load_or_init(&mut store)).unwrap();

    assert_eq!(table.entry(4), Some(("Known", "secret")));
    assert_eq!(store.writes, 0);
}
