//! Distributed Snapshot Wire Tests
//!
//! Tests for the snapshot wire codec:
//! - Exact byte layout
//! - Round trip over randomized snapshots
//! - Reuse of receiving storage across statements
//! - Rejection of malformed input

use distsnap::ids::{
    DistributedSnapshotId, DistributedTransactionId, DistributedTransactionTimeStamp,
};
use distsnap::snapshot::{DistributedSnapshot, SnapshotErrorCode, HEADER_SIZE, XID_WIDTH};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Helper Functions
// =============================================================================

fn dxid(v: u64) -> DistributedTransactionId {
    DistributedTransactionId::new(v)
}

fn make_snapshot(xmin_all: u64, xmin: u64, xmax: u64, in_progress: &[u64], max_count: u32) -> DistributedSnapshot {
    DistributedSnapshot::new(
        DistributedTransactionTimeStamp::new(1_700_000_000),
        DistributedSnapshotId::new(42),
        dxid(xmin_all),
        dxid(xmin),
        dxid(xmax),
        in_progress.iter().copied().map(dxid).collect(),
        max_count,
    )
    .unwrap()
}

/// A valid snapshot with random bounds and a sorted in-progress set.
fn random_snapshot(rng: &mut StdRng) -> DistributedSnapshot {
    let xmin_all = rng.gen_range(1..10_000u64);
    let xmin = xmin_all + rng.gen_range(0..50);
    let xmax = xmin + rng.gen_range(0..200);

    let mut in_progress = Vec::new();
    for candidate in xmin..=xmax {
        if rng.gen_bool(0.2) {
            in_progress.push(dxid(candidate));
        }
    }
    let count = in_progress.len() as u32;
    let max_count = count.max(1) + rng.gen_range(0..16);

    DistributedSnapshot::new(
        DistributedTransactionTimeStamp::new(rng.gen_range(1..u64::MAX)),
        DistributedSnapshotId::new(rng.gen()),
        dxid(xmin_all),
        dxid(xmin),
        dxid(xmax),
        in_progress,
        max_count,
    )
    .unwrap()
}

fn write_i32_at(bytes: &mut [u8], offset: usize, value: i32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

// =============================================================================
// Layout Tests
// =============================================================================

/// Header fields appear in wire order, little-endian.
#[test]
fn test_wire_layout() {
    let snapshot = make_snapshot(90, 100, 110, &[102, 105, 108], 8);
    let bytes = snapshot.serialize();

    assert_eq!(bytes.len(), HEADER_SIZE + 3 * XID_WIDTH);
    assert_eq!(bytes.len(), snapshot.serialized_size());
    assert_eq!(&bytes[0..8], &1_700_000_000u64.to_le_bytes());
    assert_eq!(&bytes[8..16], &90u64.to_le_bytes());
    assert_eq!(&bytes[16..24], &42u64.to_le_bytes());
    assert_eq!(&bytes[24..32], &100u64.to_le_bytes());
    assert_eq!(&bytes[32..40], &110u64.to_le_bytes());
    assert_eq!(&bytes[40..44], &3i32.to_le_bytes());
    assert_eq!(&bytes[44..48], &8i32.to_le_bytes());
    assert_eq!(&bytes[48..56], &102u64.to_le_bytes());
    assert_eq!(&bytes[64..72], &108u64.to_le_bytes());
}

/// Only the populated prefix travels; spare capacity does not.
#[test]
fn test_empty_in_progress_is_header_only() {
    let snapshot = make_snapshot(90, 100, 110, &[], 64);
    assert_eq!(snapshot.serialize().len(), HEADER_SIZE);
}

/// Serialization is deterministic.
#[test]
fn test_serialize_deterministic() {
    let snapshot = make_snapshot(90, 100, 110, &[102, 105, 108], 8);
    assert_eq!(snapshot.serialize(), snapshot.serialize());
}

// =============================================================================
// Round Trip Tests
// =============================================================================

/// Every valid snapshot survives a round trip unchanged.
#[test]
fn test_randomized_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);

    for _ in 0..500 {
        let original = random_snapshot(&mut rng);
        let decoded = DistributedSnapshot::deserialize(&original.serialize()).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.max_count(), original.max_count());
        assert!(decoded.validate().is_ok());
    }
}

/// One receiving snapshot serves a stream of statements.
#[test]
fn test_reused_storage_across_statements() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    let mut target = DistributedSnapshot::with_capacity(256).unwrap();

    for _ in 0..200 {
        let original = random_snapshot(&mut rng);
        target.reset();
        let consumed = target.deserialize_into(&original.serialize()).unwrap();

        assert_eq!(consumed, original.serialized_size());
        assert_eq!(target.in_progress(), original.in_progress());
        assert_eq!(target.xmin_all(), original.xmin_all());
        assert_eq!(target.xmax(), original.xmax());
        // The receiving array is never replaced.
        assert_eq!(target.max_count(), 256);
    }
}

/// Copy produces the same view as a wire transfer.
#[test]
fn test_copy_matches_wire_transfer() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);

    for _ in 0..100 {
        let original = random_snapshot(&mut rng);
        let mut copied = DistributedSnapshot::default();
        copied.copy_from(&original).unwrap();
        let decoded = DistributedSnapshot::deserialize(&original.serialize()).unwrap();

        assert_eq!(copied, decoded);
    }
}

// =============================================================================
// Reset Tests
// =============================================================================

/// Reset clears state but keeps storage, and is idempotent.
#[test]
fn test_reset_idempotent() {
    let mut snapshot = make_snapshot(90, 100, 110, &[102, 105, 108], 8);
    snapshot.reset();
    let once = snapshot.clone();
    snapshot.reset();

    assert_eq!(snapshot, once);
    assert_eq!(snapshot.count(), 0);
    assert_eq!(snapshot.max_count(), 8);
    assert_eq!(snapshot.xmin(), DistributedTransactionId::INVALID);
    assert_eq!(snapshot.timestamp(), DistributedTransactionTimeStamp::UNSET);
    assert!(snapshot.has_backing_array());
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

/// count > maxCount on the wire is corrupt.
#[test]
fn test_count_exceeding_max_rejected() {
    let mut bytes = make_snapshot(90, 100, 110, &[102, 105, 108], 8).serialize();
    write_i32_at(&mut bytes, 44, 2);

    let err = DistributedSnapshot::deserialize(&bytes).unwrap_err();
    assert_eq!(err.code(), SnapshotErrorCode::DtxSnapshotCorrupt);
    assert!(err.is_fatal());
    assert_eq!(err.details(), Some("maxCount 2, count 3"));
}

/// Negative maxCount on the wire is corrupt.
#[test]
fn test_negative_max_count_rejected() {
    let mut bytes = make_snapshot(90, 100, 110, &[], 8).serialize();
    write_i32_at(&mut bytes, 44, -1);

    let err = DistributedSnapshot::deserialize(&bytes).unwrap_err();
    assert_eq!(err.code(), SnapshotErrorCode::DtxSnapshotCorrupt);
}

/// Every strict prefix of a valid encoding is rejected.
#[test]
fn test_every_truncation_rejected() {
    let bytes = make_snapshot(90, 100, 110, &[102, 105, 108], 8).serialize();

    for len in 0..bytes.len() {
        let err = DistributedSnapshot::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.code(), SnapshotErrorCode::DtxSnapshotCorrupt, "prefix {}", len);
    }
}

/// A snapshot too large for the receiving array leaves it untouched.
#[test]
fn test_capacity_exceeded_leaves_target_intact() {
    let previous = make_snapshot(10, 20, 30, &[25], 2);
    let mut target = previous.clone();
    let incoming = make_snapshot(90, 100, 110, &[102, 105, 108], 8);

    let err = target.deserialize_into(&incoming.serialize()).unwrap_err();
    assert_eq!(err.code(), SnapshotErrorCode::DtxSnapshotCapacityExceeded);
    assert_eq!(target, previous);
}
