//! Wire codec for DistributedSnapshot
//!
//! Layout (all little-endian, fixed width):
//! - timestamp (u64)
//! - xminAll (u64)
//! - snapshot id (u64)
//! - xmin (u64)
//! - xmax (u64)
//! - count (i32)
//! - maxCount (i32)
//! - `count` in-progress ids (u64 each)
//!
//! Decoding into an existing snapshot reuses its array when it has one.

use std::io::{Cursor, Read};

use crate::ids::{DistributedSnapshotId, DistributedTransactionId, DistributedTransactionTimeStamp};
use crate::observability::{log_event, log_event_at, DebugSwitches, Event, Logger};

use super::distributed::DistributedSnapshot;
use super::errors::{SnapshotError, SnapshotResult};

pub const TIMESTAMP_WIDTH: usize = 8;
pub const XID_WIDTH: usize = 8;
pub const SNAPSHOT_ID_WIDTH: usize = 8;
pub const COUNT_WIDTH: usize = 4;

/// Bytes before the in-progress array.
pub const HEADER_SIZE: usize = TIMESTAMP_WIDTH + SNAPSHOT_ID_WIDTH + 3 * XID_WIDTH + 2 * COUNT_WIDTH;

impl DistributedSnapshot {
    /// Clears every field except `max_count` and the array allocation.
    pub fn reset(&mut self) {
        self.timestamp = DistributedTransactionTimeStamp::UNSET;
        self.xmin_all = DistributedTransactionId::INVALID;
        self.id = DistributedSnapshotId::default();
        self.xmin = DistributedTransactionId::INVALID;
        self.xmax = DistributedTransactionId::INVALID;
        self.in_progress.clear();
    }

    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE + XID_WIDTH * self.in_progress.len()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        self.serialize_into(&mut buf);
        buf
    }

    /// Appends the wire form to `buf`, returning the number of bytes written.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) -> usize {
        let start = buf.len();

        buf.extend_from_slice(&self.timestamp.value().to_le_bytes());
        buf.extend_from_slice(&self.xmin_all.value().to_le_bytes());
        buf.extend_from_slice(&self.id.value().to_le_bytes());
        buf.extend_from_slice(&self.xmin.value().to_le_bytes());
        buf.extend_from_slice(&self.xmax.value().to_le_bytes());
        // Both fit: count <= max_count <= i32::MAX.
        buf.extend_from_slice(&(self.in_progress.len() as i32).to_le_bytes());
        buf.extend_from_slice(&(self.max_count as i32).to_le_bytes());

        for xid in &self.in_progress {
            buf.extend_from_slice(&xid.value().to_le_bytes());
        }

        let written = buf.len() - start;
        debug_assert_eq!(written, self.serialized_size());
        written
    }

    /// Decodes a snapshot into fresh storage.
    pub fn deserialize(data: &[u8]) -> SnapshotResult<Self> {
        let mut snapshot = Self::default();
        snapshot.deserialize_into(data)?;
        Ok(snapshot)
    }

    /// Decodes a snapshot into `self`, returning the number of bytes consumed.
    ///
    /// When `self` already owns an array, the decoded count must fit it and
    /// the existing `max_count` is kept. Otherwise an array of the larger of
    /// the decoded and existing `max_count` is allocated.
    ///
    /// On error `self` is left unchanged.
    pub fn deserialize_into(&mut self, data: &[u8]) -> SnapshotResult<usize> {
        let mut cursor = Cursor::new(data);

        let timestamp = read_u64(&mut cursor, "timestamp")?;
        let xmin_all = read_u64(&mut cursor, "xminAllDistributedSnapshots")?;
        let id = read_u64(&mut cursor, "distribSnapshotId")?;
        let xmin = read_u64(&mut cursor, "xmin")?;
        let xmax = read_u64(&mut cursor, "xmax")?;
        let count = read_i32(&mut cursor, "count")?;
        let max_count = read_i32(&mut cursor, "maxCount")?;

        if max_count < 0 || count < 0 || count > max_count {
            return Err(reject(SnapshotError::invalid_counts(
                "Invalid distributed snapshot received",
                i64::from(max_count),
                i64::from(count),
            )));
        }
        let count = count as u32;
        let max_count = max_count as u32;

        let needed = HEADER_SIZE + XID_WIDTH * count as usize;
        if data.len() < needed {
            return Err(reject(SnapshotError::corrupt_at_offset(
                data.len(),
                format!(
                    "Truncated distributed snapshot: {} in-progress ids need {} bytes",
                    count, needed
                ),
            )));
        }

        if self.has_backing_array() {
            if count > self.max_count {
                return Err(reject(SnapshotError::too_many_in_progress(self.max_count, count)));
            }
        } else if max_count > 0 {
            self.allocate_in_progress(max_count.max(self.max_count))
                .map_err(reject)?;
        }

        self.timestamp = DistributedTransactionTimeStamp::new(timestamp);
        self.xmin_all = DistributedTransactionId::new(xmin_all);
        self.id = DistributedSnapshotId::new(id);
        self.xmin = DistributedTransactionId::new(xmin);
        self.xmax = DistributedTransactionId::new(xmax);

        self.in_progress.clear();
        self.in_progress.extend(
            data[HEADER_SIZE..needed]
                .chunks_exact(XID_WIDTH)
                .map(|chunk| {
                    let mut raw = [0u8; XID_WIDTH];
                    raw.copy_from_slice(chunk);
                    DistributedTransactionId::new(u64::from_le_bytes(raw))
                }),
        );

        let severity = DebugSwitches::full_severity(Event::SnapshotDeserialized.default_severity());
        if Logger::enabled(severity) {
            log_event_at(
                severity,
                Event::SnapshotDeserialized,
                &[
                    ("count", count.to_string().as_str()),
                    ("distrib_snapshot_id", id.to_string().as_str()),
                    ("max_count", self.max_count.to_string().as_str()),
                ],
            );
        }

        Ok(needed)
    }

    /// Copies `source` into `self`, reusing `self`'s array when it has one.
    pub fn copy_from(&mut self, source: &DistributedSnapshot) -> SnapshotResult<()> {
        if source.max_count == 0 || source.count() > source.max_count {
            return Err(reject(SnapshotError::invalid_counts(
                "Invalid distributed snapshot",
                i64::from(source.max_count),
                i64::from(source.count()),
            )));
        }

        if self.has_backing_array() {
            if source.count() > self.max_count {
                return Err(reject(SnapshotError::too_many_in_progress(
                    self.max_count,
                    source.count(),
                )));
            }
        } else {
            self.allocate_in_progress(source.max_count).map_err(reject)?;
        }

        let severity = DebugSwitches::full_severity(Event::SnapshotCopied.default_severity());
        if Logger::enabled(severity) {
            log_event_at(
                severity,
                Event::SnapshotCopied,
                &[
                    ("source_count", source.count().to_string().as_str()),
                    ("source_max_count", source.max_count.to_string().as_str()),
                    ("target_max_count", self.max_count.to_string().as_str()),
                ],
            );
        }

        self.reset();
        self.timestamp = source.timestamp;
        self.xmin_all = source.xmin_all;
        self.id = source.id;
        self.xmin = source.xmin;
        self.xmax = source.xmax;
        self.in_progress.extend_from_slice(&source.in_progress);

        Ok(())
    }
}

fn read_u64(cursor: &mut Cursor<&[u8]>, field: &str) -> SnapshotResult<u64> {
    let mut buf = [0u8; 8];
    let offset = cursor.position() as usize;
    cursor.read_exact(&mut buf).map_err(|_| {
        reject(SnapshotError::corrupt_at_offset(
            offset,
            format!("Truncated distributed snapshot reading {}", field),
        ))
    })?;
    Ok(u64::from_le_bytes(buf))
}

fn read_i32(cursor: &mut Cursor<&[u8]>, field: &str) -> SnapshotResult<i32> {
    let mut buf = [0u8; 4];
    let offset = cursor.position() as usize;
    cursor.read_exact(&mut buf).map_err(|_| {
        reject(SnapshotError::corrupt_at_offset(
            offset,
            format!("Truncated distributed snapshot reading {}", field),
        ))
    })?;
    Ok(i32::from_le_bytes(buf))
}

/// Logs a codec failure on its way out.
fn reject(err: SnapshotError) -> SnapshotError {
    let event = match err.code() {
        super::errors::SnapshotErrorCode::DtxOutOfMemory => Event::SnapshotOutOfMemory,
        _ => Event::SnapshotCorrupt,
    };
    log_event(
        event,
        &[
            ("code", err.code().code()),
            ("details", err.details().unwrap_or("")),
            ("message", err.message()),
        ],
    );
    err
}
