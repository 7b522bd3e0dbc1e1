//! Transaction identity types
//!
//! Two id spaces meet in this crate:
//! - Local transaction ids, assigned by a single node, 32 bits wide and
//!   compared circularly because they wrap around
//! - Distributed transaction ids, assigned by the coordinator, totally
//!   ordered within one coordinator lifetime (epoch)
//!
//! These are PURE TYPES with no behavior beyond construction, access and
//! ordering.

use std::fmt;

/// A node-local transaction identifier.
///
/// Values below [`LocalTransactionId::FIRST_NORMAL`] are reserved:
/// `0` is invalid, `1` is the bootstrap transaction and `2` is the frozen
/// transaction. None of them can ever belong to a distributed transaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LocalTransactionId(u32);

impl LocalTransactionId {
    /// The invalid local transaction id.
    pub const INVALID: Self = Self(0);
    /// The transaction that ran the bootstrap.
    pub const BOOTSTRAP: Self = Self(1);
    /// Marker for frozen tuples.
    pub const FROZEN: Self = Self(2);
    /// The first id handed out to ordinary transactions.
    pub const FIRST_NORMAL: Self = Self(3);

    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// True for ids assigned to ordinary transactions.
    #[inline]
    pub const fn is_normal(&self) -> bool {
        self.0 >= Self::FIRST_NORMAL.0
    }

    /// Circular "happened before" comparison.
    ///
    /// Normal ids are compared modulo 2^32 so that ordering survives
    /// wraparound. Special ids compare by plain integer value.
    pub fn precedes(&self, other: Self) -> bool {
        if !self.is_normal() || !other.is_normal() {
            return self.0 < other.0;
        }
        (self.0.wrapping_sub(other.0) as i32) < 0
    }

    /// Circular "happened after" comparison, the mirror of [`precedes`].
    ///
    /// [`precedes`]: LocalTransactionId::precedes
    pub fn follows(&self, other: Self) -> bool {
        if !self.is_normal() || !other.is_normal() {
            return self.0 > other.0;
        }
        (self.0.wrapping_sub(other.0) as i32) > 0
    }
}

impl fmt::Display for LocalTransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A coordinator-assigned distributed transaction identifier.
///
/// Ordered within a single coordinator epoch only; ids carrying different
/// [`DistributedTransactionTimeStamp`]s must never be compared.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DistributedTransactionId(u64);

impl DistributedTransactionId {
    /// Reserved "none" value.
    pub const INVALID: Self = Self(0);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for DistributedTransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one lifetime (epoch) of the coordinator.
///
/// Only equality is meaningful. `0` means "unset".
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DistributedTransactionTimeStamp(u64);

impl DistributedTransactionTimeStamp {
    pub const UNSET: Self = Self(0);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DistributedTransactionTimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Diagnostic identifier of a snapshot instance. Never used for visibility.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DistributedSnapshotId(u64);

impl DistributedSnapshotId {
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DistributedSnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_local_ids_are_not_normal() {
        assert!(!LocalTransactionId::INVALID.is_normal());
        assert!(!LocalTransactionId::BOOTSTRAP.is_normal());
        assert!(!LocalTransactionId::FROZEN.is_normal());
        assert!(LocalTransactionId::FIRST_NORMAL.is_normal());
        assert!(LocalTransactionId::new(1000).is_normal());
    }

    #[test]
    fn test_invalid_local_id() {
        assert!(!LocalTransactionId::INVALID.is_valid());
        assert!(LocalTransactionId::BOOTSTRAP.is_valid());
    }

    #[test]
    fn test_local_ordering_without_wraparound() {
        let a = LocalTransactionId::new(100);
        let b = LocalTransactionId::new(200);

        assert!(a.precedes(b));
        assert!(b.follows(a));
        assert!(!a.follows(b));
        assert!(!a.precedes(a));
        assert!(!a.follows(a));
    }

    #[test]
    fn test_local_ordering_across_wraparound() {
        // An id handed out just after wraparound follows one handed out just before.
        let before_wrap = LocalTransactionId::new(u32::MAX - 10);
        let after_wrap = LocalTransactionId::new(5);

        assert!(before_wrap.precedes(after_wrap));
        assert!(after_wrap.follows(before_wrap));
    }

    #[test]
    fn test_special_ids_compare_plainly() {
        assert!(LocalTransactionId::FROZEN.precedes(LocalTransactionId::new(u32::MAX)));
        assert!(LocalTransactionId::new(u32::MAX).follows(LocalTransactionId::BOOTSTRAP));
    }

    #[test]
    fn test_distributed_id_ordering() {
        let a = DistributedTransactionId::new(10);
        let b = DistributedTransactionId::new(20);
        assert!(a < b);
        assert!(!DistributedTransactionId::INVALID.is_valid());
        assert_eq!(DistributedTransactionId::default(), DistributedTransactionId::INVALID);
    }

    #[test]
    fn test_timestamp_equality_only() {
        let t1 = DistributedTransactionTimeStamp::new(1_700_000_000);
        let t2 = DistributedTransactionTimeStamp::new(1_700_000_000);
        assert_eq!(t1, t2);
        assert_ne!(t1, DistributedTransactionTimeStamp::UNSET);
    }

    #[test]
    fn test_display() {
        assert_eq!(LocalTransactionId::new(42).to_string(), "42");
        assert_eq!(DistributedTransactionId::new(7).to_string(), "7");
        assert_eq!(DistributedSnapshotId::new(3).to_string(), "3");
    }
}
