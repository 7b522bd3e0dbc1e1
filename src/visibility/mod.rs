//! Distributed visibility
//!
//! Decides whether a locally committed transaction's effects are visible
//! under a distributed snapshot, and whether pruning may treat them as
//! dead cluster-wide.
//!
//! - `committed` - the committed test against one snapshot
//! - `policy` - the prune gate and the explicit active-snapshot context

mod committed;
mod errors;
mod policy;

pub use committed::{CommittedEvaluator, CommittedStatus};
pub use errors::{VisibilityError, VisibilityResult};
pub use policy::{ActiveSnapshot, VisibilityContext};
