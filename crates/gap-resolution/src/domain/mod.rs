//! Pure domain logic: the dependency entry store, the gap cache wrapping
//! it, and the closed outcome/status types consumed by the service layer.

pub mod cache;
pub mod entities;
pub mod invariants;
pub mod store;
pub mod value_objects;

pub use cache::GapCache;
pub use entities::{DependencyRecord, Timestamp};
pub use invariants::InvariantViolation;
pub use store::DependencyStore;
pub use value_objects::{
    ApplyOutcome, BlockReport, BlockStatus, GapStats, ProcessingMetrics, RejectReason,
};
