//! Ad lifecycle and geographic targeting.
//!
//! Everything here is a pure function of its inputs. The caller supplies the
//! records (from the document store) and the current instant; nothing in this
//! crate reads a clock or writes anywhere.

pub mod geo_filter;
pub mod status;
pub mod sync;
pub mod visibility;

pub use geo_filter::{distance_km, fence_filter, is_within_fence, FenceFilterStats};
pub use status::{evaluate, evaluate_with};
pub use sync::{needs_sync, plan_status_sync, StatusChange, SyncStats};
pub use visibility::{is_visible, visible_ads};
