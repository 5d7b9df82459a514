//! Task store: canonical collection, filter criteria and derived view.
//!
//! # Responsibility
//! - Exclusively own the canonical task collection.
//! - Expose a filtered, newest-first view that callers may memoize.
//!
//! # Invariants
//! - No I/O happens here; every operation is synchronous.
//! - Other components read through `view()`/lookups or mutate through the
//!   mutation controller.

pub mod filter;
pub mod shared;
pub mod task_store;

pub use filter::{FilterPatch, PriorityFilter, StatusFilter, TaskFilters};
pub use shared::{SharedStore, ViewMemo};
pub use task_store::{BoardColumn, StoreError, StoreResult, TaskStore};
