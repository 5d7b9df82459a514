//! Task state engine for the task board.
//!
//! Owns the canonical task collection, its filtered view, and the optimistic
//! mutation protocol that reconciles user edits with a latent, fallible
//! persistence adapter.

pub mod adapter;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use adapter::{
    AdapterError, AdapterOp, AdapterResult, FaultInjector, LocalStoreAdapter, TaskAdapter,
};
pub use config::{AdapterConfig, BoardConfig, ConfigError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::task::{
    format_due_date, parse_due_date, today_utc, Task, TaskDraft, TaskId, TaskPatch, TaskPriority,
    TaskStatus, TaskValidationError,
};
pub use service::drag::{handle_drop, resolve_drop, DropTarget};
pub use service::mutation::{
    ApplyPolicy, BoardError, FailurePolicy, MutationController, MutationKind, MutationPolicy,
    MutationResult, MUTATION_POLICIES,
};
pub use service::notification::{Notification, NotificationLevel};
pub use store::{
    BoardColumn, FilterPatch, PriorityFilter, SharedStore, StatusFilter, StoreError, TaskFilters,
    TaskStore, ViewMemo,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
