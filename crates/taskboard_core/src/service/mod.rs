//! Board use-case services.
//!
//! # Responsibility
//! - Reconcile user mutations against the asynchronous persistence adapter.
//! - Translate drag gestures into validated column moves.

pub mod drag;
pub mod mutation;
pub mod notification;
