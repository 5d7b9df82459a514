//! Domain model for the task board.
//!
//! # Responsibility
//! - Define the canonical `Task` record and its closed status/priority sets.
//! - Define mutation payloads (`TaskDraft`, `TaskPatch`) accepted at the entry boundary.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` assigned by persistence.
//! - `status` and `priority` are closed enumerations; no string-typed values leak past parsing.
//! - `updated_at >= created_at` for every valid task.

pub mod task;
