//! Demo tasks written on first load of an empty local store.

use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use time::macros::date;
use time::Date;

/// Document key the task collection is stored under.
pub const TASKS_STORAGE_KEY: &str = "tasks-db";

const fn seed_id(n: u128) -> TaskId {
    TaskId::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0000 | n)
}

#[allow(clippy::too_many_arguments)]
fn seed(
    n: u128,
    title: &str,
    description: &str,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Date,
    created_at: i64,
    updated_at: i64,
) -> Task {
    Task {
        id: seed_id(n),
        title: title.to_string(),
        description: Some(description.to_string()),
        status,
        priority,
        due_date: Some(due_date),
        created_at,
        updated_at,
    }
}

/// Seven demo tasks spread over every column, in stored order.
pub fn seed_tasks() -> Vec<Task> {
    vec![
        seed(
            1,
            "Setup project structure",
            "Initialize the project with necessary configurations",
            TaskStatus::Done,
            TaskPriority::High,
            date!(2024 - 01 - 15),
            1_704_873_600_000,
            1_705_069_800_000,
        ),
        seed(
            2,
            "Design dashboard layout",
            "Create wireframes and design mockups for the dashboard",
            TaskStatus::Done,
            TaskPriority::High,
            date!(2024 - 01 - 18),
            1_704_874_500_000,
            1_705_141_200_000,
        ),
        seed(
            3,
            "Implement task form",
            "Build form component with validation",
            TaskStatus::InProgress,
            TaskPriority::High,
            date!(2024 - 01 - 20),
            1_704_963_600_000,
            1_705_232_700_000,
        ),
        seed(
            4,
            "Setup authentication",
            "Implement login and protected routes",
            TaskStatus::InProgress,
            TaskPriority::High,
            date!(2024 - 01 - 22),
            1_704_969_000_000,
            1_705_245_600_000,
        ),
        seed(
            5,
            "Add drag and drop",
            "Implement task movement between columns",
            TaskStatus::Todo,
            TaskPriority::Medium,
            date!(2024 - 01 - 25),
            1_705_050_000_000,
            1_705_222_800_000,
        ),
        seed(
            6,
            "Write unit tests",
            "Add tests for core components and utilities",
            TaskStatus::Todo,
            TaskPriority::Medium,
            date!(2024 - 01 - 28),
            1_705_068_000_000,
            1_705_222_800_000,
        ),
        seed(
            7,
            "Deploy to production",
            "Deploy application to production servers",
            TaskStatus::Todo,
            TaskPriority::Low,
            date!(2024 - 02 - 01),
            1_705_132_800_000,
            1_705_222_800_000,
        ),
    ]
}
