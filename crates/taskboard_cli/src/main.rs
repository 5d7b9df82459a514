//! Command-line front end for the task board.
//!
//! # Responsibility
//! - Drive the board engine against the local storage adapter.
//! - Print board columns and one line per mutation notification.

use clap::{Args, Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::{
    format_due_date, handle_drop, init_from_config, parse_due_date, today_utc, AdapterConfig,
    BoardColumn, BoardConfig, FilterPatch, LocalStoreAdapter, MutationController, Notification,
    PriorityFilter, SharedStore, StatusFilter, Task, TaskDraft, TaskId, TaskPatch, TaskPriority,
    TaskStatus, ViewMemo,
};
use time::Date;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Kanban task board backed by local storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides the config value
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Skip simulated adapter latency
    #[arg(long, global = true)]
    instant: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board, one section per column
    List {
        /// Case-insensitive match on title or description
        #[arg(long)]
        search: Option<String>,

        /// all, todo, in-progress or done
        #[arg(long, value_parser = parse_status_filter)]
        status: Option<StatusFilter>,

        /// all, low, medium or high
        #[arg(long, value_parser = parse_priority_filter)]
        priority: Option<PriorityFilter>,
    },

    /// Create a task
    Add(TaskForm),

    /// Edit fields of a task
    Edit {
        id: TaskId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,

        #[arg(long, value_parser = parse_priority)]
        priority: Option<TaskPriority>,

        /// YYYY-MM-DD
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_due")]
        due: Option<Date>,

        #[arg(long)]
        clear_due: bool,
    },

    /// Overwrite every editable field; omitted description and due date are cleared
    Replace {
        id: TaskId,

        #[command(flatten)]
        form: TaskForm,
    },

    /// Delete a task
    Delete { id: TaskId },

    /// Drop a task onto a column id or onto another task
    Move { id: TaskId, target: String },
}

/// Full task form, as submitted by the create and edit dialogs.
#[derive(Args)]
struct TaskForm {
    title: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, value_parser = parse_status, default_value = "todo")]
    status: TaskStatus,

    #[arg(long, value_parser = parse_priority, default_value = "medium")]
    priority: TaskPriority,

    /// YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    due: Option<Date>,
}

impl TaskForm {
    fn into_draft(self) -> TaskDraft {
        TaskDraft {
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the board reported an error notification.
async fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let config = resolve_config(&cli)?;
    init_from_config(&config)?;

    let adapter = LocalStoreAdapter::open(&config.db_path, config.adapter.clone())?;
    let controller = MutationController::new(adapter, SharedStore::default());
    if let Some(notification) = controller.load().await {
        report(&notification);
        return Ok(false);
    }

    let outcome = match cli.command {
        Commands::List {
            search,
            status,
            priority,
        } => {
            let patch = FilterPatch {
                search,
                status,
                priority,
            };
            controller.store().write(|store| store.set_filters(patch));
            let mut memo = ViewMemo::new();
            for line in render_board(controller.store(), &mut memo, today_utc())? {
                println!("{line}");
            }
            return Ok(true);
        }
        Commands::Add(form) => controller.create(form.into_draft()).await?,
        Commands::Edit {
            id,
            title,
            description,
            clear_description,
            status,
            priority,
            due,
            clear_due,
        } => {
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                status,
                priority,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            if patch.is_empty() {
                return Err("nothing to edit".into());
            }
            controller.update(id, patch).await?
        }
        Commands::Replace { id, form } => {
            controller
                .update(id, TaskPatch::from(form.into_draft()))
                .await?
        }
        Commands::Delete { id } => controller.delete(id).await?,
        Commands::Move { id, target } => match handle_drop(&controller, id, &target).await? {
            Some(notification) => notification,
            None => {
                println!("nothing to move");
                return Ok(true);
            }
        },
    };

    report(&outcome);
    Ok(outcome.is_success())
}

fn resolve_config(cli: &Cli) -> Result<BoardConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if cli.instant {
        config.adapter = AdapterConfig {
            failure_rate: config.adapter.failure_rate,
            ..AdapterConfig::instant()
        };
    }
    info!(
        "event=cli_start module=cli status=ok db_path={} instant={}",
        config.db_path.display(),
        cli.instant
    );
    Ok(config)
}

/// Column headers with counts, then one line per visible task.
fn render_board(
    store: &SharedStore,
    memo: &mut ViewMemo,
    today: Date,
) -> Result<Vec<String>, time::error::Format> {
    let columns = store.read(|store| BoardColumn::group(memo.view(store)));

    let mut lines = Vec::new();
    for column in columns {
        lines.push(format!("{} ({})", column.label(), column.count()));
        for task in &column.tasks {
            lines.push(format!("  {}", task_line(task, today)?));
        }
    }
    Ok(lines)
}

fn task_line(task: &Task, today: Date) -> Result<String, time::error::Format> {
    let mut line = format!("{} [{}] {}", task.id, task.priority.label(), task.title);
    if let Some(due) = task.due_date {
        line.push_str(" due ");
        line.push_str(&format_due_date(due)?);
        if task.is_overdue(today) {
            line.push_str(" (overdue)");
        }
    }
    Ok(line)
}

fn report(notification: &Notification) {
    if notification.is_success() {
        println!("{}: {}", notification.title(), notification.description);
    } else {
        eprintln!("{}: {}", notification.title(), notification.description);
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(raw).ok_or_else(|| format!("unknown status `{raw}`"))
}

fn parse_priority(raw: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(raw).ok_or_else(|| format!("unknown priority `{raw}`"))
}

fn parse_status_filter(raw: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse(raw).ok_or_else(|| format!("unknown status filter `{raw}`"))
}

fn parse_priority_filter(raw: &str) -> Result<PriorityFilter, String> {
    PriorityFilter::parse(raw).ok_or_else(|| format!("unknown priority filter `{raw}`"))
}

fn parse_date(raw: &str) -> Result<Date, String> {
    parse_due_date(raw).map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
