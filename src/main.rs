mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskers::config::ENV_DATA_FILE;
use taskers::{
    Config, JsonFileStore, NewTask, Priority, TaskId, TaskQuery, TaskService, TaskUpdate,
};

/// Personal task manager.
#[derive(Parser)]
#[command(name = "taskers")]
#[command(version)]
struct Cli {
    /// Task file (defaults to taskers.json)
    #[arg(long, global = true, env = ENV_DATA_FILE)]
    data_file: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<String>,
        /// YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },
    /// Show one task
    Show { id: u32 },
    /// Change fields of a task; omitted fields stay as they are
    Edit {
        id: u32,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// pending or completed
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long, default_value = "")]
        priority: String,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Apply the same status or priority change to several tasks
    Bulk {
        #[arg(required = true)]
        ids: Vec<u32>,
        /// pending or completed
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long, default_value = "")]
        priority: String,
    },
    /// Flip a task between pending and completed
    Toggle { id: u32 },
    /// Delete a task
    Delete { id: u32 },
    /// List tasks
    List {
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long, default_value = "")]
        priority: String,
        /// created_at, updated_at, due_date, priority or title
        #[arg(long, default_value = "")]
        sort_by: String,
        /// asc or desc
        #[arg(long, default_value = "")]
        sort_order: String,
        /// today, week, overdue or no_date
        #[arg(long, default_value = "")]
        date_filter: String,
    },
    /// Search titles and descriptions
    Search { query: String },
    /// Show counters and highlighted tasks
    Dashboard,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = cli.data_file.clone() {
        config.data_file = path;
    }

    let filter = match (&config.log_filter, cli.verbose) {
        (Some(directive), _) => EnvFilter::new(directive),
        (None, true) => EnvFilter::new("taskers=debug"),
        (None, false) => EnvFilter::new("taskers=info"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let store = JsonFileStore::open(&config.data_file)
        .with_context(|| format!("failed to open {}", config.data_file.display()))?;
    let service = TaskService::new(Arc::new(store)).with_limits(config.limits);

    run(&service, cli.command, cli.json)
}

fn run(service: &TaskService, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Add {
            title,
            description,
            priority,
            due,
        } => {
            let mut new = NewTask::new(title).description(description);
            if let Some(priority) = priority {
                new = new.priority(priority.parse::<Priority>()?);
            }
            new.due_date = due.as_deref().map(parse_due).transpose()?;
            let task = service.create_task(new)?;
            if json {
                ui::print_json(&task)?;
            } else {
                ui::print_changed("Added", &task);
            }
        }
        Commands::Show { id } => {
            let view = service.get_task(TaskId(id))?;
            if json {
                ui::print_json(&view)?;
            } else {
                ui::print_task_detail(&view);
            }
        }
        Commands::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
            clear_due,
        } => {
            let due = due.as_deref().map(parse_due).transpose()?;
            let mut update = TaskUpdate::from_params(&title, &description, &status, &priority, due)?;
            if clear_due {
                update.due_date = Some(None);
            }
            let task = service.update_task(TaskId(id), update)?;
            if json {
                ui::print_json(&task)?;
            } else {
                ui::print_changed("Updated", &task);
            }
        }
        Commands::Bulk {
            ids,
            status,
            priority,
        } => {
            let ids: Vec<TaskId> = ids.into_iter().map(TaskId).collect();
            let update = TaskUpdate::from_params("", "", &status, &priority, None)?;
            let report = service.bulk_update_tasks(&ids, update)?;
            if json {
                ui::print_json(&report)?;
            } else {
                ui::print_bulk_report(&report);
            }
            if !report.is_complete() {
                anyhow::bail!("{} of {} tasks not updated", report.failed.len(), ids.len());
            }
        }
        Commands::Toggle { id } => {
            let task = service.toggle_task_complete(TaskId(id))?;
            if json {
                ui::print_json(&task)?;
            } else {
                ui::print_changed("Toggled", &task);
            }
        }
        Commands::Delete { id } => {
            service.delete_task(TaskId(id))?;
            if !json {
                println!("Deleted #{id}");
            }
        }
        Commands::List {
            status,
            priority,
            sort_by,
            sort_order,
            date_filter,
        } => {
            let query = TaskQuery::from_params(&status, &priority, &sort_by, &sort_order, &date_filter);
            let tasks = service.get_tasks(&query)?;
            if json {
                ui::print_json(&tasks)?;
            } else {
                ui::print_tasks(&tasks);
            }
        }
        Commands::Search { query } => {
            let tasks = service.search_tasks(&query)?;
            if json {
                ui::print_json(&tasks)?;
            } else {
                ui::print_tasks(&tasks);
            }
        }
        Commands::Dashboard => {
            let data = service.get_dashboard_data()?;
            if json {
                ui::print_json(&data)?;
            } else {
                ui::print_dashboard(&data);
            }
        }
    }
    Ok(())
}

/// Accepts RFC 3339, a local `YYYY-MM-DDTHH:MM`, or a bare date meaning the
/// end of that local day.
fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(due) = DateTime::parse_from_rfc3339(raw) {
        return Ok(due.with_timezone(&Utc));
    }
    let local = if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        naive
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("unrecognized due date '{raw}'"))?
            .and_hms_opt(23, 59, 59)
            .context("invalid end-of-day time")?
    };
    let due = local
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("'{raw}' does not exist in the local timezone"))?;
    Ok(due.with_timezone(&Utc))
}
