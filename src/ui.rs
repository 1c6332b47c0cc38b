//! Plain-text rendering for the command line.

use serde::Serialize;
use taskers::{BulkUpdateReport, DashboardData, Task, TaskStatus, TaskView};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn task_line(view: &TaskView) -> String {
    let task = &view.task;
    let check = match task.status {
        TaskStatus::Pending => ' ',
        TaskStatus::Completed => 'x',
    };
    let mut line = format!("[{check}] #{} {} ({})", task.id, task.title, task.priority);
    if let Some(label) = &view.due_label {
        line.push_str(&format!(" (Due: {label})"));
    }
    if view.is_overdue {
        line.push_str(" OVERDUE");
    }
    line
}

pub fn print_tasks(views: &[TaskView]) {
    if views.is_empty() {
        println!("No tasks found.");
        return;
    }
    for view in views {
        println!("{}", task_line(view));
    }
}

pub fn print_task_detail(view: &TaskView) {
    println!("{}", task_line(view));
    if !view.task.description.is_empty() {
        println!("    {}", view.task.description);
    }
    println!("    created {}", view.task.created_at.format("%Y-%m-%d %H:%M"));
}

pub fn print_changed(verb: &str, task: &Task) {
    println!("{verb} #{} {} [{}]", task.id, task.title, task.status);
}

pub fn print_bulk_report(report: &BulkUpdateReport) {
    for id in &report.updated {
        println!("Updated #{id}");
    }
    for failure in &report.failed {
        println!("Skipped #{}: {}", failure.id, failure.error);
    }
}

fn print_section(title: &str, views: &[TaskView]) {
    if views.is_empty() {
        return;
    }
    println!();
    println!("{title}:");
    for view in views {
        println!("  {}", task_line(view));
    }
}

pub fn print_dashboard(data: &DashboardData) {
    let stats = &data.stats;
    println!(
        "Total: {}  Pending: {}  Completed: {}  Overdue: {}",
        stats.total, stats.pending, stats.completed, stats.overdue
    );
    print_section("Overdue", &data.overdue_tasks);
    print_section("Due today", &data.today_tasks);
    print_section("Upcoming", &data.upcoming_tasks);
    print_section("Recent", &data.recent_tasks);
}
