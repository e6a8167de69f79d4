//! Overview command — `taskdeck dashboard`.
//!
//! The three collection fetches are independent; nothing orders them, so
//! they fan out concurrently and join before anything renders.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use console::style;

use taskdeck::api::ApiClient;
use taskdeck_common::{Role, TaskStatus};

pub async fn cmd_dashboard(client: &Arc<ApiClient>) -> Result<()> {
    let (users, tasks, groups) = tokio::try_join!(
        client.list_users(),
        client.list_tasks(),
        client.list_groups()
    )?;

    let employees: Vec<_> = users
        .iter()
        .filter(|u| u.effective_role() == Role::Employee)
        .collect();
    let managers = users
        .iter()
        .filter(|u| u.effective_role() == Role::Manager)
        .count();

    println!("{}", style("Dashboard").bold().cyan());
    println!(
        "  {} task(s) · {} employee(s) · {} manager(s) · {} group(s)",
        tasks.len(),
        employees.len(),
        managers,
        groups.len()
    );

    println!();
    println!("{}", style("Tasks by status").bold());
    for status in [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Completed,
    ] {
        let count = tasks.iter().filter(|t| t.status == status).count();
        println!("  {:<12} {}", status.to_string(), count);
    }

    let today = chrono::Local::now().date_naive();
    let overdue: Vec<_> = tasks.iter().filter(|t| t.is_overdue(today)).collect();
    if !overdue.is_empty() {
        println!();
        println!("{}", style("Overdue").bold().red());
        for task in overdue {
            if let Some(due) = task.due_date {
                println!("  {:>4}  {} (due {})", task.id, task.title, due);
            }
        }
    }

    let mut open_by_assignee: HashMap<i64, usize> = HashMap::new();
    for task in tasks.iter().filter(|t| t.is_open()) {
        for assignee in &task.assigned_to {
            *open_by_assignee.entry(*assignee).or_default() += 1;
        }
    }
    if !employees.is_empty() {
        println!();
        println!("{}", style("Open tasks per employee").bold());
        for employee in &employees {
            let count = open_by_assignee.get(&employee.id).copied().unwrap_or(0);
            println!("  {:<20} {}", employee.username, count);
        }
    }

    Ok(())
}
