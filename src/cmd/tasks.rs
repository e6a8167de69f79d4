//! Task commands — `taskdeck tasks`.

use std::sync::Arc;

use anyhow::Result;
use console::style;

use taskdeck::api::ApiClient;
use taskdeck::api::tasks::{TaskDraft, TaskPatch};
use taskdeck::data::TaskService;
use taskdeck_common::{Task, TaskStatus};

use crate::TaskCommands;

pub async fn cmd_tasks(client: &Arc<ApiClient>, command: &TaskCommands) -> Result<()> {
    let service = TaskService::new(Arc::clone(client));
    match command {
        TaskCommands::List { status } => {
            service.refresh().await?;
            let mut tasks = service.snapshot();
            if let Some(wanted) = status {
                tasks.retain(|task| task.status == *wanted);
            }
            print_tasks(&tasks);
        }
        TaskCommands::Create {
            title,
            description,
            status,
            due,
            assign,
            group,
        } => {
            let task = service
                .create(&TaskDraft {
                    title: title.clone(),
                    description: description.clone(),
                    status: *status,
                    due_date: *due,
                    assigned_to: assign.clone(),
                    group: *group,
                })
                .await?;
            println!(
                "{} created task {} (id {})",
                style("✓").green().bold(),
                style(&task.title).bold(),
                task.id
            );
        }
        TaskCommands::Update {
            id,
            title,
            description,
            status,
            due,
            assign,
            group,
        } => {
            let task = service
                .update(
                    *id,
                    &TaskPatch {
                        title: title.clone(),
                        description: description.clone(),
                        status: *status,
                        due_date: *due,
                        assigned_to: assign.clone(),
                        group: *group,
                    },
                )
                .await?;
            println!(
                "{} updated task {} ({})",
                style("✓").green().bold(),
                task.id,
                task.status
            );
        }
        TaskCommands::Status { id, status } => {
            let task = service.set_status(*id, *status).await?;
            println!(
                "{} task {} is now {}",
                style("✓").green().bold(),
                task.id,
                task.status
            );
        }
        TaskCommands::Delete { id } => {
            service.delete(*id).await?;
            println!("{} deleted task {id}", style("✓").green().bold());
        }
    }
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    println!("{}", style("Tasks").bold().cyan());
    if tasks.is_empty() {
        println!("  (none)");
        return;
    }
    for task in tasks {
        let due = task
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>4}  {:<32} {:<12} due {}",
            task.id,
            task.title,
            styled_status(task.status),
            due
        );
    }
}

fn styled_status(status: TaskStatus) -> String {
    let text = status.to_string();
    match status {
        TaskStatus::Todo => text,
        TaskStatus::InProgress => style(text).yellow().to_string(),
        TaskStatus::Review => style(text).magenta().to_string(),
        TaskStatus::Completed => style(text).green().to_string(),
    }
}
