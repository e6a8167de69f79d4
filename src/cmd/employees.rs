//! People commands — `taskdeck employees`, `taskdeck managers`.

use std::sync::Arc;

use anyhow::Result;
use console::style;

use taskdeck::api::ApiClient;
use taskdeck::api::employees::UserUpdate;
use taskdeck::data::UserService;
use taskdeck_common::{Role, User};

use crate::EmployeeCommands;

pub async fn cmd_employees(client: &Arc<ApiClient>, command: &EmployeeCommands) -> Result<()> {
    let service = UserService::new(Arc::clone(client));
    match command {
        EmployeeCommands::List => {
            service.refresh().await?;
            let employees: Vec<User> = service
                .snapshot()
                .into_iter()
                .filter(|user| user.effective_role() == Role::Employee)
                .collect();
            print_users("Employees", &employees);
        }
        EmployeeCommands::Update {
            id,
            username,
            email,
            role,
        } => {
            let user = service
                .update(
                    *id,
                    &UserUpdate {
                        username: username.clone(),
                        email: email.clone(),
                        role: *role,
                    },
                )
                .await?;
            println!(
                "{} updated {} ({})",
                style("✓").green().bold(),
                user.username,
                user.role
            );
        }
        EmployeeCommands::Delete { id } => {
            service.delete(*id).await?;
            println!("{} deleted user {id}", style("✓").green().bold());
        }
    }
    Ok(())
}

pub async fn cmd_managers(client: &Arc<ApiClient>) -> Result<()> {
    let managers = client.list_managers().await?;
    print_users("Managers", &managers);
    Ok(())
}

fn print_users(heading: &str, users: &[User]) {
    println!("{}", style(heading).bold().cyan());
    if users.is_empty() {
        println!("  (none)");
        return;
    }
    for user in users {
        let email = user.email.as_deref().unwrap_or("-");
        println!("  {:>4}  {:<20} {}", user.id, user.username, email);
    }
}
