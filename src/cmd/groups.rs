//! Task-group commands — `taskdeck groups`.

use std::sync::Arc;

use anyhow::Result;
use console::style;

use taskdeck::api::ApiClient;
use taskdeck::api::groups::GroupDraft;
use taskdeck::data::GroupService;

use crate::GroupCommands;

pub async fn cmd_groups(client: &Arc<ApiClient>, command: &GroupCommands) -> Result<()> {
    let service = GroupService::new(Arc::clone(client));
    match command {
        GroupCommands::List => {
            service.refresh().await?;
            let groups = service.snapshot();
            println!("{}", style("Task groups").bold().cyan());
            if groups.is_empty() {
                println!("  (none)");
            }
            for group in groups {
                println!(
                    "  {:>4}  {:<24} {} member(s)",
                    group.id,
                    group.name,
                    group.members.len()
                );
            }
        }
        GroupCommands::Create { name, members } => {
            let group = service
                .create(&GroupDraft {
                    name: name.clone(),
                    members: members.clone(),
                })
                .await?;
            println!(
                "{} created group {} (id {})",
                style("✓").green().bold(),
                style(&group.name).bold(),
                group.id
            );
        }
        GroupCommands::Update { id, name, members } => {
            let group = service
                .update(
                    *id,
                    &GroupDraft {
                        name: name.clone(),
                        members: members.clone(),
                    },
                )
                .await?;
            println!(
                "{} updated group {} ({} member(s))",
                style("✓").green().bold(),
                group.name,
                group.members.len()
            );
        }
        GroupCommands::Delete { id } => {
            service.delete(*id).await?;
            println!("{} deleted group {id}", style("✓").green().bold());
        }
    }
    Ok(())
}
