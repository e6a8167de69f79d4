//! Profile commands — `taskdeck profile`.

use std::sync::Arc;

use anyhow::Result;
use console::style;

use taskdeck::api::ApiClient;
use taskdeck::api::auth::ProfileUpdate;

pub async fn cmd_profile_show(client: &Arc<ApiClient>) -> Result<()> {
    let user = client.profile().await?;
    println!("{}", style(&user.username).bold());
    println!("  id:    {}", user.id);
    println!("  role:  {}", user.effective_role());
    if let Some(email) = &user.email {
        println!("  email: {email}");
    }
    Ok(())
}

pub async fn cmd_profile_update(
    client: &Arc<ApiClient>,
    username: Option<String>,
    email: Option<String>,
) -> Result<()> {
    if username.is_none() && email.is_none() {
        anyhow::bail!("nothing to update; pass --username and/or --email");
    }
    let user = client
        .update_profile(&ProfileUpdate { username, email })
        .await?;
    println!(
        "{} profile updated ({})",
        style("✓").green().bold(),
        user.username
    );
    Ok(())
}
