//! Session commands — `taskdeck login`, `logout`, `register`,
//! `password-reset`.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use taskdeck::api::ApiClient;
use taskdeck::api::auth::NewUser;
use taskdeck_common::Role;

pub async fn cmd_login(client: &Arc<ApiClient>, username: Option<String>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let username = match username {
        Some(name) => name,
        None => Input::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()?,
    };
    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .interact()?;

    let user = client.login(&username, &password).await?;
    println!(
        "{} logged in as {} ({})",
        style("✓").green().bold(),
        style(&user.username).bold(),
        user.effective_role()
    );
    Ok(())
}

pub async fn cmd_logout(client: &Arc<ApiClient>) -> Result<()> {
    client.logout().await?;
    println!("{} logged out", style("✓").green().bold());
    Ok(())
}

pub async fn cmd_register(
    client: &Arc<ApiClient>,
    username: &str,
    email: &str,
    role: Role,
) -> Result<()> {
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Password for {username}"))
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let user = client
        .register(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password,
            role,
        })
        .await?;
    println!(
        "{} created {} ({})",
        style("✓").green().bold(),
        style(&user.username).bold(),
        user.role
    );
    Ok(())
}

pub async fn cmd_password_reset_request(client: &Arc<ApiClient>, email: &str) -> Result<()> {
    let message = client.request_password_reset(email).await?;
    println!("{message}");
    Ok(())
}

pub async fn cmd_password_reset_confirm(
    client: &Arc<ApiClient>,
    uid: &str,
    token: &str,
) -> Result<()> {
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("New password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;
    let message = client.confirm_password_reset(uid, token, &password).await?;
    println!("{message}");
    Ok(())
}
