use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use taskdeck::api::ApiClient;
use taskdeck::config::Config;
use taskdeck_common::{Role, TaskStatus};

mod cmd;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(version, about = "Command-line client for the client/task-management backend")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL; overrides config file and TASKDECK_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session tokens
    Login {
        /// Username; prompted for when omitted
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Blacklist the refresh token and drop the local session
    Logout,
    /// Create a user account (admin/manager only)
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// admin, manager or employee; managers can only create employees
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    /// Show or update the current user's profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Request or confirm a password reset
    PasswordReset {
        #[command(subcommand)]
        command: PasswordResetCommands,
    },
    /// Manage employee accounts
    Employees {
        #[command(subcommand)]
        command: EmployeeCommands,
    },
    /// List manager accounts
    Managers,
    /// Manage task groups
    Groups {
        #[command(subcommand)]
        command: GroupCommands,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Summarize tasks, people and groups in one view
    Dashboard,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the current profile (default)
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PasswordResetCommands {
    /// Email a reset link
    Request {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using the uid/token pair from the email
    Confirm {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        token: String,
    },
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    List,
    Update {
        id: i64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    List,
    Create {
        name: String,
        /// Comma-separated employee ids
        #[arg(long, value_delimiter = ',')]
        members: Vec<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long, value_delimiter = ',')]
        members: Vec<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    List {
        /// Only show tasks in this status
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<chrono::NaiveDate>,
        /// Comma-separated employee ids
        #[arg(long, value_delimiter = ',')]
        assign: Vec<i64>,
        #[arg(long)]
        group: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        due: Option<chrono::NaiveDate>,
        #[arg(long, value_delimiter = ',')]
        assign: Option<Vec<i64>>,
        #[arg(long)]
        group: Option<i64>,
    },
    /// Set only the status (the one update employees may make)
    Status {
        id: i64,
        status: TaskStatus,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.api_url.clone())?;
    let client = Arc::new(ApiClient::new(&config)?);

    let outcome = dispatch(&cli, &client).await;

    // One exit path for every terminal auth failure, no matter which
    // command hit it.
    if client.events().expired() {
        eprintln!(
            "{} session expired — run {} to continue",
            console::style("error:").red().bold(),
            console::style("taskdeck login").cyan()
        );
        std::process::exit(2);
    }
    outcome
}

async fn dispatch(cli: &Cli, client: &Arc<ApiClient>) -> Result<()> {
    match &cli.command {
        Commands::Login { username } => cmd::cmd_login(client, username.clone()).await,
        Commands::Logout => cmd::cmd_logout(client).await,
        Commands::Register {
            username,
            email,
            role,
        } => cmd::cmd_register(client, username, email, *role).await,
        Commands::Profile { command } => match command {
            None | Some(ProfileCommands::Show) => cmd::cmd_profile_show(client).await,
            Some(ProfileCommands::Update { username, email }) => {
                cmd::cmd_profile_update(client, username.clone(), email.clone()).await
            }
        },
        Commands::PasswordReset { command } => match command {
            PasswordResetCommands::Request { email } => {
                cmd::cmd_password_reset_request(client, email).await
            }
            PasswordResetCommands::Confirm { uid, token } => {
                cmd::cmd_password_reset_confirm(client, uid, token).await
            }
        },
        Commands::Employees { command } => cmd::cmd_employees(client, command).await,
        Commands::Managers => cmd::cmd_managers(client).await,
        Commands::Groups { command } => cmd::cmd_groups(client, command).await,
        Commands::Tasks { command } => cmd::cmd_tasks(client, command).await,
        Commands::Dashboard => cmd::cmd_dashboard(client).await,
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "taskdeck=debug" } else { "taskdeck=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
