//! `auth-console`: drive the session store against a running API.
//!
//! ```text
//! auth-console register --name Jane --phone 79991234567 --password Passw0rd1
//! auth-console profile
//! auth-console logout
//! ```
//!
//! Configuration comes from `AUTH_API_URL`, `AUTH_STORAGE_DIR` and
//! `AUTH_REQUEST_TIMEOUT_SECS`; the flags below override the first two. The
//! session persists between invocations in the storage directory.

use anyhow::Context;
use auth_store::config::parse_base_url;
use auth_store::validation::format_phone_number;
use auth_store::{
    AuthClient, ClientConfig, ClientError, Credentials, NewUser, NotificationKind, NotificationState,
    UserId, ValidationError,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "auth_store=info,auth_store_runtime=info";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Not logged in")]
    NotLoggedIn,
}

#[derive(Parser, Debug)]
#[command(name = "auth-console", about = "Log in, register and inspect the current session")]
struct Cli {
    /// API base URL, overriding AUTH_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Directory for the persisted session, overriding AUTH_STORAGE_DIR
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with phone number and password
    Login {
        /// Phone number; any digits are formatted as +7(XXX) XXX-XX-XX
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        /// Phone number; any digits are formatted as +7(XXX) XXX-XX-XX
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Fetch a profile, by default the logged-in user's
    Profile {
        user_id: Option<String>,
    },
    /// Show the persisted session without contacting the API
    Whoami,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid AUTH_* environment")?;

    if let Some(url) = &cli.api_url {
        config.base_url = parse_base_url(url)?;
    }
    if let Some(dir) = &cli.storage_dir {
        config = config.with_storage_dir(dir);
    }

    Ok(config)
}

type Client = AuthClient<auth_store::HttpAuthApi, auth_store::FileStorage>;

async fn execute(client: &Client, command: Command) -> Result<(String, NotificationKind), CommandError> {
    match command {
        Command::Login { phone, password } => {
            let credentials = Credentials::new(format_phone_number(&phone), password);
            credentials.validate()?;

            let identity = client.login(credentials).await?;
            Ok((format!("Logged in as {}", identity.name), NotificationKind::Success))
        },
        Command::Register {
            name,
            phone,
            password,
        } => {
            let new_user = NewUser::new(name, format_phone_number(&phone), password);
            new_user.validate()?;

            let identity = client.register(new_user).await?;
            Ok((format!("Registered {} ({})", identity.name, identity.id), NotificationKind::Success))
        },
        Command::Logout => {
            if !client.session().await.is_authenticated() {
                return Ok(("No active session".to_string(), NotificationKind::Info));
            }
            client.logout().await?;
            Ok(("Logged out".to_string(), NotificationKind::Success))
        },
        Command::Profile { user_id } => {
            let user_id = match user_id {
                Some(id) => UserId::new(id),
                None => client
                    .session()
                    .await
                    .basic_identity
                    .map(|identity| identity.id)
                    .ok_or(CommandError::NotLoggedIn)?,
            };

            let profile = client.fetch_profile(user_id).await?;
            Ok((format!("{} {}", profile.name, profile.phone_number), NotificationKind::Info))
        },
        Command::Whoami => match client.session().await.basic_identity {
            Some(identity) => Ok((
                format!("{} ({}) {}", identity.name, identity.id, identity.phone_number),
                NotificationKind::Info,
            )),
            None => Ok(("Not logged in".to_string(), NotificationKind::Warning)),
        },
    }
}

fn render(notification: &NotificationState) {
    if notification.open {
        println!("[{}] {}", notification.kind, notification.message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let client = AuthClient::from_config(&config)?;

    let exit = match execute(&client, cli.command).await {
        Ok((message, kind)) => {
            client.show_notification(message, kind).await?;
            ExitCode::SUCCESS
        },
        Err(error) => {
            tracing::debug!(?error, "Command failed");
            client.show_notification(error.to_string(), NotificationKind::Error).await?;
            ExitCode::FAILURE
        },
    };

    render(&client.notification().await);
    client.hide_notification().await?;

    client.shutdown(SHUTDOWN_TIMEOUT).await?;
    Ok(exit)
}
