//! CLI command definitions and dispatch.

pub mod config;
pub mod notification;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use chainview_client::http::HttpNotificationApi;
use chainview_core::config::AppConfig;
use chainview_core::error::AppError;
use chainview_entity::session::AuthSession;

/// Chainview notifications from the command line
#[derive(Debug, Parser)]
#[command(name = "chainview", version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Configuration overlay to merge over `default`
    #[arg(short, long, env = "CHAINVIEW_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Log request details to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Identity to act as
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Who the requests are made for
#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// User id
    #[arg(long, env = "CHAINVIEW_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Company id
    #[arg(long, env = "CHAINVIEW_COMPANY_ID", global = true)]
    pub company_id: Option<String>,

    /// Bearer token
    #[arg(long, env = "CHAINVIEW_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
}

impl IdentityArgs {
    /// Build the session, failing on the first missing piece.
    pub fn session(&self) -> Result<AuthSession, AppError> {
        let user_id = required(&self.user_id, "--user-id / CHAINVIEW_USER_ID")?;
        let company_id = required(&self.company_id, "--company-id / CHAINVIEW_COMPANY_ID")?;
        let token = required(&self.token, "--token / CHAINVIEW_ACCESS_TOKEN")?;
        Ok(AuthSession::new(user_id, company_id, token))
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::authentication(format!("Missing {name}")))
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List notifications
    List(notification::ListArgs),
    /// Show unread and priority counts
    Summary,
    /// Mark notifications read
    Read(notification::IdsArgs),
    /// Mark notifications unread
    Unread(notification::IdsArgs),
    /// Archive notifications
    Archive(notification::IdsArgs),
    /// Delete notifications
    Delete(notification::DeleteArgs),
    /// Mark every unread notification read
    ReadAll(notification::ConfirmArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &self.config, &self.env, self.format).await;
        }

        let config = load_config(&self.config, &self.env)?;
        let api = HttpNotificationApi::new(&config.api, Arc::new(self.identity.session()?))?;

        match &self.command {
            Commands::List(args) => notification::list(&api, &config, args, self.format).await,
            Commands::Summary => notification::summary(&api, self.format).await,
            Commands::Read(args) => notification::read(&api, args).await,
            Commands::Unread(args) => notification::unread(&api, args).await,
            Commands::Archive(args) => notification::archive(&api, args).await,
            Commands::Delete(args) => notification::delete(&api, args).await,
            Commands::ReadAll(args) => notification::read_all(&api, &config, args).await,
            Commands::Config(_) => Ok(()),
        }
    }
}

/// Helper: load configuration from `dir/default` + `dir/{env}` + environment
pub fn load_config(dir: &str, env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(dir, env)
}

/// Helper: ask before a destructive action unless `force` is set
pub fn confirm(prompt: &str, force: bool) -> Result<bool, AppError> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}
