//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use chainview_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Validate the merged configuration
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    dir: &str,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(dir, env)?;
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => {
                    output::print_kv("API", &config.api.base_url);
                    output::print_kv("Push channel", &config.realtime.ws_url);
                    output::print_kv("Page size", &config.api.page_size.to_string());
                    output::print_kv(
                        "Reconnect attempts",
                        &config.realtime.max_reconnect_attempts.to_string(),
                    );
                    output::print_kv("Log level", &config.logging.level);
                }
            }
        }
        ConfigCommand::Validate => match super::load_config(dir, env) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}/{}' is valid", dir, env));
                println!("  API: {}", config.api.base_url);
                println!("  Push channel: {}", config.realtime.ws_url);
                println!("  Page size: {}", config.api.page_size);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {}", e)))?;
            }

            tokio::fs::write(out_path, default_config)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {}", e)))?;

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chainview_core::config::AppConfig;

    #[test]
    fn test_bundled_default_matches_built_in_defaults() {
        let bundled: AppConfig = parse_bundled();
        let defaults = AppConfig::default();
        assert_eq!(bundled.api.base_url, defaults.api.base_url);
        assert_eq!(bundled.realtime.ws_url, defaults.realtime.ws_url);
        assert_eq!(
            bundled.realtime.max_reconnect_attempts,
            defaults.realtime.max_reconnect_attempts
        );
        assert_eq!(bundled.store.recent_limit, defaults.store.recent_limit);
    }

    fn parse_bundled() -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../../../../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("bundled default.toml")
    }
}
