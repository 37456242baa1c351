// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Livery - chauffeur booking and marketing backend.
//!
//! Binary entry point.

use clap::{Parser, Subcommand};

mod serve;

/// Livery - chauffeur booking and marketing backend.
#[derive(Parser, Debug)]
#[command(name = "livery", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the booking API server.
    Serve,
    /// Load the configuration, validate it, and print a summary.
    Config,
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("livery={log_level},info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match livery_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            livery_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    match cli.command {
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run(config).await {
                tracing::error!(error = %e, "server exited with error");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            println!("service:  {}", config.service.name);
            println!(
                "server:   {}:{} (admin {})",
                config.server.host,
                config.server.port,
                if config.server.admin_token.is_some() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("site:     {}{}", config.site.base_url, config.site.confirm_path);
            println!("database: {}", config.storage.database_path);
            println!(
                "email:    {}",
                config.smtp.host.as_deref().unwrap_or("disabled")
            );
            println!(
                "sms:      {}",
                if config.sms.is_configured() {
                    "configured"
                } else {
                    "disabled"
                }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }
}
