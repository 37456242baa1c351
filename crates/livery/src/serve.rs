// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire the configured providers together and run the gateway.

use std::sync::Arc;

use livery_config::LiveryConfig;
use livery_core::{EmailSender, LiveryError, SmsSender};
use livery_gateway::auth::AuthConfig;
use livery_gateway::AppState;
use livery_notify::{Notifier, SmtpMailer, TwilioSms};
use livery_storage::Database;

/// Build the shared state from config and serve until shutdown.
pub async fn run(config: LiveryConfig) -> Result<(), LiveryError> {
    let db = Arc::new(
        Database::open_with_options(&config.storage.database_path, config.storage.wal_mode)
            .await?,
    );

    let mailer: Option<Arc<dyn EmailSender>> = match SmtpMailer::from_config(&config.smtp)? {
        Some(mailer) => Some(Arc::new(mailer)),
        None => {
            tracing::warn!("no SMTP host configured, email channel disabled");
            None
        }
    };
    let sms: Option<Arc<dyn SmsSender>> = match TwilioSms::from_config(&config.sms) {
        Some(sms) => Some(Arc::new(sms)),
        None => {
            tracing::warn!("SMS credentials incomplete, sms channel disabled");
            None
        }
    };

    let notifier = Notifier::new(
        mailer,
        sms,
        config.smtp.from_address.clone(),
        config.smtp.admin_address.clone(),
        config.sms.from_number.clone(),
        config.service.name.clone(),
    );

    if config.server.admin_token.is_none() {
        tracing::warn!("no admin token configured, admin routes will reject all requests");
    }

    let confirm_base = format!("http://{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db: db.clone(),
        notifier,
        site: config.site.clone(),
        confirm_base,
        auth: AuthConfig {
            bearer_token: config.server.admin_token.clone(),
        },
    };

    let result = livery_gateway::start_server(&config.server.host, config.server.port, state).await;

    // Flush the WAL on the way out regardless of how serving ended.
    db.close().await?;
    result
}
