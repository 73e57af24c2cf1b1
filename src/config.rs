use std::{env, time::Duration};

use log::warn;
use serde::{Deserialize, Serialize};

/// Settings shared by the [`Client`](crate::Client) and the webhook
/// [`Dispatcher`](crate::webhook::Dispatcher).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudConfig {
    /// Graph API host.
    pub base_url: String,
    /// Graph API version segment, e.g. `v22.0`.
    pub api_version: String,
    /// Bearer token used for outbound calls.
    pub access_token: String,
    /// Token expected in the webhook verification handshake.
    pub verify_token: Option<String>,
    /// App secret used to check `x-hub-signature-256`.
    pub app_secret: Option<String>,
    /// Whether POSTed webhooks must carry a valid signature.
    pub secure: bool,
    /// Recipients per batch in [`Client::broadcast`](crate::Client::broadcast).
    pub batch_size: usize,
    /// Pause between two broadcast batches, in milliseconds.
    pub batch_delay_ms: u64,
    /// Identifier sent in the user agent header.
    pub user_agent: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".into(),
            api_version: "v22.0".into(),
            access_token: String::new(),
            verify_token: None,
            app_secret: None,
            secure: true,
            batch_size: 50,
            batch_delay_ms: 1000,
            user_agent: concat!("whatsapp-cloud/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl CloudConfig {
    /// Build from `WHATSAPP_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var("WHATSAPP_BASE_URL") {
            config.base_url = value;
        }
        if let Ok(value) = env::var("WHATSAPP_API_VERSION") {
            config.api_version = value;
        }
        if let Ok(value) = env::var("WHATSAPP_ACCESS_TOKEN") {
            config.access_token = value;
        }
        config.verify_token = env::var("WHATSAPP_VERIFY_TOKEN").ok();
        config.app_secret = env::var("WHATSAPP_APP_SECRET").ok();
        if let Ok(value) = env::var("WHATSAPP_SECURE") {
            config.secure = !matches!(value.to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        if let Some(size) = parse_env("WHATSAPP_BATCH_SIZE") {
            config.batch_size = size;
        }
        if let Some(delay) = parse_env("WHATSAPP_BATCH_DELAY_MS") {
            config.batch_delay_ms = delay;
        }

        config
    }

    /// Override the Graph API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the Graph API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn with_verify_token(mut self, token: impl Into<String>) -> Self {
        self.verify_token = Some(token.into());
        self
    }

    pub fn with_app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(secret.into());
        self
    }

    /// Disable or enable webhook signature checks.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_batch(mut self, size: usize, delay: Duration) -> Self {
        self.batch_size = size;
        self.batch_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Full URL of `path` under a business phone number.
    pub fn endpoint(&self, phone_id: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            phone_id,
            path
        )
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring {key}: `{value}` is not a valid number");
            None
        }
    }
}
