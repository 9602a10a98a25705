use std::time::Duration;

use secrecy::SecretString;

use crate::connection::consts;

/// Endpoint, credential and retry policy for one connection.
#[derive(Clone)]
pub struct ConnectOptions {
    base_url: String,
    api_key: SecretString,
    model: String,
    max_attempts: u32,
    attempt_timeout: Duration,
    backoff_base: Duration,
    backoff_cap: Duration,
}

pub struct ConnectOptionsBuilder {
    options: ConnectOptions,
}

impl ConnectOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: ConnectOptions::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.options.base_url = base_url.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.options.api_key = SecretString::from(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.options.model = model.to_string();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.options.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.options.attempt_timeout = attempt_timeout;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.options.backoff_base = backoff_base;
        self
    }

    pub fn with_backoff_cap(mut self, backoff_cap: Duration) -> Self {
        self.options.backoff_cap = backoff_cap;
        self
    }

    pub fn build(self) -> ConnectOptions {
        self.options
    }
}

impl Default for ConnectOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self {
            base_url: consts::BASE_URL.to_string(),
            api_key: std::env::var(consts::API_KEY_ENV)
                .unwrap_or_else(|_| "".to_string())
                .into(),
            model: consts::DEFAULT_MODEL.to_string(),
            max_attempts: consts::DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: Duration::from_secs(consts::DEFAULT_ATTEMPT_TIMEOUT_SECS),
            backoff_base: Duration::from_millis(consts::DEFAULT_BACKOFF_BASE_MS),
            backoff_cap: Duration::from_millis(consts::DEFAULT_BACKOFF_CAP_MS),
        }
    }

    pub fn builder() -> ConnectOptionsBuilder {
        ConnectOptionsBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Delay before the attempt that follows failure number `failed` (0-based):
    /// `min(base * 2^failed, cap)`.
    pub fn backoff_delay(&self, failed: u32) -> Duration {
        let factor = 1u32.checked_shl(failed).unwrap_or(u32::MAX);
        self.backoff_base
            .saturating_mul(factor)
            .min(self.backoff_cap)
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}
