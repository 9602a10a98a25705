pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const BASE_URL: &str = "wss://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-realtime-preview-2024-10-01";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const BETA_HEADER: &str = "OpenAI-Beta";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 10_000;

/// Consecutive undecodable frames tolerated before the stream is declared lost.
pub const MAX_CONSECUTIVE_DECODE_ERRORS: u32 = 3;

/// Grace period for the background tasks to wind down on close.
pub const CLOSE_GRACE_SECS: u64 = 2;
