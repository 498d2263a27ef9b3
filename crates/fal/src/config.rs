use std::fmt;
use std::time::Duration;

/// Default edit endpoint (Seedream v4 image edit).
pub const DEFAULT_URL: &str = "https://fal.run/fal-ai/bytedance/seedream/v4/edit";

/// Default per-request timeout. Inference routinely takes tens of seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// fal.ai client configuration loaded from environment variables.
#[derive(Clone)]
pub struct FalConfig {
    /// API key sent as `Authorization: Key <api_key>`.
    pub api_key: String,
    /// Full URL of the edit endpoint.
    pub url: String,
    /// Timeout applied to each individual attempt.
    pub timeout: Duration,
}

impl FalConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default                                  |
    /// |----------------------|------------------------------------------|
    /// | `FALAI_API_KEY`      | required                                 |
    /// | `FALAI_URL`          | [`DEFAULT_URL`]                          |
    /// | `FALAI_TIMEOUT_SECS` | `300`                                    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Panics on invalid values,
    /// which is the desired behaviour at startup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup("FALAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .expect("FALAI_API_KEY must be set");

        let url = lookup("FALAI_URL").unwrap_or_else(|| DEFAULT_URL.into());

        let timeout_secs: u64 = lookup("FALAI_TIMEOUT_SECS")
            .map(|v| v.parse().expect("FALAI_TIMEOUT_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key,
            url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl fmt::Debug for FalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FalConfig")
            .field("api_key", &"<redacted>")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
