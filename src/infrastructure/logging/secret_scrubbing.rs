use std::fmt;

use regex::Regex;

/// Redacts credentials from text before it reaches a log line
#[derive(Clone)]
pub struct SecretScrubber {
    api_key_header_pattern: Regex,
    bearer_pattern: Regex,
    bot_token_pattern: Regex,
    query_secret_pattern: Regex,
    field_pattern: Regex,
}

impl SecretScrubber {
    /// Create a new scrubber
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // X-API-Key header as printed by request dumps
            api_key_header_pattern: Regex::new(r"(?i)x-api-key\s*[:=]\s*[A-Za-z0-9]+")?,
            // Bearer tokens in Authorization headers
            bearer_pattern: Regex::new(r"Bearer\s+[A-Za-z0-9\-_.=+/]+")?,
            // Discord bot tokens
            bot_token_pattern: Regex::new(r"Bot\s+[A-Za-z0-9\-_.]{20,}")?,
            // OAuth codes and tokens in query strings and form bodies
            query_secret_pattern: Regex::new(
                r"(?i)\b(code|access_token|refresh_token|client_secret)=([^&\s]+)",
            )?,
            // JSON or YAML fields holding secrets
            field_pattern: Regex::new(
                r#"(?i)["']?(api_key|apikey|token|access_token|refresh_token|secret)["']?\s*:\s*["']?([A-Za-z0-9\-_.]+)["']?"#,
            )?,
        })
    }

    /// Scrub a message of sensitive data
    pub fn scrub(&self, message: &str) -> String {
        let scrubbed = self
            .api_key_header_pattern
            .replace_all(message, "X-API-Key: [API_KEY_REDACTED]");
        let scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self
            .bot_token_pattern
            .replace_all(&scrubbed, "Bot [TOKEN_REDACTED]");
        let scrubbed = self
            .query_secret_pattern
            .replace_all(&scrubbed, "$1=[REDACTED]");
        self.field_pattern
            .replace_all(&scrubbed, r#""$1": "[REDACTED]""#)
            .into_owned()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
