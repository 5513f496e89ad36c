//! Dispatcher settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::key::KeyStroke;

/// What to do when a typed sequence is both a complete command and the
/// prefix of a longer one (`d` vs `dd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Run the shorter command immediately; longer ones become unreachable.
    PreferExact,
    /// Wait for the next key or the timeout before deciding.
    #[default]
    WaitForTimeout,
}

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Tie-break between an exact match and a longer candidate
    pub ambiguity: AmbiguityPolicy,
    /// How long an ambiguous sequence waits for more keys (milliseconds)
    pub timeout_ms: u64,
    /// Key that cancels any pending sequence or argument
    pub abort_key: KeyStroke,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ambiguity: AmbiguityPolicy::default(),
            timeout_ms: 1000,
            abort_key: KeyStroke::ESCAPE,
        }
    }
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.ambiguity, AmbiguityPolicy::WaitForTimeout);
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.abort_key, KeyStroke::ESCAPE);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DispatchConfig = toml::from_str(
            r#"
ambiguity = "prefer_exact"
abort_key = "<C-c>"
"#,
        )
        .unwrap();
        assert_eq!(config.ambiguity, AmbiguityPolicy::PreferExact);
        assert_eq!(config.abort_key, KeyStroke::ctrl('c'));
        assert_eq!(config.timeout_ms, 1000);
    }
}
