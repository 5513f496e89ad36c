//! Configuration schema definitions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::conflict::Owner;
use crate::dispatch::DispatchConfig;
use crate::key::KeyStroke;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key dispatch settings
    pub dispatch: DispatchConfig,
    /// Shortcut conflict resolutions
    pub shortcuts: ShortcutConfig,
}

/// Persisted shortcut owners, keyed by key notation (`"<C-w>" = "vim"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub owners: BTreeMap<String, Owner>,
}

impl ShortcutConfig {
    /// Parses the notation keys. Entries that are not a single keystroke are
    /// skipped with a warning so the remaining owners still load.
    pub fn owners(&self) -> HashMap<KeyStroke, Owner> {
        self.owners
            .iter()
            .filter_map(|(notation, owner)| match notation.parse::<KeyStroke>() {
                Ok(key) => Some((key, *owner)),
                Err(err) => {
                    tracing::warn!(key = %notation, error = %err, "skipping shortcut owner");
                    None
                }
            })
            .collect()
    }

    /// Builds the serialisable form of an owner map. `Undefined` entries and
    /// keys whose notation does not parse back to the same stroke (terminal
    /// keys without a name) are left out.
    pub fn from_owners(owners: &HashMap<KeyStroke, Owner>) -> Self {
        Self {
            owners: owners
                .iter()
                .filter(|(_, owner)| **owner != Owner::Undefined)
                .filter_map(|(key, owner)| {
                    let notation = key.to_string();
                    if notation.parse::<KeyStroke>().ok() != Some(*key) {
                        tracing::warn!(
                            key = %notation,
                            "shortcut owner has no notation, not saved"
                        );
                        return None;
                    }
                    Some((notation, *owner))
                })
                .collect(),
        }
    }
}
