//! Conflicts between emulation keystrokes and host shortcuts.
//!
//! A keystroke is in conflict when the registered commands need it and the
//! host keymap binds it to at least one action. Each conflict is resolved by
//! an [`Owner`] choice kept in [`ShortcutOwners`], which the key router reads
//! on every keystroke.

mod owners;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::config::ShortcutConfig;
use crate::key::{KeyCode, KeyStroke};

pub use owners::{Owner, ShortcutOwners};

/// A host action bound to a keystroke. Opaque apart from its label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostAction {
    pub id: String,
    pub label: String,
}

impl HostAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for HostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// The host's native key bindings.
pub trait HostKeymap {
    /// Actions bound to `key`, in the host's priority order.
    fn actions(&self, key: &KeyStroke) -> Vec<HostAction>;
}

impl HostKeymap for HashMap<KeyStroke, Vec<HostAction>> {
    fn actions(&self, key: &KeyStroke) -> Vec<HostAction> {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl HostKeymap for BTreeMap<KeyStroke, Vec<HostAction>> {
    fn actions(&self, key: &KeyStroke) -> Vec<HostAction> {
        self.get(key).cloned().unwrap_or_default()
    }
}

/// One row of the conflict table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRow {
    pub key: KeyStroke,
    /// First host action bound to the key.
    pub action: HostAction,
    pub owner: Owner,
}

impl ConflictRow {
    /// Label for the shortcut column, e.g. `Ctrl+W`.
    pub fn shortcut_text(&self) -> String {
        self.key.shortcut_text()
    }

    pub fn is_resolved(&self) -> bool {
        self.owner != Owner::Undefined
    }
}

/// Keys the emulation always handles itself: unmodified editing and
/// navigation keys.
pub fn emulation_only_keys() -> BTreeSet<KeyStroke> {
    [
        KeyCode::ENTER,
        KeyCode::ESCAPE,
        KeyCode::TAB,
        KeyCode::BACKSPACE,
        KeyCode::INSERT,
        KeyCode::DELETE,
        KeyCode::HOME,
        KeyCode::END,
        KeyCode::PAGE_UP,
        KeyCode::PAGE_DOWN,
        KeyCode::UP,
        KeyCode::DOWN,
        KeyCode::LEFT,
        KeyCode::RIGHT,
    ]
    .into_iter()
    .map(KeyStroke::named)
    .collect()
}

/// Computes keymap conflicts and holds their resolutions.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver {
    owners: Arc<ShortcutOwners>,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares an existing owner map, e.g. one also held by the key router.
    pub fn with_owners(owners: Arc<ShortcutOwners>) -> Self {
        Self { owners }
    }

    /// One row per key in `required` but not in `exempt` that the host also
    /// binds, sorted by keystroke.
    pub fn compute_conflicts(
        &self,
        required: &BTreeSet<KeyStroke>,
        exempt: &BTreeSet<KeyStroke>,
        host: &impl HostKeymap,
    ) -> Vec<ConflictRow> {
        let owners = self.owners.snapshot();
        let rows: Vec<ConflictRow> = required
            .difference(exempt)
            .filter_map(|key| {
                let action = host.actions(key).into_iter().next()?;
                Some(ConflictRow {
                    key: *key,
                    action,
                    owner: owners.get(key).copied().unwrap_or_default(),
                })
            })
            .collect();
        tracing::debug!(
            required = required.len(),
            conflicts = rows.len(),
            "computed shortcut conflicts"
        );
        rows
    }

    pub fn owner(&self, key: &KeyStroke) -> Owner {
        self.owners.get(key)
    }

    pub fn set_owner(&self, key: KeyStroke, owner: Owner) {
        tracing::debug!(key = %key, %owner, "shortcut owner changed");
        self.owners.set(key, owner);
    }

    pub fn replace_owners(&self, owners: HashMap<KeyStroke, Owner>) {
        tracing::debug!(count = owners.len(), "shortcut owners replaced");
        self.owners.replace(owners);
    }

    /// Replaces the owners with those in a loaded configuration.
    pub fn load_owners(&self, config: &ShortcutConfig) {
        self.replace_owners(config.owners());
    }

    pub fn owners(&self) -> &Arc<ShortcutOwners> {
        &self.owners
    }
}
