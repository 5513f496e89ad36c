//! Per-keystroke ownership shared between the key router and settings.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::key::KeyStroke;

/// Which side handles a keystroke claimed by both the emulation and the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    /// No decision yet.
    #[default]
    Undefined,
    Vim,
    Ide,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Owner::Undefined => "Undefined",
            Owner::Vim => "Vim",
            Owner::Ide => "IDE",
        };
        f.write_str(label)
    }
}

/// Keystroke to owner map behind an atomically swapped snapshot.
///
/// Reads never block. Writers copy the map, so there should be at most one
/// writer at a time; concurrent `set` calls are still safe but retry.
#[derive(Debug, Default)]
pub struct ShortcutOwners {
    snap: ArcSwap<HashMap<KeyStroke, Owner>>,
}

impl ShortcutOwners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: HashMap<KeyStroke, Owner>) -> Self {
        Self {
            snap: ArcSwap::from_pointee(without_undefined(map)),
        }
    }

    /// The owner of `key`, `Undefined` if none was chosen.
    pub fn get(&self, key: &KeyStroke) -> Owner {
        self.snap.load().get(key).copied().unwrap_or_default()
    }

    /// Records a choice. Setting `Undefined` forgets the key.
    pub fn set(&self, key: KeyStroke, owner: Owner) {
        self.snap.rcu(|current| {
            let mut next = HashMap::clone(current);
            match owner {
                Owner::Undefined => {
                    next.remove(&key);
                }
                owner => {
                    next.insert(key, owner);
                }
            }
            next
        });
    }

    /// Replaces the whole map, as on a settings reload.
    pub fn replace(&self, map: HashMap<KeyStroke, Owner>) {
        self.snap.store(Arc::new(without_undefined(map)));
    }

    /// An immutable view of the current map.
    pub fn snapshot(&self) -> Arc<HashMap<KeyStroke, Owner>> {
        self.snap.load_full()
    }

    pub fn len(&self) -> usize {
        self.snap.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snap.load().is_empty()
    }
}

fn without_undefined(mut map: HashMap<KeyStroke, Owner>) -> HashMap<KeyStroke, Owner> {
    map.retain(|_, owner| *owner != Owner::Undefined);
    map
}
