//! Process-wide command registry.
//!
//! Every key-sequence of every descriptor is indexed in a per-mode trie, so a
//! partially typed sequence can be classified as no match, a strict prefix of
//! longer commands, or an exact match (possibly also a prefix).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use super::{CommandDescriptor, CommandHandler, MappingMode, RegisteredCommand};
use crate::key::{KeySequence, KeyStroke};

/// Registration failures. These are startup invariant violations: callers
/// should abort initialisation rather than recover.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("command {name} has no key sequences")]
    EmptyKeySet { name: String },
    #[error("command {name} has an empty key sequence")]
    EmptyKeySequence { name: String },
    #[error("command {name} is not bound in any mapping mode")]
    NoMappingModes { name: String },
    #[error("{keys} in {mode:?} mode is already bound to {existing}, cannot bind it to {name}")]
    DuplicateBinding {
        keys: KeySequence,
        mode: MappingMode,
        existing: String,
        name: String,
    },
}

/// Result of looking up a (partial) key-sequence.
pub enum KeyLookup<C> {
    /// No registered sequence starts with these keys.
    NoMatch,
    /// The keys are a strict prefix of at least one longer sequence.
    Prefix,
    /// The keys are a registered sequence. `has_longer` is set when longer
    /// sequences share this prefix.
    Match {
        command: Arc<RegisteredCommand<C>>,
        has_longer: bool,
    },
}

impl<C> fmt::Debug for KeyLookup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLookup::NoMatch => f.write_str("NoMatch"),
            KeyLookup::Prefix => f.write_str("Prefix"),
            KeyLookup::Match {
                command,
                has_longer,
            } => f
                .debug_struct("Match")
                .field("command", command)
                .field("has_longer", has_longer)
                .finish(),
        }
    }
}

impl<C> KeyLookup<C> {
    pub fn is_no_match(&self) -> bool {
        matches!(self, KeyLookup::NoMatch)
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self, KeyLookup::Prefix)
    }

    pub fn is_match(&self) -> bool {
        matches!(self, KeyLookup::Match { .. })
    }
}

struct KeyNode<C> {
    command: Option<Arc<RegisteredCommand<C>>>,
    children: BTreeMap<KeyStroke, KeyNode<C>>,
}

impl<C> Default for KeyNode<C> {
    fn default() -> Self {
        Self {
            command: None,
            children: BTreeMap::new(),
        }
    }
}

impl<C> KeyNode<C> {
    fn find(&self, keys: &[KeyStroke]) -> Option<&KeyNode<C>> {
        keys.iter()
            .try_fold(self, |node, key| node.children.get(key))
    }

    fn insert(&mut self, keys: &[KeyStroke], command: Arc<RegisteredCommand<C>>) {
        let node = keys
            .iter()
            .fold(self, |node, key| node.children.entry(*key).or_default());
        node.command = Some(command);
    }
}

/// Maps key-sequences to registered commands, one trie per mapping mode.
pub struct CommandRegistry<C> {
    tries: HashMap<MappingMode, KeyNode<C>>,
    commands: Vec<Arc<RegisteredCommand<C>>>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommandRegistry<C> {
    pub fn new() -> Self {
        Self {
            tries: HashMap::new(),
            commands: Vec::new(),
        }
    }

    /// Registers a command with its own handler.
    pub fn register<H>(
        &mut self,
        descriptor: CommandDescriptor,
        handler: H,
    ) -> Result<Arc<RegisteredCommand<C>>, RegistryError>
    where
        H: CommandHandler<C> + 'static,
    {
        self.register_shared(descriptor, Arc::new(handler))
    }

    /// Registers a command with a handler that may be shared with other
    /// descriptors.
    ///
    /// Fails without touching the registry if the descriptor is malformed or
    /// if one of its sequences is already bound, in a shared mode, to another
    /// command. Registering an identical descriptor with the same handler again
    /// returns the existing registration unchanged.
    pub fn register_shared(
        &mut self,
        descriptor: CommandDescriptor,
        handler: Arc<dyn CommandHandler<C>>,
    ) -> Result<Arc<RegisteredCommand<C>>, RegistryError> {
        if let Some(existing) = self.validate(&descriptor, &handler)? {
            tracing::debug!(command = descriptor.name(), "command already registered");
            return Ok(existing);
        }

        let command = Arc::new(RegisteredCommand::new(descriptor, handler));
        let descriptor = command.descriptor();
        for mode in descriptor.modes().modes() {
            let trie = self.tries.entry(mode).or_default();
            for keys in descriptor.keys() {
                trie.insert(keys, Arc::clone(&command));
            }
        }

        tracing::debug!(
            command = descriptor.name(),
            keys = descriptor.keys().len(),
            kind = ?descriptor.command_type(),
            argument = ?descriptor.argument_type(),
            "registered command"
        );

        self.commands.push(Arc::clone(&command));
        Ok(command)
    }

    /// Checks a registration. Returns the existing registration if this exact
    /// command is already registered.
    fn validate(
        &self,
        descriptor: &CommandDescriptor,
        handler: &Arc<dyn CommandHandler<C>>,
    ) -> Result<Option<Arc<RegisteredCommand<C>>>, RegistryError> {
        let name = descriptor.name().to_string();
        if descriptor.keys().is_empty() {
            return Err(RegistryError::EmptyKeySet { name });
        }
        if descriptor.keys().iter().any(|keys| keys.is_empty()) {
            return Err(RegistryError::EmptyKeySequence { name });
        }
        if descriptor.modes().is_empty() {
            return Err(RegistryError::NoMappingModes { name });
        }

        for mode in descriptor.modes().modes() {
            let Some(trie) = self.tries.get(&mode) else {
                continue;
            };
            for keys in descriptor.keys() {
                let existing = trie.find(keys).and_then(|node| node.command.as_ref());
                let Some(existing) = existing else {
                    continue;
                };
                if existing.same_handler(handler) && **existing.descriptor() == *descriptor {
                    return Ok(Some(Arc::clone(existing)));
                }
                return Err(RegistryError::DuplicateBinding {
                    keys: keys.clone(),
                    mode,
                    existing: existing.descriptor().name().to_string(),
                    name,
                });
            }
        }
        Ok(None)
    }

    /// Classifies a (partial) key-sequence in the given mode.
    pub fn lookup(&self, mode: MappingMode, keys: &[KeyStroke]) -> KeyLookup<C> {
        let Some(node) = self.tries.get(&mode).and_then(|trie| trie.find(keys)) else {
            return KeyLookup::NoMatch;
        };
        let has_longer = !node.children.is_empty();
        match &node.command {
            Some(command) => KeyLookup::Match {
                command: Arc::clone(command),
                has_longer,
            },
            None if has_longer => KeyLookup::Prefix,
            None => KeyLookup::NoMatch,
        }
    }

    /// Every keystroke the registered commands use that could collide with a
    /// host shortcut.
    pub fn required_shortcut_keys(&self) -> BTreeSet<KeyStroke> {
        self.commands
            .iter()
            .flat_map(|command| command.descriptor().keys().iter())
            .flat_map(|keys| keys.iter().copied())
            .filter(KeyStroke::requires_shortcut)
            .collect()
    }

    /// Finds a registered command by descriptor name.
    pub fn get(&self, name: &str) -> Option<&Arc<RegisteredCommand<C>>> {
        self.commands
            .iter()
            .find(|command| command.descriptor().name() == name)
    }

    /// All registrations in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<RegisteredCommand<C>>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Argument, CommandType, MappingModes};
    use crate::key::parse_keys;

    type Ctx = Vec<&'static str>;

    fn noop(_: &mut Ctx, _: usize, _: usize, _: Option<&Argument>) -> bool {
        true
    }

    fn descriptor(name: &str, keys: &[&str]) -> CommandDescriptor {
        CommandDescriptor::parse(name, CommandType::OtherReadonly, keys).unwrap()
    }

    fn keys(input: &str) -> KeySequence {
        parse_keys(input).unwrap()
    }

    #[test]
    fn test_lookup_classifies_sequences() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        registry.register(descriptor("GotoTop", &["gg"]), noop).unwrap();
        registry.register(descriptor("Reformat", &["gq"]), noop).unwrap();
        registry.register(descriptor("Undo", &["u"]), noop).unwrap();

        let mode = MappingMode::Normal;
        assert!(registry.lookup(mode, &keys("g")).is_prefix());
        assert!(registry.lookup(mode, &keys("x")).is_no_match());
        assert!(registry.lookup(mode, &keys("gx")).is_no_match());
        assert!(registry.lookup(mode, &keys("ggg")).is_no_match());

        match registry.lookup(mode, &keys("gq")) {
            KeyLookup::Match {
                command,
                has_longer,
            } => {
                assert_eq!(command.descriptor().name(), "Reformat");
                assert!(!has_longer);
            }
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_match_that_is_also_prefix() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        registry.register(descriptor("Delete", &["d"]), noop).unwrap();
        registry.register(descriptor("DeleteLine", &["dd"]), noop).unwrap();

        match registry.lookup(MappingMode::Normal, &keys("d")) {
            KeyLookup::Match { has_longer, .. } => assert!(has_longer),
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_is_per_mode() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        registry.register(descriptor("Undo", &["u"]), noop).unwrap();

        assert!(registry.lookup(MappingMode::Normal, &keys("u")).is_match());
        assert!(registry.lookup(MappingMode::Insert, &keys("u")).is_no_match());
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        registry.register(descriptor("First", &["gq"]), noop).unwrap();

        let err = registry
            .register(descriptor("Second", &["zz", "gq"]), noop)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateBinding {
                keys: keys("gq"),
                mode: MappingMode::Normal,
                existing: "First".to_string(),
                name: "Second".to_string(),
            }
        );

        // Nothing from the failed registration was indexed.
        assert!(registry.lookup(MappingMode::Normal, &keys("zz")).is_no_match());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_identical_registration_is_a_no_op() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        let handler: Arc<dyn CommandHandler<Ctx>> = Arc::new(noop);
        let first = registry
            .register_shared(descriptor("Scroll", &["<C-e>"]), Arc::clone(&handler))
            .unwrap();
        let second = registry
            .register_shared(descriptor("Scroll", &["<C-e>"]), Arc::clone(&handler))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_shared_handler_on_new_keys() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        let handler: Arc<dyn CommandHandler<Ctx>> = Arc::new(noop);
        registry
            .register_shared(descriptor("ScrollDown", &["<C-e>"]), Arc::clone(&handler))
            .unwrap();
        registry
            .register_shared(descriptor("ScrollUp", &["<C-y>"]), Arc::clone(&handler))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup(MappingMode::Normal, &keys("<C-y>")).is_match());
    }

    #[test]
    fn test_same_handler_with_other_descriptor_rejected() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        let handler: Arc<dyn CommandHandler<Ctx>> = Arc::new(noop);
        registry
            .register_shared(descriptor("Scroll", &["<C-e>"]), Arc::clone(&handler))
            .unwrap();

        let err = registry
            .register_shared(descriptor("Scroll", &["<C-e>", "<C-y>"]), Arc::clone(&handler))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateBinding { .. }));

        let renamed = registry
            .register_shared(descriptor("Other", &["<C-e>"]), handler)
            .unwrap_err();
        assert!(matches!(renamed, RegistryError::DuplicateBinding { .. }));

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(MappingMode::Normal, &keys("<C-y>")).is_no_match());
        match registry.lookup(MappingMode::Normal, &keys("<C-e>")) {
            KeyLookup::Match { command, .. } => assert_eq!(command.descriptor().name(), "Scroll"),
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_disjoint_modes_do_not_conflict() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        registry.register(descriptor("Delete", &["d"]), noop).unwrap();
        registry
            .register(
                descriptor("VisualDelete", &["d"]).with_modes(MappingModes::VISUAL),
                noop,
            )
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_malformed_descriptors_rejected() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();

        let empty = CommandDescriptor::new("Empty", CommandType::OtherReadonly, Vec::new());
        assert_eq!(
            registry.register(empty, noop).unwrap_err(),
            RegistryError::EmptyKeySet {
                name: "Empty".to_string()
            }
        );

        let blank = CommandDescriptor::new(
            "Blank",
            CommandType::OtherReadonly,
            [KeySequence::new()],
        );
        assert!(matches!(
            registry.register(blank, noop),
            Err(RegistryError::EmptyKeySequence { .. })
        ));

        let modeless = descriptor("Modeless", &["q"]).with_modes(MappingModes::empty());
        assert!(matches!(
            registry.register(modeless, noop),
            Err(RegistryError::NoMappingModes { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_required_shortcut_keys() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        registry.register(descriptor("Window", &["<C-w>j"]), noop).unwrap();
        registry.register(descriptor("Undo", &["u"]), noop).unwrap();
        registry.register(descriptor("Cancel", &["<Esc>"]), noop).unwrap();

        let required: Vec<_> = registry.required_shortcut_keys().into_iter().collect();
        assert_eq!(required, vec![KeyStroke::ctrl('w'), KeyStroke::ESCAPE]);
    }

    #[test]
    fn test_get_by_name() {
        let mut registry: CommandRegistry<Ctx> = CommandRegistry::new();
        registry.register(descriptor("Undo", &["u"]), noop).unwrap();
        assert!(registry.get("Undo").is_some());
        assert!(registry.get("Redo").is_none());
    }
}
