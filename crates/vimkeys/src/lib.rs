//! # vimkeys
//!
//! Vim command dispatch and shortcut conflict resolution for editors that
//! host a modal editing layer.
//!
//! ## Features
//!
//! - Declarative commands: trigger key-sequences, command type, argument kind
//!   and flags, bound to a single handler
//! - Operator-pending composition (`3gq2w`) with Vim's multiplicative counts
//! - Character, digraph and ex-string arguments
//! - Conflict table between emulation keys and host shortcuts, with a
//!   lock-free owner map read on every keystroke
//! - Ex command lines with range/argument/access checks
//! - TOML configuration
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vimkeys::command::{Argument, CommandDescriptor, CommandRegistry, CommandType};
//! use vimkeys::dispatch::{DispatchConfig, Dispatcher, KeyOutcome};
//! use vimkeys::key::KeyStroke;
//!
//! let mut registry: CommandRegistry<Vec<usize>> = CommandRegistry::new();
//! let undo = CommandDescriptor::parse("Undo", CommandType::OtherWritable, &["u"]).unwrap();
//! registry
//!     .register(undo, |log: &mut Vec<usize>, count: usize, _: usize, _: Option<&Argument>| {
//!         log.push(count);
//!         true
//!     })
//!     .unwrap();
//!
//! let mut dispatcher = Dispatcher::new(Arc::new(registry), DispatchConfig::default());
//! let mut log = Vec::new();
//! dispatcher.handle_key(&mut log, KeyStroke::char('3'));
//! let outcome = dispatcher.handle_key(&mut log, KeyStroke::char('u'));
//!
//! assert_eq!(outcome, KeyOutcome::Executed(true));
//! assert_eq!(log, vec![3]);
//! ```

pub mod command;
pub mod config;
pub mod conflict;
pub mod dispatch;
pub mod ex;
pub mod key;

pub use command::{CommandDescriptor, CommandHandler, CommandRegistry, RegistryError};
pub use config::{load_config, load_config_from, Config};
pub use conflict::{ConflictResolver, ConflictRow, HostAction, HostKeymap, Owner, ShortcutOwners};
pub use dispatch::{DispatchConfig, Dispatcher, KeyOutcome};
pub use key::{parse_keys, KeySequence, KeyStroke};
