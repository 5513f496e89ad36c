//! Declarative command descriptions and the registry that indexes them.
//!
//! # Architecture
//!
//! - `CommandDescriptor`: trigger key-sequences, command type, required
//!   argument kind, behavioural flags and mapping modes
//! - `CommandHandler`: the single capability a command implementation provides
//! - `CommandRegistry`: per-mode key trie supporting longest-match lookup with
//!   prefix (ambiguity) detection
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = CommandRegistry::new();
//! registry.register(
//!     CommandDescriptor::parse("ReformatCodeMotion", CommandType::Change, &["gq"])?
//!         .with_argument(ArgumentType::Motion)
//!         .with_flags(CommandFlags::DUPLICABLE_OPERATOR),
//!     ReformatHandler,
//! )?;
//! ```

mod argument;
mod descriptor;
mod handler;
mod registry;

pub use argument::{Argument, MotionArgument, TextRange};
pub use descriptor::{
    ArgumentType, CommandDescriptor, CommandFlags, CommandType, MappingMode, MappingModes,
};
pub use handler::{CommandHandler, RegisteredCommand};
pub use registry::{CommandRegistry, KeyLookup, RegistryError};
