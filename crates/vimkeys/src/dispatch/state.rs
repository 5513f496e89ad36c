//! Observable dispatcher state and the pending-command stack.

use std::fmt;
use std::sync::Arc;

use crate::command::{Argument, ArgumentType, CommandDescriptor, RegisteredCommand};
use crate::key::KeyStroke;

/// Where the dispatcher is in processing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchState {
    /// Nothing typed.
    Idle,
    /// A count or a partial key-sequence has been typed.
    Accumulating,
    /// A command was resolved and waits for its argument.
    AwaitingArgument {
        descriptor: Arc<CommandDescriptor>,
        argument_type: ArgumentType,
        /// Raw count typed before the command, 0 if none.
        count: usize,
    },
}

/// Outcome of feeding one key into the key-sequence matcher.
pub enum DispatchOutcome<C> {
    /// More keys are needed.
    Continue,
    /// The keys match nothing; all pending state was discarded.
    Unknown,
    /// A command was resolved. `unconsumed` holds keys typed after an
    /// ambiguous match that did not belong to it; they must be fed again.
    Ready {
        command: Arc<RegisteredCommand<C>>,
        raw_count: usize,
        unconsumed: Vec<KeyStroke>,
    },
}

impl<C> fmt::Debug for DispatchOutcome<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Continue => f.write_str("Continue"),
            DispatchOutcome::Unknown => f.write_str("Unknown"),
            DispatchOutcome::Ready {
                command,
                raw_count,
                unconsumed,
            } => f
                .debug_struct("Ready")
                .field("command", command)
                .field("raw_count", raw_count)
                .field("unconsumed", unconsumed)
                .finish(),
        }
    }
}

/// Outcome of handling one key end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was consumed; a command or argument is still in progress.
    Pending,
    /// A handler ran and returned this result.
    Executed(bool),
    /// The key completed no command; pending state was discarded.
    Unknown,
    /// The abort key dropped pending state without running anything.
    Cancelled,
}

/// The last command that ran, for a repeat collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastCommand {
    pub descriptor: Arc<CommandDescriptor>,
    pub count: usize,
    pub raw_count: usize,
    pub argument: Option<Argument>,
}

/// How far argument collection has got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArgumentProgress {
    Motion,
    Character,
    ExString(String),
    Digraph(DigraphProgress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DigraphProgress {
    Start,
    /// `<C-k>` typed.
    Introduced,
    /// `<C-k>` and the first character typed.
    First(char),
}

impl ArgumentProgress {
    pub(crate) fn for_type(argument_type: ArgumentType) -> Option<Self> {
        match argument_type {
            ArgumentType::None => None,
            ArgumentType::Motion => Some(ArgumentProgress::Motion),
            ArgumentType::Character => Some(ArgumentProgress::Character),
            ArgumentType::ExString => Some(ArgumentProgress::ExString(String::new())),
            ArgumentType::Digraph => Some(ArgumentProgress::Digraph(DigraphProgress::Start)),
        }
    }
}

/// A resolved command waiting for its argument.
pub(crate) struct PendingCommand<C> {
    pub command: Arc<RegisteredCommand<C>>,
    pub raw_count: usize,
    pub progress: ArgumentProgress,
}

impl<C> PendingCommand<C> {
    pub fn awaits_motion(&self) -> bool {
        self.progress == ArgumentProgress::Motion
    }
}
