//! The handler capability bound to each command.

use std::fmt;
use std::sync::Arc;

use super::{Argument, CommandDescriptor, TextRange};

/// Implementation of a command.
///
/// `C` is the host's editor context: editable surface, active caret and any
/// ambient data. The dispatcher never looks inside it.
pub trait CommandHandler<C> {
    /// Runs the command. Returning `false` is a silent no-op outcome, not an
    /// error.
    fn execute(
        &self,
        ctx: &mut C,
        count: usize,
        raw_count: usize,
        argument: Option<&Argument>,
    ) -> bool;

    /// Computes the range a motion covers without moving the caret. Only
    /// motions used as operator arguments are asked for this.
    fn motion_range(
        &self,
        _ctx: &C,
        _count: usize,
        _raw_count: usize,
        _argument: Option<&Argument>,
    ) -> Option<TextRange> {
        None
    }
}

impl<C, F> CommandHandler<C> for F
where
    F: Fn(&mut C, usize, usize, Option<&Argument>) -> bool,
{
    fn execute(
        &self,
        ctx: &mut C,
        count: usize,
        raw_count: usize,
        argument: Option<&Argument>,
    ) -> bool {
        self(ctx, count, raw_count, argument)
    }
}

/// A descriptor bound to its handler.
pub struct RegisteredCommand<C> {
    descriptor: Arc<CommandDescriptor>,
    handler: Arc<dyn CommandHandler<C>>,
}

impl<C> RegisteredCommand<C> {
    pub(crate) fn new(descriptor: CommandDescriptor, handler: Arc<dyn CommandHandler<C>>) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            handler,
        }
    }

    pub fn descriptor(&self) -> &Arc<CommandDescriptor> {
        &self.descriptor
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler<C>> {
        &self.handler
    }

    /// Returns true if both registrations share the same handler object.
    pub fn same_handler(&self, handler: &Arc<dyn CommandHandler<C>>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.handler), Arc::as_ptr(handler))
    }
}

impl<C> fmt::Debug for RegisteredCommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
