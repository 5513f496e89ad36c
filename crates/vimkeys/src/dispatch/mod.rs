//! Key-sequence dispatch with operator-pending composition.
//!
//! The dispatcher turns keystrokes into command invocations. It is an explicit
//! state machine: typed keys accumulate until the registry reports a match,
//! commands that need an argument are pushed on a stack of pending frames, and
//! the frames are completed by later keys (a motion, a character, a digraph or
//! an ex string).
//!
//! Timing is owned by the caller. When a sequence is ambiguous (`d` vs `dd`)
//! the dispatcher waits; the caller polls [`Dispatcher::timeout_elapsed`] and
//! calls [`Dispatcher::flush`] to commit whatever was typed.

mod config;
mod digraph;
mod state;

use std::sync::Arc;
use std::time::Instant;

use crate::command::{
    Argument, CommandRegistry, KeyLookup, MappingMode, MotionArgument, RegisteredCommand,
};
use crate::key::{KeySequence, KeyStroke};

pub use config::{AmbiguityPolicy, DispatchConfig};
pub use digraph::digraph;
pub use state::{DispatchOutcome, DispatchState, KeyOutcome, LastCommand};

use state::{ArgumentProgress, DigraphProgress, PendingCommand};

/// Largest repeat count accepted; further digits are ignored.
pub const MAX_COUNT: usize = 999_999;

/// An exact match remembered while longer candidates are still possible.
struct AmbiguousMatch<C> {
    command: Arc<RegisteredCommand<C>>,
    /// Number of accumulated keys that belong to the match.
    len: usize,
}

/// What a key did to the argument being collected.
enum ArgumentStep {
    Pending,
    Cancel,
    Complete(Argument),
}

/// Routes keystrokes to registered commands.
pub struct Dispatcher<C> {
    registry: Arc<CommandRegistry<C>>,
    config: DispatchConfig,
    mode: MappingMode,
    keys: KeySequence,
    count: usize,
    ambiguous: Option<AmbiguousMatch<C>>,
    frames: Vec<PendingCommand<C>>,
    last_key_at: Option<Instant>,
    last: Option<LastCommand>,
}

impl<C> Dispatcher<C> {
    pub fn new(registry: Arc<CommandRegistry<C>>, config: DispatchConfig) -> Self {
        Self {
            registry,
            config,
            mode: MappingMode::Normal,
            keys: KeySequence::new(),
            count: 0,
            ambiguous: None,
            frames: Vec::new(),
            last_key_at: None,
            last: None,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry<C>> {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// The host-selected mapping mode.
    pub fn mode(&self) -> MappingMode {
        self.mode
    }

    /// Switches the base mapping mode, dropping anything pending.
    pub fn set_mode(&mut self, mode: MappingMode) {
        if self.mode != mode {
            tracing::trace!(from = ?self.mode, to = ?mode, "mapping mode changed");
            self.reset();
            self.mode = mode;
        }
    }

    /// Keys typed towards the next command, excluding the count.
    pub fn pending_keys(&self) -> &[KeyStroke] {
        &self.keys
    }

    /// Count typed towards the next command, 0 if none.
    pub fn pending_count(&self) -> usize {
        self.count
    }

    pub fn is_idle(&self) -> bool {
        self.keys.is_empty() && self.count == 0 && self.frames.is_empty()
    }

    pub fn state(&self) -> DispatchState {
        if !self.keys.is_empty() || self.count > 0 {
            return DispatchState::Accumulating;
        }
        match self.frames.last() {
            Some(frame) => DispatchState::AwaitingArgument {
                descriptor: Arc::clone(frame.command.descriptor()),
                argument_type: frame.command.descriptor().argument_type(),
                count: frame.raw_count,
            },
            None => DispatchState::Idle,
        }
    }

    /// The last command that ran.
    pub fn last_command(&self) -> Option<&LastCommand> {
        self.last.as_ref()
    }

    /// Drops the typed keys, the count and every pending command.
    pub fn reset(&mut self) {
        self.keys.clear();
        self.count = 0;
        self.ambiguous = None;
        self.frames.clear();
        self.last_key_at = None;
    }

    /// Handles one keystroke end to end: sequence matching, argument
    /// collection and execution.
    pub fn handle_key(&mut self, ctx: &mut C, key: KeyStroke) -> KeyOutcome {
        if key == self.config.abort_key && !self.is_idle() {
            tracing::debug!(key = %key, "pending command cancelled");
            self.reset();
            return KeyOutcome::Cancelled;
        }

        if self.collecting_argument() {
            return self.collect_argument(ctx, key);
        }

        match self.feed_key(key) {
            DispatchOutcome::Continue => KeyOutcome::Pending,
            DispatchOutcome::Unknown => KeyOutcome::Unknown,
            DispatchOutcome::Ready {
                command,
                raw_count,
                unconsumed,
            } => {
                let outcome = self.execute(ctx, command, raw_count);
                self.replay(ctx, outcome, unconsumed)
            }
        }
    }

    /// Advances the key-sequence matcher by one key without running anything.
    pub fn feed_key(&mut self, key: KeyStroke) -> DispatchOutcome<C> {
        self.last_key_at = Some(Instant::now());

        if self.keys.is_empty() && self.ambiguous.is_none() {
            if let Some(digit) = count_digit(key, self.count) {
                self.count = self.count.saturating_mul(10).saturating_add(digit).min(MAX_COUNT);
                tracing::trace!(count = self.count, "count");
                return DispatchOutcome::Continue;
            }
        }

        let mode = self.lookup_mode();
        self.keys.push(key);
        let lookup = self.registry.lookup(mode, &self.keys);
        tracing::trace!(keys = %self.keys, ?mode, "key sequence");

        match lookup {
            KeyLookup::Match {
                command,
                has_longer: true,
            } if self.config.ambiguity == AmbiguityPolicy::WaitForTimeout => {
                self.ambiguous = Some(AmbiguousMatch {
                    command,
                    len: self.keys.len(),
                });
                DispatchOutcome::Continue
            }
            KeyLookup::Match { command, .. } => {
                self.keys.clear();
                self.ambiguous = None;
                DispatchOutcome::Ready {
                    command,
                    raw_count: std::mem::take(&mut self.count),
                    unconsumed: Vec::new(),
                }
            }
            KeyLookup::Prefix => DispatchOutcome::Continue,
            KeyLookup::NoMatch => match self.ambiguous.take() {
                Some(ambiguous) => {
                    let (command, raw_count, unconsumed) = self.commit(ambiguous);
                    DispatchOutcome::Ready {
                        command,
                        raw_count,
                        unconsumed,
                    }
                }
                None => {
                    tracing::trace!(keys = %self.keys, "unknown key sequence");
                    self.reset();
                    DispatchOutcome::Unknown
                }
            },
        }
    }

    /// Runs a resolved command, or pushes it as pending if it needs an
    /// argument.
    pub fn execute(
        &mut self,
        ctx: &mut C,
        command: Arc<RegisteredCommand<C>>,
        raw_count: usize,
    ) -> KeyOutcome {
        let descriptor = command.descriptor();
        if self.operator_pending() && !descriptor.is_motion() {
            tracing::trace!(command = descriptor.name(), "not a motion, operator dropped");
            self.reset();
            return KeyOutcome::Unknown;
        }

        match ArgumentProgress::for_type(descriptor.argument_type()) {
            Some(progress) => {
                tracing::trace!(
                    command = descriptor.name(),
                    argument = ?descriptor.argument_type(),
                    raw_count,
                    "awaiting argument"
                );
                self.frames.push(PendingCommand {
                    command,
                    raw_count,
                    progress,
                });
                KeyOutcome::Pending
            }
            None => self.run(ctx, command, raw_count, None),
        }
    }

    /// Returns true if the last key was typed at least the configured timeout
    /// before `now` and typed keys are still waiting to be resolved.
    pub fn timeout_elapsed(&self, now: Instant) -> bool {
        if self.keys.is_empty() {
            return false;
        }
        self.last_key_at
            .is_some_and(|at| now.saturating_duration_since(at) >= self.config.timeout())
    }

    /// Resolves the typed keys as if no more keys will come: an ambiguous
    /// match runs, an incomplete sequence is dropped. Returns `None` if no keys
    /// were waiting.
    pub fn flush(&mut self, ctx: &mut C) -> Option<KeyOutcome> {
        if self.keys.is_empty() {
            return None;
        }
        match self.ambiguous.take() {
            Some(ambiguous) => {
                let (command, raw_count, unconsumed) = self.commit(ambiguous);
                let outcome = self.execute(ctx, command, raw_count);
                Some(self.replay(ctx, outcome, unconsumed))
            }
            None => {
                tracing::debug!(keys = %self.keys, "incomplete key sequence timed out");
                self.reset();
                Some(KeyOutcome::Cancelled)
            }
        }
    }

    /// Resolves a remembered match. Returns the command, its raw count and the
    /// keys typed after it.
    fn commit(
        &mut self,
        ambiguous: AmbiguousMatch<C>,
    ) -> (Arc<RegisteredCommand<C>>, usize, Vec<KeyStroke>) {
        let unconsumed = self.keys.get(ambiguous.len..).unwrap_or_default().to_vec();
        self.keys.clear();
        tracing::trace!(
            command = ambiguous.command.descriptor().name(),
            unconsumed = unconsumed.len(),
            "ambiguous match committed"
        );
        (ambiguous.command, std::mem::take(&mut self.count), unconsumed)
    }

    fn replay(&mut self, ctx: &mut C, outcome: KeyOutcome, keys: Vec<KeyStroke>) -> KeyOutcome {
        keys.into_iter().fold(outcome, |_, key| self.handle_key(ctx, key))
    }

    fn operator_pending(&self) -> bool {
        self.frames.last().is_some_and(PendingCommand::awaits_motion)
    }

    fn collecting_argument(&self) -> bool {
        self.frames.last().is_some_and(|frame| !frame.awaits_motion())
    }

    fn lookup_mode(&self) -> MappingMode {
        if self.operator_pending() {
            MappingMode::OperatorPending
        } else {
            self.mode
        }
    }

    fn collect_argument(&mut self, ctx: &mut C, key: KeyStroke) -> KeyOutcome {
        let step = match self.frames.last_mut() {
            Some(frame) => argument_step(&mut frame.progress, key),
            None => ArgumentStep::Cancel,
        };

        match step {
            ArgumentStep::Pending => KeyOutcome::Pending,
            ArgumentStep::Cancel => {
                tracing::debug!(key = %key, "argument cancelled");
                self.reset();
                KeyOutcome::Cancelled
            }
            ArgumentStep::Complete(argument) => match self.frames.pop() {
                Some(frame) => self.run(ctx, frame.command, frame.raw_count, Some(argument)),
                None => KeyOutcome::Unknown,
            },
        }
    }

    /// Runs a command whose argument is resolved. A motion completing while an
    /// operator waits becomes the operator's argument.
    fn run(
        &mut self,
        ctx: &mut C,
        command: Arc<RegisteredCommand<C>>,
        raw_count: usize,
        argument: Option<Argument>,
    ) -> KeyOutcome {
        let Some(operator) = self.frames.pop_if(|frame| frame.awaits_motion()) else {
            return self.invoke(ctx, &command, raw_count, argument);
        };

        let composed = compose_counts(operator.raw_count, raw_count);
        let count = composed.max(1);
        let range = command
            .handler()
            .motion_range(ctx, count, composed, argument.as_ref());
        let Some(range) = range else {
            tracing::debug!(
                operator = operator.command.descriptor().name(),
                motion = command.descriptor().name(),
                "motion produced no range"
            );
            self.reset();
            return KeyOutcome::Executed(false);
        };

        let motion = MotionArgument {
            descriptor: Arc::clone(command.descriptor()),
            range,
            count: raw_count.max(1),
        };
        self.invoke(
            ctx,
            &operator.command,
            composed,
            Some(Argument::Motion(motion)),
        )
    }

    fn invoke(
        &mut self,
        ctx: &mut C,
        command: &Arc<RegisteredCommand<C>>,
        raw_count: usize,
        argument: Option<Argument>,
    ) -> KeyOutcome {
        let descriptor = command.descriptor();
        let count = raw_count.max(1);
        let result = command
            .handler()
            .execute(ctx, count, raw_count, argument.as_ref());
        tracing::trace!(command = descriptor.name(), count, raw_count, result, "executed");

        self.reset();
        self.last = Some(LastCommand {
            descriptor: Arc::clone(descriptor),
            count,
            raw_count,
            argument,
        });
        KeyOutcome::Executed(result)
    }
}

fn argument_step(progress: &mut ArgumentProgress, key: KeyStroke) -> ArgumentStep {
    match progress {
        ArgumentProgress::Motion => ArgumentStep::Cancel,
        ArgumentProgress::Character => match key.typed_char() {
            Some(c) => ArgumentStep::Complete(Argument::Character(c)),
            None => ArgumentStep::Cancel,
        },
        ArgumentProgress::ExString(text) => {
            if key == KeyStroke::ENTER {
                ArgumentStep::Complete(Argument::ExString(std::mem::take(text)))
            } else if key == KeyStroke::BACKSPACE {
                match text.pop() {
                    Some(_) => ArgumentStep::Pending,
                    None => ArgumentStep::Cancel,
                }
            } else {
                if let Some(c) = key.typed_char() {
                    text.push(c);
                }
                ArgumentStep::Pending
            }
        }
        ArgumentProgress::Digraph(digraph_progress) => {
            if *digraph_progress == DigraphProgress::Start && key == KeyStroke::ctrl('k') {
                *digraph_progress = DigraphProgress::Introduced;
                return ArgumentStep::Pending;
            }
            let Some(c) = key.typed_char() else {
                return ArgumentStep::Cancel;
            };
            match *digraph_progress {
                DigraphProgress::Start => ArgumentStep::Complete(Argument::Character(c)),
                DigraphProgress::Introduced => {
                    *digraph_progress = DigraphProgress::First(c);
                    ArgumentStep::Pending
                }
                DigraphProgress::First(first) => {
                    ArgumentStep::Complete(Argument::Character(digraph(first, c)))
                }
            }
        }
    }
}

/// Returns the digit a key adds to a count: `1-9` start one, `0` only
/// continues it.
fn count_digit(key: KeyStroke, count: usize) -> Option<usize> {
    if !key.modifiers().is_empty() {
        return None;
    }
    let digit = key.code().as_char()?.to_digit(10)? as usize;
    (digit != 0 || count > 0).then_some(digit)
}

/// `max(1, a) * max(1, b)`, or 0 when neither count was typed.
fn compose_counts(operator: usize, motion: usize) -> usize {
    if operator == 0 && motion == 0 {
        return 0;
    }
    operator
        .max(1)
        .saturating_mul(motion.max(1))
        .min(MAX_COUNT)
}
