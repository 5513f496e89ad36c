//! Test utilities for vimkeys integration tests.
//!
//! Provides a small in-memory `Editor` context and a handful of handlers that
//! act on it, so tests can drive the dispatcher with real key notation.

#![allow(dead_code)]

use std::sync::Arc;

use vimkeys::command::{
    Argument, ArgumentType, CommandDescriptor, CommandFlags, CommandHandler, CommandRegistry,
    CommandType, TextRange,
};
use vimkeys::dispatch::{DispatchConfig, Dispatcher, KeyOutcome};
use vimkeys::ex::{Echo, ExCommandName, ExOutput, ExRegistry};
use vimkeys::key::parse_keys;

/// One recorded handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: &'static str,
    pub count: usize,
    pub raw_count: usize,
    pub argument: Option<Argument>,
}

/// In-memory editor: a text buffer, a caret and an invocation log.
#[derive(Debug, Default)]
pub struct Editor {
    pub text: String,
    pub caret: usize,
    pub log: Vec<Invocation>,
    pub output: String,
}

impl Editor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    fn record(
        &mut self,
        name: &'static str,
        count: usize,
        raw_count: usize,
        argument: Option<&Argument>,
    ) {
        self.log.push(Invocation {
            name,
            count,
            raw_count,
            argument: argument.cloned(),
        });
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.log.iter().map(|invocation| invocation.name).collect()
    }
}

impl ExOutput for Editor {
    fn output(&mut self, text: &str) {
        self.output.push_str(text);
    }
}

/// Records every call and does nothing else.
pub struct Logged(pub &'static str);

impl CommandHandler<Editor> for Logged {
    fn execute(
        &self,
        ctx: &mut Editor,
        count: usize,
        raw_count: usize,
        argument: Option<&Argument>,
    ) -> bool {
        ctx.record(self.0, count, raw_count, argument);
        true
    }
}

/// `w`: moves to the start of the `count`th next word.
pub struct WordRight;

impl WordRight {
    fn target(text: &str, caret: usize, count: usize) -> usize {
        let bytes = text.as_bytes();
        let mut pos = caret.min(bytes.len());
        for _ in 0..count {
            while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
        }
        pos
    }
}

impl CommandHandler<Editor> for WordRight {
    fn execute(
        &self,
        ctx: &mut Editor,
        count: usize,
        raw_count: usize,
        argument: Option<&Argument>,
    ) -> bool {
        ctx.record("MotionWordRight", count, raw_count, argument);
        let target = Self::target(&ctx.text, ctx.caret, count);
        let moved = target != ctx.caret;
        ctx.caret = target;
        moved
    }

    fn motion_range(
        &self,
        ctx: &Editor,
        count: usize,
        _raw_count: usize,
        _argument: Option<&Argument>,
    ) -> Option<TextRange> {
        let target = Self::target(&ctx.text, ctx.caret, count);
        (target != ctx.caret).then(|| TextRange::new(ctx.caret, target))
    }
}

/// `gq{motion}`: squeezes runs of spaces in the motion's range.
pub struct Reformat;

impl CommandHandler<Editor> for Reformat {
    fn execute(
        &self,
        ctx: &mut Editor,
        count: usize,
        raw_count: usize,
        argument: Option<&Argument>,
    ) -> bool {
        ctx.record("ReformatCodeMotion", count, raw_count, argument);
        let Some(motion) = argument.and_then(Argument::as_motion) else {
            return false;
        };
        let TextRange { start, end } = motion.range;
        let mut squeezed = String::new();
        for c in ctx.text[start..end].chars() {
            if !(c == ' ' && squeezed.ends_with(' ')) {
                squeezed.push(c);
            }
        }
        ctx.text.replace_range(start..end, &squeezed);
        true
    }
}

/// `:`: collects a command line and runs it through an ex registry.
pub struct ExLine(pub ExRegistry<Editor>);

impl CommandHandler<Editor> for ExLine {
    fn execute(
        &self,
        ctx: &mut Editor,
        count: usize,
        raw_count: usize,
        argument: Option<&Argument>,
    ) -> bool {
        ctx.record("ExEntry", count, raw_count, argument);
        let Some(line) = argument.and_then(Argument::as_str) else {
            return false;
        };
        match self.0.execute(ctx, line, false) {
            Ok(result) => result,
            Err(err) => {
                ctx.output(&format!("E: {}\n", err));
                false
            }
        }
    }
}

fn descriptor(name: &str, command_type: CommandType, keys: &[&str]) -> CommandDescriptor {
    CommandDescriptor::parse(name, command_type, keys).unwrap()
}

/// A registry with a small realistic command set.
pub fn registry() -> CommandRegistry<Editor> {
    let mut registry = CommandRegistry::new();
    registry
        .register(
            descriptor("ReformatCodeMotion", CommandType::Change, &["gq"])
                .with_argument(ArgumentType::Motion)
                .with_flags(CommandFlags::DUPLICABLE_OPERATOR),
            Reformat,
        )
        .unwrap();
    registry
        .register(
            descriptor("MotionWordRight", CommandType::Motion, &["w", "<S-Right>"])
                .with_flags(CommandFlags::MOT_EXCLUSIVE),
            WordRight,
        )
        .unwrap();
    registry
        .register(
            descriptor("MotionGotoTop", CommandType::Motion, &["gg"]),
            Logged("MotionGotoTop"),
        )
        .unwrap();
    registry
        .register(
            descriptor("FindChar", CommandType::Motion, &["f"])
                .with_argument(ArgumentType::Character),
            Logged("FindChar"),
        )
        .unwrap();
    registry
        .register(
            descriptor("WindowDown", CommandType::OtherReadonly, &["<C-w>j", "<C-w><C-j>"]),
            Logged("WindowDown"),
        )
        .unwrap();
    registry
        .register(descriptor("Redo", CommandType::OtherWritable, &["<C-r>"]), Logged("Redo"))
        .unwrap();
    registry
        .register(descriptor("Undo", CommandType::OtherWritable, &["u"]), Logged("Undo"))
        .unwrap();

    let mut ex: ExRegistry<Editor> = ExRegistry::new();
    ex.register(ExCommandName::new("ec", "ho"), Echo::FLAGS, Echo).unwrap();
    registry
        .register(
            descriptor("ExEntry", CommandType::OtherReadWrite, &[":"])
                .with_argument(ArgumentType::ExString),
            ExLine(ex),
        )
        .unwrap();
    registry
}

pub fn dispatcher() -> Dispatcher<Editor> {
    Dispatcher::new(Arc::new(registry()), DispatchConfig::default())
}

/// Feeds every key of `notation` to the dispatcher.
pub fn type_keys(
    dispatcher: &mut Dispatcher<Editor>,
    editor: &mut Editor,
    notation: &str,
) -> Vec<KeyOutcome> {
    parse_keys(notation)
        .unwrap()
        .iter()
        .map(|key| dispatcher.handle_key(editor, *key))
        .collect()
}
