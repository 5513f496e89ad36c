//! Command descriptors.

use std::collections::BTreeSet;

use bitflags::bitflags;

use crate::key::{parse_keys_set, KeySequence, NotationError};

/// What a command does to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandType {
    #[default]
    Undefined,
    /// Moves the caret; usable as an operator argument.
    Motion,
    Insert,
    Delete,
    Change,
    Copy,
    Paste,
    Reset,
    SelectRegister,
    OtherReadonly,
    OtherWritable,
    OtherReadWrite,
}

impl CommandType {
    /// Returns true if the command only reads the buffer.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            CommandType::Motion
                | CommandType::Copy
                | CommandType::SelectRegister
                | CommandType::OtherReadonly
                | CommandType::OtherReadWrite
        )
    }

    /// Returns true if the command may modify the buffer.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            CommandType::Insert
                | CommandType::Delete
                | CommandType::Change
                | CommandType::Paste
                | CommandType::Reset
                | CommandType::OtherWritable
                | CommandType::OtherReadWrite
        )
    }
}

/// Kind of argument a command needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArgumentType {
    #[default]
    None,
    /// A motion command typed after the operator (`gq` + `ap`).
    Motion,
    /// A single typed character (`f` + `x`).
    Character,
    /// A line of text terminated by Enter (`:` + `echo "hi"`).
    ExString,
    /// A character, or `<C-k>` followed by a two-character digraph.
    Digraph,
}

bitflags! {
    /// Behavioural flags. The dispatcher stores these; collaborators such as
    /// repeat and jump-list handling act on them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u32 {
        const MOT_LINEWISE = 1 << 0;
        const MOT_CHARACTERWISE = 1 << 1;
        const MOT_BLOCKWISE = 1 << 2;
        const MOT_INCLUSIVE = 1 << 3;
        const MOT_EXCLUSIVE = 1 << 4;
        /// Record the caret position in the jump list before moving.
        const SAVE_JUMP = 1 << 5;
        const KEEP_VISUAL = 1 << 6;
        const EXIT_VISUAL = 1 << 7;
        /// Typing the operator again (`gqgq`, `gqq`) means "current line".
        const DUPLICABLE_OPERATOR = 1 << 8;
        const SAVE_STROKE = 1 << 9;
        const NO_REPEAT = 1 << 10;
        const CLEAR_STROKES = 1 << 11;
        /// Leaves insert mode when run.
        const END_INSERT = 1 << 12;
    }
}

bitflags! {
    /// Set of mapping modes a command is bound in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MappingModes: u8 {
        const NORMAL = 1 << 0;
        const VISUAL = 1 << 1;
        const SELECT = 1 << 2;
        const OP_PENDING = 1 << 3;
        const INSERT = 1 << 4;
        const CMD_LINE = 1 << 5;
        /// Normal, visual and operator-pending: where motions live.
        const NVO = Self::NORMAL.bits() | Self::VISUAL.bits() | Self::OP_PENDING.bits();
    }
}

/// A single mapping mode, used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum MappingMode {
    #[default]
    Normal,
    Visual,
    Select,
    OperatorPending,
    Insert,
    CommandLine,
}

impl MappingMode {
    pub const ALL: [MappingMode; 6] = [
        MappingMode::Normal,
        MappingMode::Visual,
        MappingMode::Select,
        MappingMode::OperatorPending,
        MappingMode::Insert,
        MappingMode::CommandLine,
    ];

    /// The bit for this mode.
    pub fn flag(self) -> MappingModes {
        match self {
            MappingMode::Normal => MappingModes::NORMAL,
            MappingMode::Visual => MappingModes::VISUAL,
            MappingMode::Select => MappingModes::SELECT,
            MappingMode::OperatorPending => MappingModes::OP_PENDING,
            MappingMode::Insert => MappingModes::INSERT,
            MappingMode::CommandLine => MappingModes::CMD_LINE,
        }
    }
}

impl MappingModes {
    /// Iterates the single modes contained in this set.
    pub fn modes(self) -> impl Iterator<Item = MappingMode> {
        MappingMode::ALL
            .into_iter()
            .filter(move |mode| self.contains(mode.flag()))
    }
}

/// Immutable description of a command: how it is triggered and what it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    name: String,
    keys: BTreeSet<KeySequence>,
    modes: MappingModes,
    command_type: CommandType,
    argument_type: ArgumentType,
    flags: CommandFlags,
}

impl CommandDescriptor {
    /// Creates a descriptor with no argument and no flags.
    ///
    /// Motions default to normal, visual and operator-pending modes; every
    /// other command type defaults to normal mode only.
    pub fn new(
        name: impl Into<String>,
        command_type: CommandType,
        keys: impl IntoIterator<Item = KeySequence>,
    ) -> Self {
        let modes = match command_type {
            CommandType::Motion => MappingModes::NVO,
            _ => MappingModes::NORMAL,
        };
        Self {
            name: name.into(),
            keys: keys.into_iter().collect(),
            modes,
            command_type,
            argument_type: ArgumentType::None,
            flags: CommandFlags::empty(),
        }
    }

    /// Creates a descriptor from key notation strings.
    pub fn parse(
        name: impl Into<String>,
        command_type: CommandType,
        keys: &[&str],
    ) -> Result<Self, NotationError> {
        Ok(Self::new(name, command_type, parse_keys_set(keys)?))
    }

    pub fn with_argument(mut self, argument_type: ArgumentType) -> Self {
        self.argument_type = argument_type;
        self
    }

    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_modes(mut self, modes: MappingModes) -> Self {
        self.modes = modes;
        self
    }

    /// Action identifier, unique by convention.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every equally valid key-sequence that triggers this command.
    pub fn keys(&self) -> &BTreeSet<KeySequence> {
        &self.keys
    }

    pub fn modes(&self) -> MappingModes {
        self.modes
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn argument_type(&self) -> ArgumentType {
        self.argument_type
    }

    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    pub fn has_flag(&self, flag: CommandFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_motion(&self) -> bool {
        self.command_type == CommandType::Motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_type_read_write() {
        assert!(CommandType::Motion.is_read());
        assert!(!CommandType::Motion.is_write());
        assert!(CommandType::Change.is_write());
        assert!(CommandType::OtherReadWrite.is_read());
        assert!(CommandType::OtherReadWrite.is_write());
        assert!(!CommandType::Undefined.is_read());
        assert!(!CommandType::Undefined.is_write());
    }

    #[test]
    fn test_default_modes_follow_type() {
        let motion =
            CommandDescriptor::parse("MotionWordRight", CommandType::Motion, &["w"]).unwrap();
        assert_eq!(motion.modes(), MappingModes::NVO);

        let change =
            CommandDescriptor::parse("ReformatCodeMotion", CommandType::Change, &["gq"]).unwrap();
        assert_eq!(change.modes(), MappingModes::NORMAL);
    }

    #[test]
    fn test_builder() {
        let descriptor =
            CommandDescriptor::parse("ReformatCodeMotion", CommandType::Change, &["gq"])
                .unwrap()
                .with_argument(ArgumentType::Motion)
                .with_flags(CommandFlags::DUPLICABLE_OPERATOR);

        assert_eq!(descriptor.name(), "ReformatCodeMotion");
        assert_eq!(descriptor.argument_type(), ArgumentType::Motion);
        assert!(descriptor.has_flag(CommandFlags::DUPLICABLE_OPERATOR));
        assert!(!descriptor.has_flag(CommandFlags::SAVE_JUMP));
        assert_eq!(descriptor.keys().len(), 1);
    }

    #[test]
    fn test_multiple_key_sequences() {
        let descriptor =
            CommandDescriptor::parse("MotionLeft", CommandType::Motion, &["h", "<Left>", "<BS>"])
                .unwrap();
        assert_eq!(descriptor.keys().len(), 3);
    }

    #[test]
    fn test_mapping_modes_iteration() {
        let modes: Vec<_> = MappingModes::NVO.modes().collect();
        assert_eq!(
            modes,
            vec![
                MappingMode::Normal,
                MappingMode::Visual,
                MappingMode::OperatorPending
            ]
        );
    }
}
