//! Instruction encoding: the 4-byte record and its field-level codec.
//!
//! An instruction occupies 4 contiguous bytes at `PRG + index * 4`:
//! `{opcode, operand, mode, directions}`. The codec here is the only
//! sanctioned way for collaborators (renderer, editor, execution) to
//! inspect or mutate instruction fields.

use crate::memory::{Memory, CYC, DAT, INSTRUCTION_BYTES, IP, PRG, SP, STK};

/// Stepping direction through an ordered table (editor cycling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Step {
    /// Next entry, wrapping at the end.
    Forward,
    /// Previous entry, wrapping at the start.
    Back,
}

/// Opcode values, stored densely in the instruction's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Opcode {
    /// Empty cell. Never enterable; executing it always fails.
    Nil = 0,
    /// No effect; always enterable.
    Nop = 1,
    /// `DBG <- v`.
    Get = 2,
    /// Push `DBG` (stack target) or write `v` through the operand address.
    Set = 3,
    /// Swap `DBG` with the stack top or with the addressed register.
    Swp = 4,
    /// `DBG <- DBG + v`, saturating at 255.
    Add = 5,
    /// `DBG <- DBG - v`, saturating at 0.
    Sub = 6,
    /// Enterable only when `DBG == v`.
    Teq = 7,
    /// Enterable only when `DBG < v`.
    Tlt = 8,
    /// Enterable only when `DBG > v`.
    Tgt = 9,
    /// Emits `DBG` to the session's output sink.
    Snd = 10,
    /// Halts the machine (`STA <- HALTED`).
    End = 11,
    /// Label marker; the operand indexes the level's label list.
    Txt = 12,
}

impl Opcode {
    /// Every opcode in editor cycling order.
    pub const ALL: [Self; 13] = [
        Self::Nil,
        Self::Nop,
        Self::Get,
        Self::Set,
        Self::Swp,
        Self::Add,
        Self::Sub,
        Self::Teq,
        Self::Tlt,
        Self::Tgt,
        Self::Snd,
        Self::End,
        Self::Txt,
    ];

    /// Decodes an opcode byte. Unassigned values are not opcodes.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Nil),
            1 => Some(Self::Nop),
            2 => Some(Self::Get),
            3 => Some(Self::Set),
            4 => Some(Self::Swp),
            5 => Some(Self::Add),
            6 => Some(Self::Sub),
            7 => Some(Self::Teq),
            8 => Some(Self::Tlt),
            9 => Some(Self::Tgt),
            10 => Some(Self::Snd),
            11 => Some(Self::End),
            12 => Some(Self::Txt),
            _ => None,
        }
    }

    /// Decodes an opcode byte, degrading unassigned values to [`Self::Nil`].
    ///
    /// Corrupted programs stay runnable: an unrecognized opcode byte behaves
    /// like an empty cell rather than failing the whole machine.
    #[must_use]
    pub const fn from_u8_lossy(value: u8) -> Self {
        match Self::from_u8(value) {
            Some(opcode) => opcode,
            None => Self::Nil,
        }
    }

    /// Stored byte value of this opcode.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Neighbouring opcode in [`Self::ALL`] order, wrapping at either end.
    #[must_use]
    pub const fn cycled(self, step: Step) -> Self {
        let len = Self::ALL.len();
        let index = self.as_u8() as usize;
        let next = match step {
            Step::Forward => (index + 1) % len,
            Step::Back => (index + len - 1) % len,
        };
        Self::ALL[next]
    }

    /// Whether the debugger can ever occupy a cell holding this opcode.
    ///
    /// The single opcode-classification predicate; collaborators must not
    /// re-derive this from raw bytes.
    #[must_use]
    pub const fn is_enterable(self) -> bool {
        !matches!(self, Self::Nil)
    }

    /// Whether the operand and mode fields are meaningful for this opcode.
    ///
    /// NIL and NOP carry no operand; SWP and SND have a fixed implicit one.
    /// The editor refuses operand/mode edits on these.
    #[must_use]
    pub const fn takes_operand(self) -> bool {
        !matches!(self, Self::Nil | Self::Nop | Self::Swp | Self::Snd)
    }

    /// Whether the editor may toggle approach directions on this opcode.
    ///
    /// Un-enterable (NIL) and halting (END) cells never get approach
    /// directions.
    #[must_use]
    pub const fn allows_direction_edit(self) -> bool {
        !matches!(self, Self::Nil | Self::End)
    }
}

/// Operand interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Mode {
    /// Operand is a literal value.
    Immediate = 0,
    /// Operand is a register/stack selector to dereference.
    Address = 1,
}

impl Mode {
    /// Decodes a mode byte. Corrupted mode bytes read as immediate.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Address,
            _ => Self::Immediate,
        }
    }

    /// Stored byte value of this mode.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Immediate => Self::Address,
            Self::Address => Self::Immediate,
        }
    }
}

/// Valid address-mode operand selectors, in editor cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddressTarget {
    /// The general-purpose data register.
    Dat,
    /// The stack, resolved through push/pop/peek rather than a flat read.
    Stk,
    /// The cycle counter.
    Cyc,
    /// The instruction pointer.
    Ip,
    /// The stack pointer.
    Sp,
}

impl AddressTarget {
    /// Every selector in editor cycling order.
    pub const ALL: [Self; 5] = [Self::Dat, Self::Stk, Self::Cyc, Self::Ip, Self::Sp];

    /// Memory offset stored in the operand byte for this selector.
    #[must_use]
    pub const fn offset(self) -> u8 {
        match self {
            Self::Dat => DAT as u8,
            Self::Stk => STK as u8,
            Self::Cyc => CYC as u8,
            Self::Ip => IP as u8,
            Self::Sp => SP as u8,
        }
    }

    /// Maps an operand byte back to a selector, if it names one.
    #[must_use]
    pub const fn from_offset(offset: u8) -> Option<Self> {
        match offset as usize {
            DAT => Some(Self::Dat),
            STK => Some(Self::Stk),
            CYC => Some(Self::Cyc),
            IP => Some(Self::Ip),
            SP => Some(Self::Sp),
            _ => None,
        }
    }

    /// Neighbouring selector in [`Self::ALL`] order, wrapping.
    #[must_use]
    pub const fn cycled(self, step: Step) -> Self {
        let len = Self::ALL.len();
        let index = match self {
            Self::Dat => 0,
            Self::Stk => 1,
            Self::Cyc => 2,
            Self::Ip => 3,
            Self::Sp => 4,
        };
        let next = match step {
            Step::Forward => (index + 1) % len,
            Step::Back => (index + len - 1) % len,
        };
        Self::ALL[next]
    }
}

/// Compass directions the debugger moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// One column left.
    Left,
    /// One column right.
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Mask bit for this direction.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Up => 1,
            Self::Down => 2,
            Self::Left => 4,
            Self::Right => 8,
        }
    }
}

/// Bitset over the four directions stored in the instruction's fourth byte.
///
/// An empty mask means the cell may be left in any direction; a nonzero
/// mask restricts movement to the listed directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DirectionMask(u8);

impl DirectionMask {
    /// Mask permitting every direction.
    pub const EMPTY: Self = Self(0);

    /// Wraps a raw mask byte. Bits above the four direction bits are kept
    /// verbatim (stack corruption may plant them) but never match a
    /// direction.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw mask byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether no direction bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `direction`'s bit is set.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Mask with `direction`'s bit flipped.
    #[must_use]
    pub const fn toggled(self, direction: Direction) -> Self {
        Self(self.0 ^ direction.bit())
    }
}

/// Field selector within the 4-byte instruction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Byte 0: opcode.
    Opcode,
    /// Byte 1: operand (literal or address selector).
    Operand,
    /// Byte 2: operand mode.
    Mode,
    /// Byte 3: direction mask.
    Directions,
}

impl Field {
    /// Byte offset of this field inside the record.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::Opcode => 0,
            Self::Operand => 1,
            Self::Mode => 2,
            Self::Directions => 3,
        }
    }
}

/// Reads one field of the instruction at `index`.
///
/// Out-of-range indices yield the NIL sentinel (0) rather than reading
/// adjacent registers.
#[must_use]
pub fn fetch(memory: &Memory, index: usize, field: Field) -> u8 {
    if index >= memory.cells() {
        return 0;
    }
    memory.get(PRG + index * INSTRUCTION_BYTES + field.offset())
}

/// Writes one field of the instruction at `index`.
///
/// Out-of-range indices are dropped.
pub fn store(memory: &mut Memory, index: usize, field: Field, value: u8) {
    if index >= memory.cells() {
        return;
    }
    memory.set(PRG + index * INSTRUCTION_BYTES + field.offset(), value);
}

/// A whole 4-byte instruction record, fields kept as raw bytes.
///
/// Used by the editor's yank register and cut/paste, which move records
/// verbatim without interpreting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instruction {
    /// Raw opcode byte.
    pub opcode: u8,
    /// Raw operand byte.
    pub operand: u8,
    /// Raw mode byte.
    pub mode: u8,
    /// Raw direction-mask byte.
    pub directions: u8,
}

impl Instruction {
    /// The empty cell `{NIL, 0, IMMEDIATE, 0}` written by cut.
    pub const NIL_CLEAR: Self = Self {
        opcode: 0,
        operand: 0,
        mode: 0,
        directions: 0,
    };

    /// Copies the record at `index` out of memory. Out-of-range indices
    /// yield [`Self::NIL_CLEAR`].
    #[must_use]
    pub fn read(memory: &Memory, index: usize) -> Self {
        Self {
            opcode: fetch(memory, index, Field::Opcode),
            operand: fetch(memory, index, Field::Operand),
            mode: fetch(memory, index, Field::Mode),
            directions: fetch(memory, index, Field::Directions),
        }
    }

    /// Writes this record over the instruction at `index`.
    pub fn write(self, memory: &mut Memory, index: usize) {
        store(memory, index, Field::Opcode, self.opcode);
        store(memory, index, Field::Operand, self.operand);
        store(memory, index, Field::Mode, self.mode);
        store(memory, index, Field::Directions, self.directions);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        fetch, store, AddressTarget, Direction, DirectionMask, Field, Instruction, Memory, Mode,
        Opcode, Step,
    };

    #[test]
    fn opcode_bytes_roundtrip_and_match_table_order() {
        for (position, opcode) in Opcode::ALL.iter().copied().enumerate() {
            assert_eq!(usize::from(opcode.as_u8()), position);
            assert_eq!(Opcode::from_u8(opcode.as_u8()), Some(opcode));
        }
        assert_eq!(Opcode::from_u8(13), None);
        assert_eq!(Opcode::from_u8(0xFF), None);
    }

    #[test]
    fn lossy_decode_degrades_unassigned_bytes_to_nil() {
        assert_eq!(Opcode::from_u8_lossy(5), Opcode::Add);
        assert_eq!(Opcode::from_u8_lossy(13), Opcode::Nil);
        assert_eq!(Opcode::from_u8_lossy(0xAB), Opcode::Nil);
    }

    #[test]
    fn opcode_cycling_wraps_both_ways() {
        assert_eq!(Opcode::Nil.cycled(Step::Forward), Opcode::Nop);
        assert_eq!(Opcode::Txt.cycled(Step::Forward), Opcode::Nil);
        assert_eq!(Opcode::Nil.cycled(Step::Back), Opcode::Txt);
        assert_eq!(Opcode::Add.cycled(Step::Back), Opcode::Swp);
    }

    #[test]
    fn classification_predicates_match_contract() {
        assert!(!Opcode::Nil.is_enterable());
        for opcode in Opcode::ALL {
            if opcode != Opcode::Nil {
                assert!(opcode.is_enterable());
            }
        }

        for opcode in [Opcode::Nil, Opcode::Nop, Opcode::Swp, Opcode::Snd] {
            assert!(!opcode.takes_operand());
        }
        for opcode in [Opcode::Get, Opcode::Set, Opcode::Teq, Opcode::Txt] {
            assert!(opcode.takes_operand());
        }

        assert!(!Opcode::Nil.allows_direction_edit());
        assert!(!Opcode::End.allows_direction_edit());
        assert!(Opcode::Nop.allows_direction_edit());
    }

    #[test]
    fn mode_decode_treats_corruption_as_immediate() {
        assert_eq!(Mode::from_u8(0), Mode::Immediate);
        assert_eq!(Mode::from_u8(1), Mode::Address);
        assert_eq!(Mode::from_u8(0x7F), Mode::Immediate);
        assert_eq!(Mode::Immediate.toggled(), Mode::Address);
        assert_eq!(Mode::Address.toggled(), Mode::Immediate);
    }

    #[test]
    fn address_targets_map_to_register_offsets() {
        assert_eq!(AddressTarget::Dat.offset(), 5);
        assert_eq!(AddressTarget::Stk.offset(), 10);
        assert_eq!(AddressTarget::Cyc.offset(), 3);
        assert_eq!(AddressTarget::Ip.offset(), 1);
        assert_eq!(AddressTarget::Sp.offset(), 2);

        for target in AddressTarget::ALL {
            assert_eq!(AddressTarget::from_offset(target.offset()), Some(target));
        }
        assert_eq!(AddressTarget::from_offset(0), None);
        assert_eq!(AddressTarget::from_offset(200), None);
    }

    #[test]
    fn address_target_cycling_wraps() {
        assert_eq!(AddressTarget::Dat.cycled(Step::Forward), AddressTarget::Stk);
        assert_eq!(AddressTarget::Sp.cycled(Step::Forward), AddressTarget::Dat);
        assert_eq!(AddressTarget::Dat.cycled(Step::Back), AddressTarget::Sp);
    }

    #[test]
    fn direction_mask_bits_are_independent() {
        let mut mask = DirectionMask::EMPTY;
        assert!(mask.is_empty());

        for direction in Direction::ALL {
            mask = mask.toggled(direction);
            assert!(mask.contains(direction));
        }
        assert_eq!(mask.bits(), 0b1111);

        mask = mask.toggled(Direction::Left);
        assert!(!mask.contains(Direction::Left));
        assert!(mask.contains(Direction::Right));
    }

    #[test]
    fn fetch_and_store_address_fields_inside_the_record() {
        let mut memory = Memory::with_cells(4);

        store(&mut memory, 2, Field::Opcode, Opcode::Teq.as_u8());
        store(&mut memory, 2, Field::Operand, 10);
        store(&mut memory, 2, Field::Mode, Mode::Immediate.as_u8());
        store(&mut memory, 2, Field::Directions, Direction::Right.bit());

        assert_eq!(fetch(&memory, 2, Field::Opcode), Opcode::Teq.as_u8());
        assert_eq!(fetch(&memory, 2, Field::Operand), 10);
        assert_eq!(fetch(&memory, 2, Field::Mode), 0);
        assert_eq!(fetch(&memory, 2, Field::Directions), 8);

        // Neighbouring records untouched.
        assert_eq!(fetch(&memory, 1, Field::Opcode), 0);
        assert_eq!(fetch(&memory, 3, Field::Opcode), 0);
    }

    #[test]
    fn out_of_range_fetch_yields_the_nil_sentinel() {
        let mut memory = Memory::with_cells(4);
        store(&mut memory, 3, Field::Opcode, Opcode::End.as_u8());

        assert_eq!(fetch(&memory, 4, Field::Opcode), 0);
        assert_eq!(fetch(&memory, usize::MAX / 8, Field::Operand), 0);

        let before = memory.dump();
        store(&mut memory, 4, Field::Opcode, 0xFF);
        assert_eq!(&*memory.dump(), &*before);
    }

    #[test]
    fn whole_record_copy_roundtrips() {
        let mut memory = Memory::with_cells(4);
        let record = Instruction {
            opcode: Opcode::Add.as_u8(),
            operand: 7,
            mode: Mode::Address.as_u8(),
            directions: Direction::Up.bit() | Direction::Down.bit(),
        };

        record.write(&mut memory, 1);
        assert_eq!(Instruction::read(&memory, 1), record);
        assert_eq!(Instruction::read(&memory, 0), Instruction::NIL_CLEAR);
        assert_eq!(Instruction::read(&memory, 9), Instruction::NIL_CLEAR);
    }
}
