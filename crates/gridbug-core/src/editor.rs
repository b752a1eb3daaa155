//! Program editor: grid cursor plus cell-level instruction surgery.
//!
//! Edits are direct field writes through the codec at the edit pointer;
//! nothing here goes through the execution engine, so editing can build
//! configurations that normal play could never reach. The editor itself is
//! transient session state: the pointer and yank register are never part
//! of persisted memory and reset when editing ends.
//!
//! Every mutating operation reports whether it was accepted, so the session
//! can decide what deserves a history entry.

use crate::instruction::{
    fetch, store, AddressTarget, Direction, DirectionMask, Field, Instruction, Mode, Opcode, Step,
};
use crate::memory::{Memory, IP};
use crate::navigate::Grid;

/// Editor activity state.
///
/// This is the merged variant: while active, cursor movement and every
/// cell-level operation are available together at the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditorMode {
    /// Not editing; movement commands drive the debugger instead.
    #[default]
    Inactive,
    /// Editing; commands target the instruction under the cursor.
    Active,
}

/// Grid cursor, yank register, and the cell-editing operations.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    mode: EditorMode,
    pointer: usize,
    yank_register: Instruction,
}

impl Editor {
    /// Creates an inactive editor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the editor currently owns input.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.mode, EditorMode::Active)
    }

    /// Current edit pointer (instruction index under the cursor).
    #[must_use]
    pub const fn pointer(&self) -> usize {
        self.pointer
    }

    /// Enters edit mode with the cursor on the debugger's instruction.
    pub fn open(&mut self, ip: usize) {
        self.mode = EditorMode::Active;
        self.pointer = ip;
    }

    /// Leaves edit mode and discards transient cursor state.
    pub fn close(&mut self) {
        self.mode = EditorMode::Inactive;
        self.pointer = 0;
        self.yank_register = Instruction::NIL_CLEAR;
    }

    /// Moves the cursor one cell, clamping at grid edges (no wraparound).
    ///
    /// Keeping the pointer in range means cursor reads never need the
    /// codec's out-of-bounds sentinel, though that guard still backs this
    /// up.
    pub fn move_cursor(&mut self, grid: &Grid, direction: Direction) -> bool {
        grid.step(self.pointer, direction).is_some_and(|target| {
            self.pointer = target;
            true
        })
    }

    /// Flips one bit of the direction mask under the cursor.
    ///
    /// Refused on NIL and END cells: un-enterable or halting cells must
    /// not advertise approach directions.
    pub fn toggle_direction(&self, memory: &mut Memory, direction: Direction) -> bool {
        if !self.opcode_at(memory).allows_direction_edit() {
            return false;
        }
        let mask = DirectionMask::new(fetch(memory, self.pointer, Field::Directions));
        store(
            memory,
            self.pointer,
            Field::Directions,
            mask.toggled(direction).bits(),
        );
        true
    }

    /// Copies the instruction under the cursor into the yank register.
    pub fn yank(&mut self, memory: &Memory) {
        self.yank_register = Instruction::read(memory, self.pointer);
    }

    /// Yanks, then clears the cell to `{NIL, 0, IMMEDIATE, 0}`.
    pub fn cut(&mut self, memory: &mut Memory) {
        self.yank(memory);
        Instruction::NIL_CLEAR.write(memory, self.pointer);
    }

    /// Overwrites the cell with the yank register's four fields.
    pub fn paste(&self, memory: &mut Memory) {
        self.yank_register.write(memory, self.pointer);
    }

    /// Quick erase/place gesture: NIL becomes NOP, anything else NIL.
    pub fn toggle_cell(&self, memory: &mut Memory) {
        let next = if self.opcode_at(memory) == Opcode::Nil {
            Opcode::Nop
        } else {
            Opcode::Nil
        };
        store(memory, self.pointer, Field::Opcode, next.as_u8());
    }

    /// Steps the opcode through the full ordered list, wrapping.
    pub fn cycle_opcode(&self, memory: &mut Memory, step: Step) {
        let next = self.opcode_at(memory).cycled(step);
        store(memory, self.pointer, Field::Opcode, next.as_u8());
    }

    /// Steps an address-mode operand through the valid selectors, wrapping.
    ///
    /// Refused unless the opcode takes an operand and the cell is in
    /// address mode. Corrupted operand bytes re-enter the cycle at DAT.
    pub fn cycle_operand(&self, memory: &mut Memory, step: Step) -> bool {
        if !self.operand_editable(memory) || self.mode_at(memory) != Mode::Address {
            return false;
        }
        let operand = fetch(memory, self.pointer, Field::Operand);
        let target = AddressTarget::from_offset(operand).unwrap_or(AddressTarget::Dat);
        store(
            memory,
            self.pointer,
            Field::Operand,
            target.cycled(step).offset(),
        );
        true
    }

    /// Adjusts an immediate-mode operand by `amount`, saturating at byte
    /// bounds.
    ///
    /// Refused unless the opcode takes an operand and the cell is in
    /// immediate mode.
    pub fn adjust_operand(&self, memory: &mut Memory, step: Step, amount: u8) -> bool {
        if !self.operand_editable(memory) || self.mode_at(memory) != Mode::Immediate {
            return false;
        }
        let operand = fetch(memory, self.pointer, Field::Operand);
        let adjusted = match step {
            Step::Forward => operand.saturating_add(amount),
            Step::Back => operand.saturating_sub(amount),
        };
        store(memory, self.pointer, Field::Operand, adjusted);
        true
    }

    /// Flips the cell between immediate and address mode.
    ///
    /// Switching to address mode resets the operand to DAT; switching to
    /// immediate resets it to 0. Refused when the opcode takes no operand.
    pub fn toggle_mode(&self, memory: &mut Memory) -> bool {
        if !self.operand_editable(memory) {
            return false;
        }
        let next = self.mode_at(memory).toggled();
        let operand = match next {
            Mode::Address => AddressTarget::Dat.offset(),
            Mode::Immediate => 0,
        };
        store(memory, self.pointer, Field::Mode, next.as_u8());
        store(memory, self.pointer, Field::Operand, operand);
        true
    }

    /// Teleports the live debugger to the cursor without executing
    /// anything.
    pub fn teleport(&self, memory: &mut Memory) {
        memory.set(IP, u8::try_from(self.pointer).unwrap_or(u8::MAX));
    }

    fn opcode_at(&self, memory: &Memory) -> Opcode {
        Opcode::from_u8_lossy(fetch(memory, self.pointer, Field::Opcode))
    }

    fn mode_at(&self, memory: &Memory) -> Mode {
        Mode::from_u8(fetch(memory, self.pointer, Field::Mode))
    }

    fn operand_editable(&self, memory: &Memory) -> bool {
        self.opcode_at(memory).takes_operand()
    }
}
