//! Flat byte-addressable memory model.
//!
//! All machine state lives in one fixed-size byte array: status, registers,
//! stack, and program. Writes saturate at byte bounds; reads and writes past
//! the end of the array are guarded (reads yield 0, writes are dropped).
//! The stack deliberately has no capacity check: pushing past the thirteenth
//! slot walks into the program region and corrupts live instruction bytes.
//! That aliasing is a designed puzzle mechanic, not a defect.

/// Offset of the status byte ([`RUNNING`] or [`HALTED`]).
pub const STA: usize = 0;
/// Offset of the instruction pointer (0-based program index).
pub const IP: usize = 1;
/// Offset of the stack pointer (count of stacked values).
pub const SP: usize = 2;
/// Offset of the elapsed cycle counter.
pub const CYC: usize = 3;
/// Offset of the debugger's working register.
pub const DBG: usize = 4;
/// Offset of the general-purpose data register.
pub const DAT: usize = 5;
/// Offset of the first stack slot.
pub const STK: usize = 10;
/// Stack slots available before pushes spill toward the program region.
pub const STACK_CAPACITY: u8 = 13;
/// Offset of the first instruction record.
pub const PRG: usize = 24;
/// Bytes per instruction record.
pub const INSTRUCTION_BYTES: usize = 4;

/// `STA` value while the debugger may still move.
pub const RUNNING: u8 = 0;
/// `STA` value after `END` retires. Monotone until a reset or load.
pub const HALTED: u8 = 1;

/// Independent full copy of a machine's memory.
///
/// Used by the history log, export, and level loading.
pub type Snapshot = Box<[u8]>;

/// One machine's entire mutable state.
///
/// A `Memory` is owned by a single session; there is no shared or global
/// state, so independent instances never cross-contaminate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Memory {
    /// Allocates zeroed memory sized for `cells` instruction records.
    #[must_use]
    pub fn with_cells(cells: usize) -> Self {
        Self {
            bytes: vec![0; PRG + cells * INSTRUCTION_BYTES].into_boxed_slice(),
        }
    }

    /// Total size of the backing array in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-cell memory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of instruction records the program region holds.
    #[must_use]
    pub fn cells(&self) -> usize {
        (self.bytes.len().saturating_sub(PRG)) / INSTRUCTION_BYTES
    }

    /// Raw view of the backing array.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads one byte. Out-of-range offsets yield 0, never adjacent state.
    #[must_use]
    pub fn get(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    /// Writes one byte. Out-of-range offsets are dropped.
    pub fn set(&mut self, offset: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(offset) {
            *byte = value;
        }
    }

    /// Adds `amount` to the byte at `offset`, saturating at 255.
    pub fn saturating_add_at(&mut self, offset: usize, amount: u8) {
        let value = self.get(offset).saturating_add(amount);
        self.set(offset, value);
    }

    /// Subtracts `amount` from the byte at `offset`, saturating at 0.
    pub fn saturating_sub_at(&mut self, offset: usize, amount: u8) {
        let value = self.get(offset).saturating_sub(amount);
        self.set(offset, value);
    }

    /// Pushes a value: writes `STK + SP`, then increments `SP`.
    ///
    /// No capacity check. With `SP >= STACK_CAPACITY` the write lands past
    /// the stack slots and eventually inside the program region.
    pub fn push(&mut self, value: u8) {
        let sp = self.get(SP);
        self.set(STK + usize::from(sp), value);
        self.set(SP, sp.saturating_add(1));
    }

    /// Pops a value: decrements `SP`, then reads `STK + SP`.
    ///
    /// Popping an empty stack leaves `SP` at 0 and reads the first slot.
    pub fn pop(&mut self) -> u8 {
        let sp = self.get(SP).saturating_sub(1);
        self.set(SP, sp);
        self.get(STK + usize::from(sp))
    }

    /// Reads the value below the stack pointer without mutating `SP`.
    ///
    /// An empty stack yields 0.
    #[must_use]
    pub fn peek(&self) -> u8 {
        let sp = self.get(SP);
        if sp == 0 {
            0
        } else {
            self.get(STK + usize::from(sp) - 1)
        }
    }

    /// Returns an independent copy of the full memory array.
    #[must_use]
    pub fn dump(&self) -> Snapshot {
        self.bytes.clone()
    }

    /// Replaces memory wholesale. No validation; the caller guarantees a
    /// well-formed image (history entries and decoded level programs are).
    pub fn load(&mut self, snapshot: &[u8]) {
        self.bytes = snapshot.into();
    }

    /// Zeroes every byte, keeping the current size.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}
