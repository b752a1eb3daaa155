//! Core VM for the gridbug instruction-grid puzzle.
//!
//! The player steers a single debugger cursor across a grid of 4-byte
//! instructions, executing each on entry, trying to reach END under a
//! cycle budget. This crate is the whole rules engine: memory model,
//! instruction codec, execution and move legality, snapshot-based undo,
//! and the program editor. Rendering and input binding live elsewhere and
//! talk to it only through the types re-exported here.

/// Flat byte-addressable memory model and stack primitives.
pub mod memory;
pub use memory::{
    Memory, Snapshot, CYC, DAT, DBG, HALTED, INSTRUCTION_BYTES, IP, PRG, RUNNING, SP, STA,
    STACK_CAPACITY, STK,
};

/// Instruction record encoding and the field-level codec.
pub mod instruction;
pub use instruction::{
    fetch, store, AddressTarget, Direction, DirectionMask, Field, Instruction, Mode, Opcode, Step,
};

/// Instruction execution engine and the SND output extension point.
pub mod execute;
pub use execute::{execute, resolve_operand, NullSink, OutputSink};

/// Move legality, committed jumps, and random program generation.
pub mod navigate;
pub use navigate::{attempt_move, jump, randomize_program, Grid};

/// Snapshot-based linear undo log.
pub mod history;
pub use history::HistoryLog;

/// Grid/cell program editor state machine.
pub mod editor;
pub use editor::{Editor, EditorMode};

/// Authored level data and the run-length program codec.
pub mod level;
pub use level::{decode_rle, encode_rle, Level, LevelError};

/// Session assembly and the abstract input-command surface.
pub mod session;
pub use session::{Command, Session, SessionConfig, DEFAULT_COLUMNS, DEFAULT_ROWS};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
