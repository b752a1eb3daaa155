//! Execution engine: evaluates one instruction against current memory.
//!
//! `execute` is the legality oracle for movement: the navigation engine
//! commits a move only when the target instruction reports success. Side
//! effects apply to memory immediately and are never rolled back here;
//! pre-change snapshots are the history log's responsibility.

use crate::instruction::{fetch, Field, Mode, Opcode};
use crate::memory::{Memory, DBG, HALTED, STA, STK};

/// Sink for values emitted by `SND`.
///
/// The reference behavior leaves the send target undefined; this trait is
/// the extension point. The core never interprets sent values.
pub trait OutputSink {
    /// Receives one emitted byte.
    fn send(&mut self, value: u8);
}

/// Sink that discards every emitted value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn send(&mut self, _value: u8) {}
}

/// Resolves an operand byte to a value.
///
/// Immediate mode uses the operand literally. Address mode dereferences:
/// the stack selector reads the stack top (0 when empty), any other value
/// is a raw register byte read at that offset.
#[must_use]
pub fn resolve_operand(memory: &Memory, operand: u8, mode: Mode) -> u8 {
    match mode {
        Mode::Immediate => operand,
        Mode::Address => {
            if usize::from(operand) == STK {
                memory.peek()
            } else {
                memory.get(usize::from(operand))
            }
        }
    }
}

/// Executes the instruction at `index` and reports success.
///
/// Success gates movement: conditional tests return their comparison
/// result, NIL (and any out-of-range index) always fails, everything else
/// succeeds after applying its effect.
pub fn execute(memory: &mut Memory, index: usize, sink: &mut dyn OutputSink) -> bool {
    let opcode = Opcode::from_u8_lossy(fetch(memory, index, Field::Opcode));
    let operand = fetch(memory, index, Field::Operand);
    let mode = Mode::from_u8(fetch(memory, index, Field::Mode));
    let value = resolve_operand(memory, operand, mode);

    match opcode {
        Opcode::Nil => false,
        Opcode::Nop | Opcode::Txt => true,
        Opcode::Get => {
            memory.set(DBG, value);
            true
        }
        Opcode::Set => {
            if usize::from(operand) == STK {
                let dbg = memory.get(DBG);
                memory.push(dbg);
            } else {
                memory.set(usize::from(operand), value);
            }
            true
        }
        Opcode::Swp => {
            if usize::from(operand) == STK {
                let top = memory.pop();
                let dbg = memory.get(DBG);
                memory.push(dbg);
                memory.set(DBG, top);
            } else {
                let other = memory.get(usize::from(operand));
                let dbg = memory.get(DBG);
                memory.set(usize::from(operand), dbg);
                memory.set(DBG, other);
            }
            true
        }
        Opcode::Add => {
            memory.saturating_add_at(DBG, value);
            true
        }
        Opcode::Sub => {
            memory.saturating_sub_at(DBG, value);
            true
        }
        Opcode::Teq => memory.get(DBG) == value,
        Opcode::Tlt => memory.get(DBG) < value,
        Opcode::Tgt => memory.get(DBG) > value,
        Opcode::Snd => {
            sink.send(memory.get(DBG));
            true
        }
        Opcode::End => {
            memory.set(STA, HALTED);
            true
        }
    }
}
