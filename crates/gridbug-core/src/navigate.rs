//! Navigation engine: move legality and committed jumps.
//!
//! A move has three gates, in order: the direction mask on the cell being
//! left, the grid boundary, and the target instruction's execution result.
//! Only when all three pass does the instruction pointer (and the cycle
//! counter) change. A rejected move leaves no trace at all.

use rand::Rng;

use crate::execute::{execute, OutputSink};
use crate::instruction::{
    fetch, store, AddressTarget, Direction, DirectionMask, Field, Mode, Opcode,
};
use crate::memory::{Memory, CYC, IP};

/// Rectangular program-grid geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Grid {
    /// Cells per row.
    pub columns: usize,
    /// Number of rows.
    pub rows: usize,
}

impl Grid {
    /// Total instruction slots on the board.
    #[must_use]
    pub const fn cells(&self) -> usize {
        self.columns * self.rows
    }

    /// Neighbouring index in `direction`, or `None` at a grid edge.
    ///
    /// Moves that would leave the board are rejected here, before the
    /// target is ever evaluated, so the instruction pointer never dangles.
    #[must_use]
    pub const fn step(&self, index: usize, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Left => {
                if index % self.columns > 0 {
                    Some(index - 1)
                } else {
                    None
                }
            }
            Direction::Right => {
                if index % self.columns + 1 < self.columns {
                    Some(index + 1)
                } else {
                    None
                }
            }
            Direction::Up => {
                if index >= self.columns {
                    Some(index - self.columns)
                } else {
                    None
                }
            }
            Direction::Down => {
                if index + self.columns < self.cells() {
                    Some(index + self.columns)
                } else {
                    None
                }
            }
        }
    }
}

/// Moves the debugger to `index` if the instruction there executes
/// successfully.
///
/// On success commits `IP <- index` and one cycle (saturating). On failure
/// nothing changes: failing instructions (NIL and false conditionals) have
/// no side effects of their own.
pub fn jump(memory: &mut Memory, index: usize, sink: &mut dyn OutputSink) -> bool {
    if !execute(memory, index, sink) {
        return false;
    }
    memory.set(IP, u8::try_from(index).unwrap_or(u8::MAX));
    memory.saturating_add_at(CYC, 1);
    true
}

/// Attempts a directional move from the current instruction pointer.
///
/// With `enforce_masks` set, a nonzero direction mask on the current cell
/// must contain `direction` or the move is rejected outright, regardless
/// of what lies there. Boundary and execution gating follow via [`jump`].
pub fn attempt_move(
    memory: &mut Memory,
    grid: &Grid,
    direction: Direction,
    enforce_masks: bool,
    sink: &mut dyn OutputSink,
) -> bool {
    let ip = usize::from(memory.get(IP));

    if enforce_masks {
        let mask = DirectionMask::new(fetch(memory, ip, Field::Directions));
        if !mask.is_empty() && !mask.contains(direction) {
            return false;
        }
    }

    let Some(target) = grid.step(ip, direction) else {
        return false;
    };
    jump(memory, target, sink)
}

/// Fills every instruction slot with a random candidate instruction.
///
/// Opcodes are weighted toward NIL and NOP with a uniform draw across the
/// whole set; operands stay consistent with the drawn mode (a valid address
/// selector, or a small literal); masks are empty or one single direction.
/// Used when no authored level is supplied.
pub fn randomize_program<R: Rng>(memory: &mut Memory, grid: &Grid, rng: &mut R) {
    for index in 0..grid.cells() {
        let opcode = random_opcode(rng);
        let mode = if rng.gen_bool(0.5) {
            Mode::Address
        } else {
            Mode::Immediate
        };
        let operand = match mode {
            Mode::Address => {
                AddressTarget::ALL[rng.gen_range(0..AddressTarget::ALL.len())].offset()
            }
            Mode::Immediate => rng.gen_range(0..16),
        };
        let directions = if rng.gen_bool(0.5) {
            DirectionMask::EMPTY.bits()
        } else {
            Direction::ALL[rng.gen_range(0..Direction::ALL.len())].bit()
        };

        store(memory, index, Field::Opcode, opcode.as_u8());
        store(memory, index, Field::Operand, operand);
        store(memory, index, Field::Mode, mode.as_u8());
        store(memory, index, Field::Directions, directions);
    }
}

fn random_opcode<R: Rng>(rng: &mut R) -> Opcode {
    match rng.gen_range(0..4_u8) {
        0 => Opcode::Nil,
        1 => Opcode::Nop,
        _ => Opcode::ALL[rng.gen_range(0..Opcode::ALL.len())],
    }
}
