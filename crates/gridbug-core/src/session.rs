//! One playing session: memory, history, editor, and the command surface.
//!
//! Everything is synchronous and single-owner. A caller feeds abstract
//! input commands (key binding is a collaborator concern) into
//! [`Session::apply`], one per input event; each call either commits fully
//! or is rejected with no effect. There is no internal scheduling and no
//! locking: one session owns its memory exclusively.

use rand::Rng;

use crate::editor::Editor;
use crate::execute::OutputSink;
use crate::history::HistoryLog;
use crate::instruction::{Direction, Step};
use crate::level::{Level, LevelError};
use crate::memory::{Memory, Snapshot, CYC, HALTED, IP, RUNNING, STA};
use crate::navigate::{attempt_move, randomize_program, Grid};

/// Session-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SessionConfig {
    /// Grid columns.
    pub columns: usize,
    /// Grid rows.
    pub rows: usize,
    /// Whether nonzero direction masks restrict movement.
    ///
    /// Authored levels play with masks enforced; random boards disable
    /// enforcement (see [`Session::randomize`]).
    pub enforce_direction_masks: bool,
}

/// Default grid columns.
pub const DEFAULT_COLUMNS: usize = 8;
/// Default grid rows.
pub const DEFAULT_ROWS: usize = 8;

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            enforce_direction_masks: true,
        }
    }
}

impl SessionConfig {
    /// Grid geometry for this configuration.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        Grid {
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// Abstract input commands consumed by a session.
///
/// Binding these to physical keys is the input layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Command {
    /// Move the debugger one cell (play mode only).
    Move(Direction),
    /// Restore the most recent history snapshot.
    Undo,
    /// Enter or leave the editor.
    ToggleEditor,
    /// Move the edit cursor one cell.
    CursorMove(Direction),
    /// Flip one approach-direction bit on the cursor cell.
    ToggleDirection(Direction),
    /// Copy the cursor cell into the yank register.
    Yank,
    /// Copy the cursor cell, then clear it.
    Cut,
    /// Overwrite the cursor cell with the yank register.
    Paste,
    /// Flip the cursor cell between NIL and NOP.
    ToggleCell,
    /// Step the cursor cell's opcode through the opcode list.
    CycleOpcode(Step),
    /// Step an address-mode operand through the valid selectors.
    CycleOperand(Step),
    /// Adjust an immediate-mode operand by one.
    AdjustOperand(Step),
    /// Adjust an immediate-mode operand by ten.
    AdjustOperandCoarse(Step),
    /// Flip the cursor cell between immediate and address mode.
    ToggleMode,
    /// Move the live debugger to the cursor without executing.
    Teleport,
}

/// A single VM session: exclusive owner of one memory image.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    memory: Memory,
    history: HistoryLog,
    editor: Editor,
}

impl Session {
    /// Creates a session over a blank (all-NIL) board.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            memory: Memory::with_cells(config.grid().cells()),
            config,
            history: HistoryLog::new(),
            editor: Editor::new(),
        }
    }

    /// Creates a session and fills it with a random candidate program.
    #[must_use]
    pub fn with_random_program<R: Rng>(config: SessionConfig, rng: &mut R) -> Self {
        let mut session = Self::new(config);
        session.randomize(rng);
        session
    }

    /// Creates a session running an authored level.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::TruncatedRun`] for a malformed program stream
    /// and [`LevelError::WrongImageSize`] when the decoded image does not
    /// fit the configured grid.
    pub fn with_level(config: SessionConfig, level: &Level) -> Result<Self, LevelError> {
        let mut session = Self::new(config);
        session.load_level(level)?;
        Ok(session)
    }

    /// Replaces the board with a fresh random program.
    ///
    /// Random masks make a random board unnavigable, so this turns mask
    /// enforcement off; construct from a level to get it back.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.memory.clear();
        randomize_program(&mut self.memory, &self.config.grid(), rng);
        self.config.enforce_direction_masks = false;
        self.history.clear();
        self.editor.close();
    }

    /// Replaces the board with an authored level's image.
    ///
    /// Authored boards play with direction masks enforced.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::TruncatedRun`] for a malformed program stream
    /// and [`LevelError::WrongImageSize`] when the decoded image does not
    /// fit the configured grid.
    pub fn load_level(&mut self, level: &Level) -> Result<(), LevelError> {
        let image = level.decoded_program()?;
        if image.len() != self.memory.len() {
            return Err(LevelError::WrongImageSize {
                expected: self.memory.len(),
                actual: image.len(),
            });
        }
        self.memory.load(&image);
        self.config.enforce_direction_masks = true;
        self.history.clear();
        self.editor.close();
        Ok(())
    }

    /// Applies one input command and reports whether anything changed.
    ///
    /// Committed memory mutations record exactly one history entry each;
    /// rejected or memory-neutral commands (cursor moves, yank) record
    /// none, so undo never replays a no-op.
    pub fn apply(&mut self, command: Command, sink: &mut dyn OutputSink) -> bool {
        if matches!(command, Command::Undo) {
            return self.history.undo(&mut self.memory);
        }

        let before = self.memory.dump();
        let acted = self.dispatch(command, sink);
        if self.memory.as_bytes() != &*before {
            self.history.record(before);
            return true;
        }
        acted
    }

    fn dispatch(&mut self, command: Command, sink: &mut dyn OutputSink) -> bool {
        let grid = self.config.grid();
        match command {
            // Handled in apply; listed to keep the match exhaustive.
            Command::Undo => false,
            Command::Move(direction) => {
                if self.editor.is_active() || self.is_halted() {
                    return false;
                }
                attempt_move(
                    &mut self.memory,
                    &grid,
                    direction,
                    self.config.enforce_direction_masks,
                    sink,
                )
            }
            Command::ToggleEditor => {
                if self.editor.is_active() {
                    self.editor.close();
                } else {
                    self.editor.open(self.ip());
                }
                true
            }
            Command::CursorMove(direction) => {
                self.editor.is_active() && self.editor.move_cursor(&grid, direction)
            }
            Command::ToggleDirection(direction) => {
                self.editor.is_active() && self.editor.toggle_direction(&mut self.memory, direction)
            }
            Command::Yank => {
                if !self.editor.is_active() {
                    return false;
                }
                self.editor.yank(&self.memory);
                true
            }
            Command::Cut => {
                if !self.editor.is_active() {
                    return false;
                }
                self.editor.cut(&mut self.memory);
                true
            }
            Command::Paste => {
                if !self.editor.is_active() {
                    return false;
                }
                self.editor.paste(&mut self.memory);
                true
            }
            Command::ToggleCell => {
                if !self.editor.is_active() {
                    return false;
                }
                self.editor.toggle_cell(&mut self.memory);
                true
            }
            Command::CycleOpcode(step) => {
                if !self.editor.is_active() {
                    return false;
                }
                self.editor.cycle_opcode(&mut self.memory, step);
                true
            }
            Command::CycleOperand(step) => {
                self.editor.is_active() && self.editor.cycle_operand(&mut self.memory, step)
            }
            Command::AdjustOperand(step) => {
                self.editor.is_active() && self.editor.adjust_operand(&mut self.memory, step, 1)
            }
            Command::AdjustOperandCoarse(step) => {
                self.editor.is_active() && self.editor.adjust_operand(&mut self.memory, step, 10)
            }
            Command::ToggleMode => {
                self.editor.is_active() && self.editor.toggle_mode(&mut self.memory)
            }
            Command::Teleport => {
                if !self.editor.is_active() {
                    return false;
                }
                self.editor.teleport(&mut self.memory);
                true
            }
        }
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read access to machine memory, for renderers (via the codec).
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Read access to the editor (cursor position, activity).
    #[must_use]
    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Number of undoable history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current instruction pointer.
    #[must_use]
    pub fn ip(&self) -> usize {
        usize::from(self.memory.get(IP))
    }

    /// Elapsed cycle count. Presentation layers read this at halt time to
    /// award score tiers.
    #[must_use]
    pub fn cycles(&self) -> u8 {
        self.memory.get(CYC)
    }

    /// Whether the machine has halted via END.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.memory.get(STA) == HALTED
    }

    /// Raw copy of current memory.
    #[must_use]
    pub fn dump(&self) -> Snapshot {
        self.memory.dump()
    }

    /// Replaces memory wholesale (save/restore). Clears history: old
    /// snapshots would otherwise undo across the load.
    pub fn load(&mut self, snapshot: &[u8]) {
        self.memory.load(snapshot);
        self.history.clear();
    }

    /// Copy of memory with the cycle counter and status reset, so an
    /// exported program always starts fresh.
    #[must_use]
    pub fn export(&self) -> Snapshot {
        let mut image = self.memory.dump();
        if let Some(cyc) = image.get_mut(CYC) {
            *cyc = 0;
        }
        if let Some(sta) = image.get_mut(STA) {
            *sta = RUNNING;
        }
        image
    }

    /// Run-length encoded [`Self::export`] image, for level authoring.
    #[must_use]
    pub fn export_encoded(&self) -> Vec<u8> {
        crate::level::encode_rle(&self.export())
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, Session, SessionConfig};
    use crate::execute::NullSink;
    use crate::instruction::{store, Field, Opcode};
    use crate::memory::{CYC, HALTED, STA};

    fn session() -> Session {
        Session::new(SessionConfig::default())
    }

    #[test]
    fn default_config_is_an_eight_by_eight_enforced_grid() {
        let config = SessionConfig::default();
        assert_eq!(config.columns, 8);
        assert_eq!(config.rows, 8);
        assert!(config.enforce_direction_masks);
        assert_eq!(config.grid().cells(), 64);
    }

    #[test]
    fn export_resets_cycles_and_status() {
        let mut session = session();
        session.memory.set(CYC, 19);
        session.memory.set(STA, HALTED);

        let image = session.export();
        assert_eq!(image[CYC], 0);
        assert_eq!(image[STA], 0);
        // Live memory untouched.
        assert_eq!(session.cycles(), 19);
        assert!(session.is_halted());
    }

    #[test]
    fn moves_are_refused_after_halt() {
        let mut session = session();
        store(&mut session.memory, 1, Field::Opcode, Opcode::End.as_u8());

        assert!(session.apply(
            Command::Move(crate::instruction::Direction::Right),
            &mut NullSink
        ));
        assert!(session.is_halted());

        assert!(!session.apply(
            Command::Move(crate::instruction::Direction::Right),
            &mut NullSink
        ));
    }

    #[test]
    fn editor_toggle_never_touches_memory_or_history() {
        let mut session = session();
        let before = session.dump();

        assert!(session.apply(Command::ToggleEditor, &mut NullSink));
        assert!(session.editor().is_active());
        assert!(session.apply(Command::ToggleEditor, &mut NullSink));
        assert!(!session.editor().is_active());

        assert_eq!(&*session.dump(), &*before);
        assert_eq!(session.history_len(), 0);
    }
}
