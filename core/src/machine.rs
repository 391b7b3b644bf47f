use log::trace;

use crate::constants::{MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::error::Error;
use crate::instruction;
use crate::keypad::Keypad;
use crate::state::{FrameBuffer, State};

/// The outcome of a single executor step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// One instruction was fetched and executed.
    Executed,
    /// The fetched word is outside the instruction table; nothing beyond
    /// the pc advance happened. Surfaced so the caller can observe it.
    Unknown(u16),
    /// No program is loaded; the step did nothing.
    Idle,
}

/// # Machine
/// The machine owns all of the emulated state and is its only mutator.
///
/// Tracks:
///  - the current `state` (registers, memory, stack, timers, frame buffer)
///  - the `keypad` latch written by the host input collaborator
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - advancing the executor by single steps
/// - ticking its timers at a rate the caller owns
/// - inspecting its frame buffer for rendering by some display
pub struct Machine {
    state: State,
    keypad: Keypad,
    loaded: bool,
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            state: State::new(),
            keypad: Keypad::new(),
            loaded: false,
        }
    }

    /// Load a program image, replacing whatever was running before.
    ///
    /// The image is copied verbatim to 0x200 into an otherwise fresh state
    /// with the sprite sheet at 0x000. A rejected image leaves the previous
    /// state untouched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
            });
        }
        let mut state = State::new();
        let start = PROGRAM_START as usize;
        state.memory[start..start + program.len()].copy_from_slice(program);
        self.state = state;
        self.loaded = true;
        Ok(())
    }

    /// Advance the executor by exactly one fetch-decode-execute step.
    ///
    /// A step is atomic: on `Err` the state is left exactly as it was
    /// before the fetch.
    pub fn step(&mut self) -> Result<Step, Error> {
        if !self.loaded {
            return Ok(Step::Idle);
        }

        let op = self.fetch()?;
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op, self.state.v, self.state.i, self.state.pc
        );

        // pc moves past the word before dispatch; jumps overwrite it after
        let fetched = State {
            pc: self.state.pc.wrapping_add(0x2),
            ..self.state
        };
        match instruction::from_op(&op) {
            Some(operation) => {
                self.state = operation(&op, &fetched, &self.keypad)?;
                Ok(Step::Executed)
            }
            None => {
                self.state = fetched;
                Ok(Step::Unknown(op))
            }
        }
    }

    /// Tick both countdown timers: each drops by 1 when non-zero.
    ///
    /// The caller owns the 60 Hz cadence; the machine never consults a
    /// clock of its own.
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Whether the sound cue is active (ST > 0); the machine emits no audio.
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Record a key press or release from the host.
    pub fn set_key(&mut self, index: u8, pressed: bool) {
        self.keypad.set_key(index, pressed);
    }

    /// Whether a keypad key is currently held.
    pub fn is_pressed(&self, index: u8) -> bool {
        self.keypad.is_pressed(index)
    }

    /// The most recently pressed key, if none has been released since.
    pub fn last_pressed(&self) -> Option<u8> {
        self.keypad.last_pressed()
    }

    /// Returns a FrameBuffer snapshot if the display should be redrawn,
    /// clearing the draw flag.
    pub fn frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Read-only view of the frame buffer regardless of the draw flag.
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Fetches the big-endian opcode word at the pc, masked to 12 bits.
    fn fetch(&self) -> Result<u16, Error> {
        let pc = (self.state.pc & 0x0FFF) as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Error::AddressOutOfRange { address: pc + 1 });
        }
        let left = u16::from(self.state.memory[pc]);
        let right = u16::from(self.state.memory[pc + 1]);
        Ok(left << 8 | right)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_PROGRAM_SIZE;

    fn loaded(program: &[u8]) -> Machine {
        let mut machine = Machine::new();
        machine.load_program(program).unwrap();
        machine
    }

    #[test]
    fn test_machine_fetches_op() {
        let machine = loaded(&[0xAA, 0xBB]);
        assert_eq!(machine.fetch().unwrap(), 0xAABB);
    }

    #[test]
    fn test_step_is_a_noop_before_load() {
        let mut machine = Machine::new();
        assert_eq!(machine.step().unwrap(), Step::Idle);
        assert_eq!(machine.state.pc, 0x200);
    }

    #[test]
    fn test_step_advances_pc() {
        let mut machine = loaded(&[0x00, 0xE0]);
        assert_eq!(machine.step().unwrap(), Step::Executed);
        assert_eq!(machine.state.pc, 0x202);
    }

    #[test]
    fn test_unknown_word_is_surfaced_and_skipped() {
        let mut machine = loaded(&[0xF0, 0xFF]);
        assert_eq!(machine.step().unwrap(), Step::Unknown(0xF0FF));
        assert_eq!(machine.state.pc, 0x202);
    }

    #[test]
    fn test_load_accepts_a_full_size_program() {
        let mut machine = Machine::new();
        assert!(machine.load_program(&[0u8; MAX_PROGRAM_SIZE]).is_ok());
    }

    #[test]
    fn test_load_rejects_an_oversized_program() {
        let mut machine = Machine::new();
        let result = machine.load_program(&[0u8; MAX_PROGRAM_SIZE + 1]);
        assert_eq!(result.unwrap_err(), Error::ProgramTooLarge { size: 3585 });
    }

    #[test]
    fn test_rejected_load_preserves_prior_state() {
        let mut machine = loaded(&[0x61, 0x0A]);
        machine.step().unwrap();
        let before = machine.state;
        let _ = machine.load_program(&[0u8; MAX_PROGRAM_SIZE + 1]);
        assert_eq!(machine.state, before);
        assert!(machine.loaded);
    }

    #[test]
    fn test_accepted_load_rebuilds_state() {
        let mut machine = loaded(&[0x61, 0x0A]);
        machine.step().unwrap();
        machine.load_program(&[0x00, 0xE0]).unwrap();
        assert_eq!(machine.state.pc, 0x200);
        assert_eq!(machine.state.v[0x1], 0x0);
    }

    #[test]
    fn test_timers_floor_at_zero() {
        let mut machine = Machine::new();
        machine.state.delay_timer = 5;
        for _ in 0..61 {
            machine.tick_timers();
        }
        assert_eq!(machine.state.delay_timer, 0);
    }

    #[test]
    fn test_sound_cue_follows_sound_timer() {
        let mut machine = Machine::new();
        assert!(!machine.sound_active());
        machine.state.sound_timer = 2;
        assert!(machine.sound_active());
        machine.tick_timers();
        machine.tick_timers();
        assert!(!machine.sound_active());
    }

    #[test]
    fn test_call_then_return_round_trip() {
        // 0x200: CALL 0x204; 0x202: (landing pad); 0x204: RET
        let mut machine = loaded(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]);
        let stack_before = machine.state.stack;
        machine.step().unwrap();
        assert_eq!(machine.state.pc, 0x204);
        machine.step().unwrap();
        assert_eq!(machine.state.pc, 0x202);
        assert_eq!(machine.state.sp, 0);
        assert_eq!(machine.state.stack[1..], stack_before[1..]);
    }

    #[test]
    fn test_return_past_the_bottom_of_the_stack() {
        let mut machine = loaded(&[0x00, 0xEE]);
        assert_eq!(machine.step().unwrap_err(), Error::StackUnderflow);
        // the failed step left everything as it was
        assert_eq!(machine.state.pc, 0x200);
    }

    #[test]
    fn test_call_past_the_top_of_the_stack() {
        // CALL 0x200 forever: recurses into itself until the stack fills
        let mut machine = loaded(&[0x22, 0x00]);
        for _ in 0..16 {
            assert_eq!(machine.step().unwrap(), Step::Executed);
        }
        assert_eq!(machine.step().unwrap_err(), Error::StackOverflow);
    }

    #[test]
    fn test_glyph_address_then_bcd() {
        // V1 = 7; I = glyph(7); BCD of V1 at I
        let mut machine = loaded(&[0x61, 0x07, 0xF1, 0x29, 0xF1, 0x33]);
        for _ in 0..3 {
            machine.step().unwrap();
        }
        assert_eq!(machine.state.i, 35);
        assert_eq!(machine.state.memory[35..38], [0, 0, 7]);
    }

    #[test]
    fn test_add_program_end_to_end() {
        // CLS; V0 = 10; V1 = 5; V0 += V1; JP 0x200
        let mut machine = loaded(&[0x00, 0xE0, 0x60, 0x0A, 0x61, 0x05, 0x80, 0x14, 0x12, 0x00]);
        for _ in 0..4 {
            machine.step().unwrap();
        }
        assert_eq!(machine.state.v[0x0], 15);
        assert_eq!(machine.state.v[0xF], 0);
        machine.step().unwrap();
        assert_eq!(machine.state.pc, 0x200);
    }

    #[test]
    fn test_frame_is_draw_flag_gated() {
        let mut machine = loaded(&[0x00, 0xE0]);
        assert!(machine.frame().is_none());
        machine.step().unwrap();
        assert!(machine.frame().is_some());
        assert!(machine.frame().is_none());
    }

    #[test]
    fn test_key_state_reaches_skip_instructions() {
        // SKP V0 with V0 = 0: skips only while key 0 is held
        let mut machine = loaded(&[0xE0, 0x9E]);
        machine.set_key(0x0, true);
        machine.step().unwrap();
        assert_eq!(machine.state.pc, 0x204);

        machine.load_program(&[0xE0, 0x9E]).unwrap();
        machine.set_key(0x0, true);
        machine.set_key(0x0, false);
        machine.step().unwrap();
        assert_eq!(machine.state.pc, 0x202);
    }

    #[test]
    fn test_fetch_at_the_end_of_memory() {
        let mut machine = loaded(&[]);
        machine.state.pc = 0xFFF;
        assert_eq!(
            machine.step().unwrap_err(),
            Error::AddressOutOfRange { address: 0x1000 }
        );
    }
}
