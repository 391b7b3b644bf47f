//! Every operation receives a `State` whose pc has already been advanced
//! past the instruction word, so jumps and calls overwrite pc and skips add
//! a further 2. Each returns a whole new `State`; the executor commits it
//! only on `Ok`, so a failed step mutates nothing.

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, MEMORY_SIZE, STACK_DEPTH};
use crate::error::Error;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::state::State;

/// Resolve the byte range `[i, i + len)`, wrapping `i` to 12 bits first.
/// Ranged accesses are the only ones that can run off the end of memory.
fn mem_range(i: u16, len: usize) -> Result<std::ops::Range<usize>, Error> {
    let start = (i & 0x0FFF) as usize;
    let end = start + len;
    if end > MEMORY_SIZE {
        Err(Error::AddressOutOfRange { address: end - 1 })
    } else {
        Ok(start..end)
    }
}

/// clear the frame buffer
pub fn clr(_op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        frame_buffer: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop()
pub fn rts(_op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    if state.sp == 0 {
        return Err(Error::StackUnderflow);
    }
    let sp = state.sp - 1;
    Ok(State {
        pc: state.stack[sp as usize],
        sp,
        ..*state
    })
}

/// PC = nnn
pub fn jump(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        pc: op.nnn(),
        ..*state
    })
}

/// STACK.push(PC); PC = nnn
pub fn call(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    if state.sp as usize == STACK_DEPTH {
        return Err(Error::StackOverflow);
    }
    let mut stack = state.stack;
    // pc is already past the call, i.e. the return address
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: op.nnn(),
        sp: state.sp + 1,
        stack,
        ..*state
    })
}

/// if Vx == nn then pc += 2
pub fn ske(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] == op.nn() {
        state.pc.wrapping_add(0x2)
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// if Vx != nn then pc += 2
pub fn skne(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] != op.nn() {
        state.pc.wrapping_add(0x2)
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] == state.v[op.y() as usize] {
        state.pc.wrapping_add(0x2)
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// Vx = nn
pub fn load(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = op.nn();
    Ok(State { v, ..*state })
}

/// Vx += nn
/// Add nn to Vx; allow for overflow but implicitly drop it. No flag.
pub fn add(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.x() as usize].wrapping_add(op.nn());
    Ok(State { v, ..*state })
}

/// Vx = Vy
pub fn mv(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// Vx |= Vy
pub fn or(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] |= v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// Vx &= Vy
pub fn and(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] &= v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// Vx ^= Vy
pub fn xor(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] ^= v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// Vx += Vy; VF = carry
pub fn addr(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let (res, over) = state.v[op.x() as usize].overflowing_add(state.v[op.y() as usize]);
    let mut v = state.v;
    v[0xF] = u8::from(over);
    v[op.x() as usize] = res;
    Ok(State { v, ..*state })
}

/// Vx -= Vy; VF = no borrow
/// The flag compares the operands before subtracting: 1 iff Vx > Vy, so
/// equal operands clear it.
pub fn sub(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[0xF] = u8::from(state.v[op.x() as usize] > state.v[op.y() as usize]);
    v[op.x() as usize] = state.v[op.x() as usize].wrapping_sub(state.v[op.y() as usize]);
    Ok(State { v, ..*state })
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[0xF] = v[op.x() as usize] & 0x1;
    v[op.x() as usize] >>= 1;
    Ok(State { v, ..*state })
}

/// Vx = Vy - Vx; VF = no borrow (1 iff Vy > Vx)
pub fn subn(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[0xF] = u8::from(state.v[op.y() as usize] > state.v[op.x() as usize]);
    v[op.x() as usize] = state.v[op.y() as usize].wrapping_sub(state.v[op.x() as usize]);
    Ok(State { v, ..*state })
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[0xF] = v[op.x() as usize] >> 7 & 0x1;
    v[op.x() as usize] <<= 1;
    Ok(State { v, ..*state })
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let pc = if state.v[op.x() as usize] != state.v[op.y() as usize] {
        state.pc.wrapping_add(0x2)
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// I = nnn
pub fn loadi(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        i: op.nnn(),
        ..*state
    })
}

/// PC = V0 + nnn
pub fn jumpi(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        pc: op.nnn().wrapping_add(u16::from(state.v[0x0])),
        ..*state
    })
}

/// Vx = rand_byte & nn
pub fn rand(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let rand_byte: u8 = rand::random();
    let mut v = state.v;
    v[op.x() as usize] = rand_byte & op.nn();
    Ok(State { v, ..*state })
}

/// draw_sprite(x=Vx y=Vy rows=n)
/// XORs the n-row sprite at I onto the frame buffer at (Vx, Vy), wrapping
/// both coordinates. VF reports whether the most recent pixel write erased
/// a set pixel; earlier collisions in the same sprite are overwritten.
pub fn draw(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;
    let rows = mem_range(state.i, op.n() as usize)?;

    for (row, &byte) in state.memory[rows].iter().enumerate() {
        let y = (state.v[op.y() as usize] as usize + row) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            let x = (state.v[op.x() as usize] as usize + bit) % DISPLAY_WIDTH;
            let sprite_bit = byte >> (7 - bit) & 1 == 1;
            let was_set = frame_buffer[y][x];
            frame_buffer[y][x] = was_set ^ sprite_bit;
            v[0xF] = u8::from(was_set && !frame_buffer[y][x]);
        }
    }

    Ok(State {
        v,
        frame_buffer,
        draw_flag: true,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &dyn Opcode, state: &State, keypad: &Keypad) -> Result<State, Error> {
    let pc = if keypad.is_pressed(state.v[op.x() as usize]) {
        state.pc.wrapping_add(0x2)
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &dyn Opcode, state: &State, keypad: &Keypad) -> Result<State, Error> {
    let pc = if keypad.is_pressed(state.v[op.x() as usize]) {
        state.pc
    } else {
        state.pc.wrapping_add(0x2)
    };
    Ok(State { pc, ..*state })
}

/// Vx = DT
pub fn moved(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let mut v = state.v;
    v[op.x() as usize] = state.delay_timer;
    Ok(State { v, ..*state })
}

/// DT = Vx
pub fn loads(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        delay_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// ST = Vx
pub fn ld(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        sound_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// I += Vx; no flag
pub fn addi(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        i: state.i.wrapping_add(u16::from(state.v[op.x() as usize])),
        ..*state
    })
}

/// I = Vx * 5
/// Point I at the glyph sprite for Vx; see constants::SPRITE_SHEET.
pub fn ldspr(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    Ok(State {
        i: u16::from(state.v[op.x() as usize]) * 5,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
/// Store the hundreds, tens, and ones digits of Vx starting at I.
pub fn bcd(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let digits = [
        state.v[op.x() as usize] / 100,
        state.v[op.x() as usize] / 10 % 10,
        state.v[op.x() as usize] % 10,
    ];
    let range = mem_range(state.i, 3)?;
    let mut memory = state.memory;
    memory[range].copy_from_slice(&digits);
    Ok(State { memory, ..*state })
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let range = mem_range(state.i, op.x() as usize + 1)?;
    let mut memory = state.memory;
    memory[range].copy_from_slice(&state.v[0..=op.x() as usize]);
    Ok(State { memory, ..*state })
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(op: &dyn Opcode, state: &State, _keypad: &Keypad) -> Result<State, Error> {
    let range = mem_range(state.i, op.x() as usize + 1)?;
    let mut v = state.v;
    v[0..=op.x() as usize].copy_from_slice(&state.memory[range]);
    Ok(State { v, ..*state })
}

#[cfg(test)]
mod test_operations {
    use super::*;

    // Exhaustive flag truth tables for the carry/borrow arithmetic.

    #[test]
    fn test_addr_flag_for_all_operands() {
        for a in 0..=255u16 {
            for b in 0..=255u16 {
                let mut state = State::new();
                state.v[0x1] = a as u8;
                state.v[0x2] = b as u8;
                let state = addr(&0x8124u16, &state, &Keypad::new()).unwrap();
                assert_eq!(state.v[0x1], (a + b) as u8);
                assert_eq!(state.v[0xF], u8::from(a + b > 255));
            }
        }
    }

    #[test]
    fn test_sub_flag_for_all_operands() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let mut state = State::new();
                state.v[0x1] = a;
                state.v[0x2] = b;
                let state = sub(&0x8125u16, &state, &Keypad::new()).unwrap();
                assert_eq!(state.v[0x1], a.wrapping_sub(b));
                assert_eq!(state.v[0xF], u8::from(a > b));
            }
        }
    }

    #[test]
    fn test_sub_equal_operands_clear_flag() {
        let mut state = State::new();
        state.v[0x1] = 0x42;
        state.v[0x2] = 0x42;
        state.v[0xF] = 0x1;
        let state = sub(&0x8125u16, &state, &Keypad::new()).unwrap();
        assert_eq!(state.v[0x1], 0x0);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_flag_register_as_x_operand() {
        // VF is both destination and flag; the stored sum wins, computed
        // from the operands as they were before the flag write
        let mut state = State::new();
        state.v[0xF] = 0x10;
        state.v[0x2] = 0x2;
        let state = addr(&0x8F24u16, &state, &Keypad::new()).unwrap();
        assert_eq!(state.v[0xF], 0x12);
    }

    #[test]
    fn test_mem_range_in_bounds() {
        assert_eq!(mem_range(0xFFD, 3).unwrap(), 0xFFD..0x1000);
    }

    #[test]
    fn test_mem_range_wraps_address_to_12_bits() {
        assert_eq!(mem_range(0x1200, 3).unwrap(), 0x200..0x203);
    }

    #[test]
    fn test_mem_range_past_end_of_memory() {
        assert_eq!(
            mem_range(0xFFE, 3),
            Err(Error::AddressOutOfRange { address: 0x1000 })
        );
    }

    #[test]
    fn test_draw_twice_restores_frame_buffer() {
        let mut state = State::new();
        state.v[0x0] = 0x3;
        let op = 0xD005u16;
        let drawn = draw(&op, &state, &Keypad::new()).unwrap();
        assert!(drawn.frame_buffer.iter().flatten().any(|&px| px));
        let restored = draw(&op, &drawn, &Keypad::new()).unwrap();
        assert!(restored.frame_buffer.iter().flatten().all(|&px| !px));
    }

    #[test]
    fn test_draw_rows_past_end_of_memory() {
        let mut state = State::new();
        state.i = 0xFFE;
        assert_eq!(
            draw(&0xD005u16, &state, &Keypad::new()),
            Err(Error::AddressOutOfRange { address: 0x1002 })
        );
    }
}
