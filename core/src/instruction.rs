use crate::error::Error;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A single machine operation over a fetched state.
pub type Operation = fn(op: &dyn Opcode, state: &State, keypad: &Keypad) -> Result<State, Error>;

/// Selects the Operation for a given Opcode.
///
/// Returns `None` for words outside the instruction table; the executor
/// runs those as a no-op and reports them, rather than failing.
pub fn from_op(op: &dyn Opcode) -> Option<Operation> {
    match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => Some(clr),
        (0x0, 0x0, 0xE, 0xE) => Some(rts),
        (0x1, ..) => Some(jump),
        (0x2, ..) => Some(call),
        (0x3, ..) => Some(ske),
        (0x4, ..) => Some(skne),
        (0x5, .., 0x0) => Some(skre),
        (0x6, ..) => Some(load),
        (0x7, ..) => Some(add),
        (0x8, .., 0x0) => Some(mv),
        (0x8, .., 0x1) => Some(or),
        (0x8, .., 0x2) => Some(and),
        (0x8, .., 0x3) => Some(xor),
        (0x8, .., 0x4) => Some(addr),
        (0x8, .., 0x5) => Some(sub),
        (0x8, .., 0x6) => Some(shr),
        (0x8, .., 0x7) => Some(subn),
        (0x8, .., 0xE) => Some(shl),
        (0x9, .., 0x0) => Some(skrne),
        (0xA, ..) => Some(loadi),
        (0xB, ..) => Some(jumpi),
        (0xC, ..) => Some(rand),
        (0xD, ..) => Some(draw),
        (0xE, .., 0x9, 0xE) => Some(skpr),
        (0xE, .., 0xA, 0x1) => Some(skup),
        (0xF, .., 0x0, 0x7) => Some(moved),
        (0xF, .., 0x1, 0x5) => Some(loads),
        (0xF, .., 0x1, 0x8) => Some(ld),
        (0xF, .., 0x1, 0xE) => Some(addi),
        (0xF, .., 0x2, 0x9) => Some(ldspr),
        (0xF, .., 0x3, 0x3) => Some(bcd),
        (0xF, .., 0x5, 0x5) => Some(stor),
        (0xF, .., 0x6, 0x5) => Some(read),
        _ => None,
    }
}
