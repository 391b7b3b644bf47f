pub use error::Error;
pub use machine::{Machine, Step};

pub mod constants;
mod error;
mod instruction;
mod keypad;
mod machine;
mod opcode;
mod operations;
pub mod state;
