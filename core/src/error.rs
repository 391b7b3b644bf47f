use thiserror::Error;

/// Failures the core signals instead of silently corrupting memory.
///
/// Every failure is terminal to the step or load that produced it; the
/// machine state is left exactly as it was beforehand and the caller
/// decides whether to halt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The program would overrun the address space above 0x200.
    #[error("program is {size} bytes but at most 3584 fit above 0x200")]
    ProgramTooLarge { size: usize },

    /// A return was executed with an empty call stack.
    #[error("return with an empty call stack")]
    StackUnderflow,

    /// A call would nest deeper than the stack allows.
    #[error("call depth exceeds 16 frames")]
    StackOverflow,

    /// A multi-byte memory access runs past the end of the address space.
    #[error("memory access past the address space at {address:#05x}")]
    AddressOutOfRange { address: usize },
}
