//! Faults raised while loading or executing a program

use std::io;

use thiserror::Error;

/// A fatal condition that moves the machine into the errored state.
///
/// `pc` is always the address of the instruction that raised the fault.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Fault {
    #[error("invalid operand {value} at pc {pc}")]
    InvalidOperand { value: u16, pc: u16 },

    #[error("unknown opcode {opcode} at pc {pc}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("pop from an empty stack at pc {pc}")]
    StackUnderflow { pc: u16 },

    #[error("division by zero at pc {pc}")]
    DivisionByZero { pc: u16 },

    /// Instruction fetch ran off the end of memory.
    #[error("address {address} is outside memory at pc {pc}")]
    AddressOutOfRange { address: u32, pc: u16 },

    #[error("input closed while reading at pc {pc}")]
    InputClosed { pc: u16 },

    #[error("console I/O failed at pc {pc}: {kind}")]
    Io { kind: io::ErrorKind, pc: u16 },
}

/// Errors turning raw bytes into a memory image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program image has an odd number of bytes ({0})")]
    OddLength(usize),

    #[error("program image is {0} words, memory holds 32768")]
    TooLarge(usize),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
