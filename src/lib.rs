//! A virtual machine for a 15-bit, 22-instruction register/stack architecture.
//!
//! # Example
//!
//! ```
//! use synacor::{console::BufferConsole, vm::Machine};
//!
//! // ADD r0 <- r1 + 72; OUT r0; OUT 'i'; HALT
//! let program = [9, 32768, 32769, 72, 19, 32768, 19, 105, 0];
//!
//! let mut vm = Machine::new(&program, BufferConsole::default());
//! vm.run().unwrap();
//!
//! assert_eq!(vm.console().output(), "Hi");
//! ```
//!
//! # Architecture
//!
//! - Memory: 32768 words, addressed 0..=32767.
//! - Registers: 8, all zero at start.
//! - Stack: unbounded, shared by data and return addresses.
//! - Values are 15 bits. Arithmetic wraps modulo 32768.
//!
//! Operand words are decoded as:
//!
//! | Word          | Meaning                        |
//! |---------------|--------------------------------|
//! | 0..=32767     | literal value                  |
//! | 32768..=32775 | register 0..=7                 |
//! | 32776..       | invalid, the machine faults    |
//!
//! # Instructions
//!
//! | Opcode | Instruction | Usage       | Brief   |
//! |--------|-------------|-------------|---------|
//! | 0      | Halt        | HALT        | Stop execution. |
//! | 1      | Set         | SET a b     | `a := b` |
//! | 2      | Push        | PUSH a      | Push `a` on the stack. |
//! | 3      | Pop         | POP a       | Pop into `a`. Faults on an empty stack. |
//! | 4      | Eq          | EQ a b c    | `a := 1` if `b == c`, else `0`. |
//! | 5      | Gt          | GT a b c    | `a := 1` if `b > c`, else `0`. |
//! | 6      | Jmp         | JMP a       | Jump to `a`. |
//! | 7      | Jt          | JT a b      | Jump to `b` if `a` is nonzero. |
//! | 8      | Jf          | JF a b      | Jump to `b` if `a` is zero. |
//! | 9      | Add         | ADD a b c   | `a := (b + c) mod 32768` |
//! | 10     | Mult        | MULT a b c  | `a := (b * c) mod 32768` |
//! | 11     | Mod         | MOD a b c   | `a := b mod c`. Faults when `c` is zero. |
//! | 12     | And         | AND a b c   | `a := b & c` |
//! | 13     | Or          | OR a b c    | `a := b \| c` |
//! | 14     | Not         | NOT a b     | `a := b ^ 32767` |
//! | 15     | Rmem        | RMEM a b    | `a := memory[b]` |
//! | 16     | Wmem        | WMEM a b    | `memory[a] := b` |
//! | 17     | Call        | CALL a      | Push the next address and jump to `a`. |
//! | 18     | Ret         | RET         | Pop an address and jump to it. Halts on an empty stack. |
//! | 19     | Out         | OUT a       | Print the character with code `a`. |
//! | 20     | In          | IN a        | Read a character into `a`, a whole line is buffered at a time. |
//! | 21     | Noop        | NOOP        | Do nothing. |
//!
//! Instructions that store a result take their destination as `a`. It names a
//! register, or when it is a literal, a memory address.

pub mod bytecode;
pub mod console;
pub mod error;
pub mod opcode;
pub mod stack;
pub mod vm;

pub use error::{Fault, LoadError};
pub use vm::{Machine, RunState};
