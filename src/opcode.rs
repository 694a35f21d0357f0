//! The fixed instruction table

use std::fmt;

/// Every opcode understood by the machine, numbered by its word value.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
#[repr(u16)]
pub enum Opcode {
    Halt = 0,
    Set,
    Push,
    Pop,
    Eq,
    Gt,
    Jmp,
    Jt,
    Jf,
    Add,
    Mult,
    Mod,
    And,
    Or,
    Not,
    Rmem,
    Wmem,
    Call,
    Ret,
    Out,
    In,
    Noop,
}

const OPCODES: [Opcode; 22] = [
    Opcode::Halt,
    Opcode::Set,
    Opcode::Push,
    Opcode::Pop,
    Opcode::Eq,
    Opcode::Gt,
    Opcode::Jmp,
    Opcode::Jt,
    Opcode::Jf,
    Opcode::Add,
    Opcode::Mult,
    Opcode::Mod,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Rmem,
    Opcode::Wmem,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Out,
    Opcode::In,
    Opcode::Noop,
];

const OPERAND_COUNTS: [u16; 22] = [0, 2, 1, 1, 3, 3, 1, 2, 2, 3, 3, 3, 3, 3, 2, 2, 2, 1, 0, 1, 1, 0];

const NAMES: [&str; 22] = [
    "HALT", "SET", "PUSH", "POP", "EQ", "GT", "JMP", "JT", "JF", "ADD", "MULT", "MOD", "AND", "OR",
    "NOT", "RMEM", "WMEM", "CALL", "RET", "OUT", "IN", "NOOP",
];

impl Opcode {
    /// Look up the opcode encoded by `word`, if there is one.
    pub fn from_word(word: u16) -> Option<Self> {
        OPCODES.get(word as usize).copied()
    }

    /// Number of operand words following the opcode in memory.
    pub fn operand_count(self) -> u16 {
        OPERAND_COUNTS[self as usize]
    }

    pub fn name(self) -> &'static str {
        NAMES[self as usize]
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_dense() {
        for word in 0..22u16 {
            let op = Opcode::from_word(word).unwrap();
            assert_eq!(op as u16, word);
        }
        assert_eq!(Opcode::from_word(22), None);
        assert_eq!(Opcode::from_word(u16::MAX), None);
    }

    #[test]
    fn operand_counts() {
        assert_eq!(Opcode::Halt.operand_count(), 0);
        assert_eq!(Opcode::Set.operand_count(), 2);
        assert_eq!(Opcode::Eq.operand_count(), 3);
        assert_eq!(Opcode::Jt.operand_count(), 2);
        assert_eq!(Opcode::Not.operand_count(), 2);
        assert_eq!(Opcode::Call.operand_count(), 1);
        assert_eq!(Opcode::Ret.operand_count(), 0);
        assert_eq!(Opcode::In.operand_count(), 1);
        assert_eq!(Opcode::Noop.operand_count(), 0);
    }

    #[test]
    fn names() {
        assert_eq!(Opcode::Mult.to_string(), "MULT");
        assert_eq!(Opcode::Wmem.name(), "WMEM");
    }
}
