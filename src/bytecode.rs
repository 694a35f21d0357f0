//! Bytecode representation

use std::{fs, path::Path};

use crate::{
    error::{Fault, LoadError},
    opcode::Opcode,
};

/// A single memory cell. Stored values never exceed [`MAX_VALUE`].
pub type Word = u16;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = 32768;
/// Number of general registers.
pub const REGISTER_COUNT: usize = 8;
/// Arithmetic is carried out modulo this value.
pub const MODULUS: u32 = 32768;
/// Largest literal value, also the 15-bit mask.
pub const MAX_VALUE: Word = 32767;

const REGISTER_BASE: Word = 32768;
const REGISTER_LAST: Word = REGISTER_BASE + REGISTER_COUNT as Word - 1;

/// A program image: the words memory starts out with.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Bytecode {
    words: Vec<Word>,
}

impl Bytecode {
    /// Decode a little-endian byte stream into words.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.len() % 2 != 0 {
            return Err(LoadError::OddLength(bytes.len()));
        }

        let words: Vec<Word> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Self::from_words(words)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bytes = fs::read(path)?;
        Self::from_le_bytes(&bytes)
    }

    pub fn from_words(words: Vec<Word>) -> Result<Self, LoadError> {
        if words.len() > MEMORY_SIZE {
            return Err(LoadError::TooLarge(words.len()));
        }

        Ok(Bytecode { words })
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Where a source operand takes its value from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Operand {
    Literal(Word),
    Register(usize),
}

impl Operand {
    /// Classify a raw operand word. Words past the register range are invalid.
    pub fn decode(word: Word, pc: Word) -> Result<Self, Fault> {
        match word {
            0..=MAX_VALUE => Ok(Operand::Literal(word)),
            REGISTER_BASE..=REGISTER_LAST => Ok(Operand::Register((word - REGISTER_BASE) as usize)),
            _ => Err(Fault::InvalidOperand { value: word, pc }),
        }
    }
}

/// Where a destination operand stores its result.
///
/// Destinations are never read-resolved: a literal word is taken as a
/// memory address directly.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Target {
    Register(usize),
    Memory(usize),
}

impl Target {
    pub fn decode(word: Word, pc: Word) -> Result<Self, Fault> {
        match Operand::decode(word, pc)? {
            Operand::Literal(address) => Ok(Target::Memory(address as usize)),
            Operand::Register(index) => Ok(Target::Register(index)),
        }
    }
}

/// An opcode together with the raw operand words that follow it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    operands: [Word; 3],
}

impl Instruction {
    /// Fetch the instruction starting at `pc`.
    pub fn fetch(memory: &[Word], pc: Word) -> Result<Self, Fault> {
        let start = pc as usize;
        let word = *memory.get(start).ok_or(Fault::AddressOutOfRange {
            address: start as u32,
            pc,
        })?;
        let opcode = Opcode::from_word(word).ok_or(Fault::UnknownOpcode { opcode: word, pc })?;

        let count = opcode.operand_count() as usize;
        let args = memory
            .get(start + 1..start + 1 + count)
            .ok_or(Fault::AddressOutOfRange {
                address: (start + count) as u32,
                pc,
            })?;

        let mut operands = [0; 3];
        operands[..count].copy_from_slice(args);

        Ok(Instruction { opcode, operands })
    }

    /// Raw operand words, as many as the opcode takes.
    pub fn operands(&self) -> &[Word] {
        &self.operands[..self.opcode.operand_count() as usize]
    }

    /// Words occupied by the opcode and its operands.
    pub fn size(&self) -> Word {
        1 + self.opcode.operand_count()
    }
}
