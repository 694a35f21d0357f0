//! Virtual machine that runs the bytecode

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::{
    bytecode::{
        Bytecode, Instruction, Operand, Target, Word, MAX_VALUE, MEMORY_SIZE, MODULUS,
        REGISTER_COUNT,
    },
    console::Console,
    error::Fault,
    opcode::Opcode,
    stack::Stack,
};

/// Coarse lifecycle of a machine. Both `Halted` and `Errored` are final.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RunState {
    Running,
    Halted,
    Errored(Fault),
}

/// What to do with the program counter once an instruction completed.
enum Flow {
    Next(Word),
    Jump(Word),
    Halt,
}

/// Machine representation
pub struct Machine<C> {
    memory: Box<[Word]>,
    registers: [Word; REGISTER_COUNT],
    stack: Stack,
    pc: Word,
    state: RunState,
    pending_input: VecDeque<Word>, // characters of the current input line not read yet
    console: C,
    steps: u64,
}

impl<C: Console> Machine<C> {
    /// Create a machine whose memory starts with `image`, zero-padded.
    pub fn new(image: &[Word], console: C) -> Self {
        let mut memory = vec![0; MEMORY_SIZE].into_boxed_slice();
        if image.len() > MEMORY_SIZE {
            warn!(words = image.len(), "program image truncated to memory size");
        }
        let len = image.len().min(MEMORY_SIZE);
        memory[..len].copy_from_slice(&image[..len]);

        debug!(words = len, "machine loaded");

        Machine {
            memory,
            registers: [0; REGISTER_COUNT],
            stack: Stack::new(),
            pc: 0,
            state: RunState::Running,
            pending_input: VecDeque::new(),
            console,
            steps: 0,
        }
    }

    pub fn from_bytecode(bytecode: &Bytecode, console: C) -> Self {
        Self::new(bytecode.words(), console)
    }

    /// Step until the machine halts or faults.
    pub fn run(&mut self) -> Result<(), Fault> {
        while self.is_running() {
            self.step()?;
        }

        match &self.state {
            RunState::Errored(fault) => Err(fault.clone()),
            _ => Ok(()),
        }
    }

    /// Execute exactly one instruction.
    ///
    /// A faulting instruction has no effect besides moving the machine into
    /// [`RunState::Errored`]. Stepping a halted machine does nothing, and
    /// stepping an errored one reports the same fault again.
    pub fn step(&mut self) -> Result<(), Fault> {
        match &self.state {
            RunState::Running => {}
            RunState::Halted => return Ok(()),
            RunState::Errored(fault) => return Err(fault.clone()),
        }

        let pc = self.pc;
        match self.execute(pc) {
            Ok(flow) => {
                self.steps += 1;
                match flow {
                    Flow::Next(size) => self.pc = pc + size,
                    Flow::Jump(target) => self.pc = target,
                    Flow::Halt => {
                        debug!(pc, steps = self.steps, "machine halted");
                        self.state = RunState::Halted;
                    }
                }
                Ok(())
            }
            Err(fault) => {
                warn!(%fault, steps = self.steps, "machine faulted");
                self.state = RunState::Errored(fault.clone());
                Err(fault)
            }
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn pc(&self) -> Word {
        self.pc
    }

    /// Contents of register `index`, `None` past the last register.
    pub fn register(&self, index: usize) -> Option<Word> {
        self.registers.get(index).copied()
    }

    pub fn registers(&self) -> &[Word; REGISTER_COUNT] {
        &self.registers
    }

    pub fn memory(&self) -> &[Word] {
        &self.memory
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Number of instructions completed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    fn execute(&mut self, pc: Word) -> Result<Flow, Fault> {
        let instruction = Instruction::fetch(&self.memory, pc)?;
        let args = instruction.operands();
        let next = Flow::Next(instruction.size());

        match instruction.opcode {
            Opcode::Halt => return Ok(Flow::Halt),
            Opcode::Set => self.ins_set(args, pc)?,
            Opcode::Push => self.ins_push(args, pc)?,
            Opcode::Pop => self.ins_pop(args, pc)?,
            Opcode::Eq => self.ins_binary(args, pc, |b, c| Ok((b == c) as u32))?,
            Opcode::Gt => self.ins_binary(args, pc, |b, c| Ok((b > c) as u32))?,
            Opcode::Jmp => return Ok(Flow::Jump(self.read(args[0], pc)?)),
            Opcode::Jt => return self.ins_branch(args, pc, next, |cond| cond != 0),
            Opcode::Jf => return self.ins_branch(args, pc, next, |cond| cond == 0),
            Opcode::Add => self.ins_binary(args, pc, |b, c| Ok((b + c) % MODULUS))?,
            Opcode::Mult => self.ins_binary(args, pc, |b, c| Ok((b * c) % MODULUS))?,
            Opcode::Mod => self.ins_binary(args, pc, |b, c| {
                b.checked_rem(c).ok_or(Fault::DivisionByZero { pc })
            })?,
            Opcode::And => self.ins_binary(args, pc, |b, c| Ok(b & c))?,
            Opcode::Or => self.ins_binary(args, pc, |b, c| Ok(b | c))?,
            Opcode::Not => self.ins_not(args, pc)?,
            Opcode::Rmem => self.ins_rmem(args, pc)?,
            Opcode::Wmem => self.ins_wmem(args, pc)?,
            Opcode::Call => return self.ins_call(args, pc, instruction.size()),
            Opcode::Ret => return Ok(self.ins_ret()),
            Opcode::Out => self.ins_out(args, pc)?,
            Opcode::In => self.ins_in(args, pc)?,
            Opcode::Noop => {}
        }

        Ok(next)
    }

    /// Resolve a source operand to its value.
    fn read(&self, word: Word, pc: Word) -> Result<Word, Fault> {
        match Operand::decode(word, pc)? {
            Operand::Literal(value) => Ok(value),
            Operand::Register(index) => Ok(self.registers[index]),
        }
    }

    fn store(&mut self, target: Target, value: Word) {
        match target {
            Target::Register(index) => self.registers[index] = value,
            Target::Memory(address) => self.memory[address] = value,
        }
    }

    /// a := b
    fn ins_set(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        let dest = Target::decode(args[0], pc)?;
        let value = self.read(args[1], pc)?;
        self.store(dest, value);
        Ok(())
    }

    fn ins_push(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        let value = self.read(args[0], pc)?;
        self.stack.push(value);
        Ok(())
    }

    /// Underflow is reported before the destination is decoded.
    fn ins_pop(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        if self.stack.is_empty() {
            return Err(Fault::StackUnderflow { pc });
        }
        let dest = Target::decode(args[0], pc)?;
        let value = self.stack.pop().ok_or(Fault::StackUnderflow { pc })?;
        self.store(dest, value);
        Ok(())
    }

    /// a := op(b, c), for every three-operand instruction
    fn ins_binary<F>(&mut self, args: &[Word], pc: Word, op: F) -> Result<(), Fault>
    where
        F: FnOnce(u32, u32) -> Result<u32, Fault>,
    {
        let dest = Target::decode(args[0], pc)?;
        let b = self.read(args[1], pc)? as u32;
        let c = self.read(args[2], pc)? as u32;
        let value = op(b, c)?;
        self.store(dest, value as Word);
        Ok(())
    }

    fn ins_branch<F>(&self, args: &[Word], pc: Word, next: Flow, taken: F) -> Result<Flow, Fault>
    where
        F: FnOnce(Word) -> bool,
    {
        let cond = self.read(args[0], pc)?;

        // The target is only resolved when the branch is taken.
        if taken(cond) {
            Ok(Flow::Jump(self.read(args[1], pc)?))
        } else {
            Ok(next)
        }
    }

    fn ins_not(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        let dest = Target::decode(args[0], pc)?;
        let value = self.read(args[1], pc)?;
        self.store(dest, value ^ MAX_VALUE);
        Ok(())
    }

    /// a := memory[b]
    fn ins_rmem(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        let dest = Target::decode(args[0], pc)?;
        let address = self.read(args[1], pc)?;
        let value = self.memory[address as usize];
        self.store(dest, value);
        Ok(())
    }

    /// memory[a] := b
    fn ins_wmem(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        let address = self.read(args[0], pc)?;
        let value = self.read(args[1], pc)?;
        self.memory[address as usize] = value;
        Ok(())
    }

    fn ins_call(&mut self, args: &[Word], pc: Word, size: Word) -> Result<Flow, Fault> {
        let target = self.read(args[0], pc)?;
        self.stack.push(pc + size);
        Ok(Flow::Jump(target))
    }

    /// Return to the address on top of the stack. An empty stack ends the program.
    fn ins_ret(&mut self) -> Flow {
        match self.stack.pop() {
            Some(address) => Flow::Jump(address),
            None => Flow::Halt,
        }
    }

    fn ins_out(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        let value = self.read(args[0], pc)?;
        self.console
            .write_char(char::from(value as u8))
            .map_err(|err| Fault::Io { kind: err.kind(), pc })
    }

    fn ins_in(&mut self, args: &[Word], pc: Word) -> Result<(), Fault> {
        let dest = Target::decode(args[0], pc)?;

        if self.pending_input.is_empty() {
            self.fill_input(pc)?;
        }

        let value = self
            .pending_input
            .pop_front()
            .ok_or(Fault::InputClosed { pc })?;
        self.store(dest, value);
        Ok(())
    }

    /// Buffer the next line of input, terminator included, one value per byte.
    fn fill_input(&mut self, pc: Word) -> Result<(), Fault> {
        let mut line = Vec::new();
        let read = self
            .console
            .read_line(&mut line)
            .map_err(|err| Fault::Io { kind: err.kind(), pc })?;

        if read == 0 {
            return Err(Fault::InputClosed { pc });
        }

        self.pending_input.extend(line.iter().map(|&byte| Word::from(byte)));
        debug!(bytes = self.pending_input.len(), "buffered input line");

        Ok(())
    }
}
