//! Character I/O between the machine and the outside world

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

/// Line-buffered character source and unbuffered character sink.
///
/// `read_line` follows [`BufRead::read_until`] with `b'\n'`: the raw bytes
/// of the line are appended to `buf` including the terminator, and `Ok(0)`
/// means the input is exhausted. Bytes are not decoded, matching output which
/// writes the low byte of a value as a Latin-1 character.
pub trait Console {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
    fn write_char(&mut self, ch: char) -> io::Result<()>;
}

/// The process terminal.
pub struct StdConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        StdConsole {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        // Anything printed so far is usually a prompt.
        self.stdout.flush()?;
        self.stdin.lock().read_until(b'\n', buf)
    }

    fn write_char(&mut self, ch: char) -> io::Result<()> {
        let mut utf8 = [0; 4];
        let mut out = self.stdout.lock();
        out.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
        if ch == '\n' {
            out.flush()?;
        }
        Ok(())
    }
}

/// In-memory console: fixed input text, captured output.
#[derive(Debug, Default)]
pub struct BufferConsole {
    input: io::Cursor<Vec<u8>>,
    output: String,
}

impl BufferConsole {
    pub fn new(input: &str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Input given as raw bytes, which need not be valid UTF-8.
    pub fn from_bytes(input: &[u8]) -> Self {
        BufferConsole {
            input: io::Cursor::new(input.to_vec()),
            output: String::new(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Console for BufferConsole {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.input.read_until(b'\n', buf)
    }

    fn write_char(&mut self, ch: char) -> io::Result<()> {
        self.output.push(ch);
        Ok(())
    }
}

/// Replays a transcript of input lines before handing over to `inner`.
///
/// Replayed lines are echoed to `inner` so the session reads as if typed.
pub struct ScriptedConsole<C> {
    script: VecDeque<String>,
    inner: C,
}

impl<C: Console> ScriptedConsole<C> {
    pub fn new(transcript: &str, inner: C) -> Self {
        let script = transcript
            .split_inclusive('\n')
            .map(|line| {
                let mut line = line.to_string();
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                line
            })
            .collect();

        ScriptedConsole { script, inner }
    }

    /// Lines not yet replayed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Console> Console for ScriptedConsole<C> {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        match self.script.pop_front() {
            Some(line) => {
                for ch in line.chars() {
                    self.inner.write_char(ch)?;
                }
                buf.extend_from_slice(line.as_bytes());
                Ok(line.len())
            }
            None => self.inner.read_line(buf),
        }
    }

    fn write_char(&mut self, ch: char) -> io::Result<()> {
        self.inner.write_char(ch)
    }
}
