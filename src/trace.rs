//! Output sinks for the lexer's token trace, the parser's derivation and
//! warnings.
//!
//! The front-end never prints on its own. Everything it wants to show goes
//! through [`TraceSink::emit`], so the same pass can run silently, log to a
//! terminal, or be captured for inspection.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use colored::{Color, Colorize};

pub trait TraceSink {
    /// Write `text` followed by `end`. `flush` asks for the output to become
    /// visible right away.
    fn emit(&mut self, text: &str, end: &str, flush: bool);

    fn line(&mut self, text: &str) {
        self.emit(text, "\n", false);
    }
}

impl<F> TraceSink for F
where
    F: FnMut(&str, &str, bool),
{
    fn emit(&mut self, text: &str, end: &str, flush: bool) {
        self(text, end, flush)
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl TraceSink for Silent {
    fn emit(&mut self, _text: &str, _end: &str, _flush: bool) {}
}

/// Writes to stderr, optionally tinted.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stderr {
    color: Option<Color>,
    dimmed: bool,
}

impl Stderr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colored(color: Color) -> Self {
        Self {
            color: Some(color),
            dimmed: false,
        }
    }

    pub fn dimmed() -> Self {
        Self {
            color: None,
            dimmed: true,
        }
    }
}

impl TraceSink for Stderr {
    fn emit(&mut self, text: &str, end: &str, flush: bool) {
        let mut styled = match self.color {
            Some(color) => text.color(color),
            None => text.normal(),
        };
        if self.dimmed {
            styled = styled.dimmed();
        }
        eprint!("{}{}", styled, end);
        if flush {
            let _ = std::io::stderr().flush();
        }
    }
}

/// Collects everything into a shared buffer. Clones share the buffer, so one
/// clone can be handed to the lexer or parser and the other kept to read the
/// result back.
#[derive(Debug, Default, Clone)]
pub struct Recorder(Rc<RefCell<String>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl TraceSink for Recorder {
    fn emit(&mut self, text: &str, end: &str, _flush: bool) {
        let mut buf = self.0.borrow_mut();
        buf.push_str(text);
        buf.push_str(end);
    }
}
