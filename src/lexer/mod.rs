pub mod token;


use crate::source::CharSource;
use crate::trace::{Silent, TraceSink};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use token::{Keyword, Tag, Token};

macro_rules! hash_map {
    ( $( $key: expr => $value: expr ),* $(,)? ) => {{
        let mut m = HashMap::new();
        $(
            m.insert($key, $value);
        )*
        m
    }}
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Keyword> = hash_map! {
        "true"  => Keyword::True,
        "false" => Keyword::False,
        "var"   => Keyword::Var,
        "set"   => Keyword::Set,
        "print" => Keyword::Print,
    };
}

pub const TYPE_NAMES: [&str; 13] = [
    "int", "float", "double", "bool", "char", "str", "i8", "i16", "u16", "u32", "i64", "u64",
    "void",
];

const HASH_COMMENT_CLOSERS: [[char; 2]; 2] = [['>', '#'], ['#', '>']];
const SLASH_COMMENT_CLOSERS: [[char; 2]; 1] = [['*', '/']];

#[derive(Error, Debug)]
pub enum LexerErrorType {
    #[error("floating-point literal `{0}` is not supported")]
    UnsupportedFloat(String),

    #[error("integer literal `{0}` does not fit in 64 bits")]
    NumberOutOfRange(String),

    #[error("unterminated block comment opened with `{0}`")]
    UnterminatedComment(&'static str),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid escape {0:?}")]
    InvalidEscape(char),
}

#[derive(Error, Debug)]
#[error("LexerError at line {line}: {error}")]
pub struct LexerError {
    pub line: usize,
    #[source]
    pub error: LexerErrorType,
}

pub type LexerResult = Result<Token, LexerError>;

/// What the current trace line has shown so far. Decides whether a line
/// break ends a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineContext {
    Empty,
    Block,
    Expression,
}

pub struct Lexer {
    source: CharSource,
    peek: Option<char>,
    // line of `peek`
    line: usize,
    token_line: usize,
    context: LineContext,
    id_table: HashMap<String, Token>,
    trace: Box<dyn TraceSink>,
    started: bool,
    exhausted: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::from_source(CharSource::new(input))
    }

    pub fn from_source(source: CharSource) -> Self {
        Self {
            source,
            // stands in for the character before the input, skipped as blank
            peek: Some(' '),
            line: 1,
            token_line: 1,
            context: LineContext::Empty,
            id_table: seeded_id_table(),
            trace: Box::new(Silent),
            started: false,
            exhausted: false,
        }
    }

    pub fn with_trace(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = sink;
        self
    }

    /// Line on which the most recently returned token started.
    pub fn line(&self) -> usize {
        self.token_line
    }

    pub fn interned(&self, spelling: &str) -> Option<&Token> {
        self.id_table.get(spelling)
    }

    fn bump(&mut self) {
        if self.peek == Some('\n') {
            self.line += 1;
        }
        self.peek = self.source.next_char();
    }

    fn next_is(&self, c: char) -> bool {
        self.source.peek(0) == Some(c)
    }

    fn error(&self, error: LexerErrorType) -> LexerError {
        LexerError {
            line: self.token_line,
            error,
        }
    }

    fn continues_line(&self) -> bool {
        matches!(
            (self.source.peek(0), self.source.peek(1)),
            (Some('\n'), _) | (Some('\r'), Some('\n'))
        )
    }

    /// Handles a line break. A line that showed an expression is closed with
    /// a synthesized `;`.
    fn line_interrupt(&mut self, next_line: usize) -> Option<Token> {
        let token = match self.context {
            LineContext::Expression => {
                self.trace.emit("<;>", "\n", false);
                self.trace.emit(&format!("{:3}: ", next_line), "", true);
                Some(Token::Operator(';'))
            }
            LineContext::Block => {
                self.trace.emit(&format!("\n{:3}: ", next_line), "", true);
                None
            }
            LineContext::Empty => {
                self.trace.emit(&format!("\r{:3}: ", next_line), "", true);
                None
            }
        };
        self.context = LineContext::Empty;
        token
    }

    fn emit_expression(&mut self, token: Token) -> Token {
        self.trace.emit(&token.to_string(), " ", false);
        self.context = LineContext::Expression;
        token
    }

    fn operator(&mut self, c: char) -> Token {
        self.bump();
        let token = Token::Operator(c);
        self.trace.emit(&token.to_string(), " ", false);

        if self.context == LineContext::Expression {
            if c == ';' {
                self.trace.emit("\n", "\t", false);
            }
        } else if token.is_block_punct() {
            self.context = LineContext::Block;
        } else {
            self.context = LineContext::Expression;
        }
        token
    }

    fn skip_line_comment(&mut self) {
        while !matches!(self.peek, None | Some('\n')) {
            self.bump();
        }
    }

    /// Skips a nested block comment starting at `peek`. Returns whether it
    /// spanned a line break.
    fn skip_block_comment(
        &mut self,
        opener: &'static str,
        closers: &[[char; 2]],
    ) -> Result<bool, LexerError> {
        let mut open = opener.chars();
        let open = [open.next().unwrap_or_default(), open.next().unwrap_or_default()];

        self.bump();
        self.bump();

        let mut depth = 1usize;
        let mut had_newline = false;
        while depth > 0 {
            let next = self.source.peek(0);
            match self.peek {
                None => return Err(self.error(LexerErrorType::UnterminatedComment(opener))),
                Some(c) if closers.iter().any(|cl| cl[0] == c && Some(cl[1]) == next) => {
                    depth -= 1;
                    self.bump();
                    self.bump();
                }
                Some(c) if c == open[0] && Some(open[1]) == next => {
                    depth += 1;
                    self.bump();
                    self.bump();
                }
                Some(c) => {
                    had_newline |= c == '\n';
                    self.bump();
                }
            }
        }
        Ok(had_newline)
    }

    fn number(&mut self) -> LexerResult {
        let mut digits = String::new();
        while let Some(c) = self.peek.filter(char::is_ascii_digit) {
            digits.push(c);
            self.bump();
        }

        if self.peek == Some('.') {
            digits.push('.');
            self.bump();
            while let Some(c) = self.peek.filter(char::is_ascii_digit) {
                digits.push(c);
                self.bump();
            }
            return Err(self.error(LexerErrorType::UnsupportedFloat(digits)));
        }

        match digits.parse::<i64>() {
            Ok(value) => Ok(self.emit_expression(Token::Number(value))),
            Err(_) => Err(self.error(LexerErrorType::NumberOutOfRange(digits))),
        }
    }

    fn identifier(&mut self) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek.filter(|c| *c == '_' || c.is_alphanumeric()) {
            lexeme.push(c);
            self.bump();
        }

        let token = self
            .id_table
            .entry(lexeme)
            .or_insert_with_key(|name| Token::Identifier(Rc::from(name.as_str())))
            .clone();
        self.emit_expression(token)
    }

    fn string(&mut self) -> LexerResult {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek {
                None => return Err(self.error(LexerErrorType::UnterminatedString)),
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    let c = match self.peek {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(c) => return Err(self.error(LexerErrorType::InvalidEscape(c))),
                        None => return Err(self.error(LexerErrorType::UnterminatedString)),
                    };
                    value.push(c);
                    self.bump();
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        Ok(self.emit_expression(Token::Str(value)))
    }
}

impl Lexer {
    pub fn next_token(&mut self) -> LexerResult {
        if !self.started {
            self.started = true;
            self.trace.emit(&format!("{:3}: ", 1), "", false);
        }

        loop {
            while let Some(c) = self.peek.filter(|c| c.is_whitespace()) {
                if c == '\n' {
                    self.token_line = self.line;
                    let separator = self.line_interrupt(self.line + 1);
                    self.bump();
                    if let Some(token) = separator {
                        return Ok(token);
                    }
                } else {
                    self.bump();
                }
            }

            self.token_line = self.line;
            let Some(c) = self.peek else {
                return Ok(Token::End);
            };

            match c {
                '\\' if self.continues_line() => {
                    self.bump();
                    self.bump();
                }
                '#' if self.next_is('<') => {
                    if self.skip_block_comment("#<", &HASH_COMMENT_CLOSERS)? {
                        if let Some(token) = self.line_interrupt(self.line) {
                            return Ok(token);
                        }
                    }
                }
                '/' if self.next_is('*') => {
                    if self.skip_block_comment("/*", &SLASH_COMMENT_CLOSERS)? {
                        if let Some(token) = self.line_interrupt(self.line) {
                            return Ok(token);
                        }
                    }
                }
                '#' => self.skip_line_comment(),
                '/' if self.next_is('/') => self.skip_line_comment(),
                '0'..='9' => return self.number(),
                '"' => return self.string(),
                c if c == '_' || c.is_alphabetic() => return Ok(self.identifier()),
                c => return Ok(self.operator(c)),
            }
        }
    }

    /// Closes the trace: wipes the dangling line prefix if the last line
    /// showed nothing.
    pub fn finish(&mut self) {
        if self.context == LineContext::Empty {
            self.trace.emit("\r    ", "\n", true);
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.is(Tag::End) {
                break;
            }
            tokens.push(token);
        }
        self.finish();
        Ok(tokens)
    }
}

impl Iterator for Lexer {
    type Item = LexerResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.next_token() {
            Ok(Token::End) => {
                self.exhausted = true;
                self.finish();
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
            token => Some(token),
        }
    }
}

fn seeded_id_table() -> HashMap<String, Token> {
    let mut table: HashMap<String, Token> = KEYWORDS
        .iter()
        .map(|(spelling, kw)| (spelling.to_string(), Token::Keyword(*kw)))
        .collect();
    table.extend(
        TYPE_NAMES
            .iter()
            .map(|name| (name.to_string(), Token::TypeName(Rc::from(*name)))),
    );
    table
}
