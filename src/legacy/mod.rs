//! The trace grammar: statements are comma lists of names followed by a
//! declaration or an assignment, and arithmetic is folded while parsing.
//! Instead of building a tree, semantic actions write a derivation to the
//! IR sink as productions are recognized.


use crate::lexer::token::{Tag, Token};
use crate::lexer::Lexer;
use crate::parser::{ParseError, ParseErrorType, ParseResult, TokenStream};
use crate::symbols::{SymTable, Symbol};
use crate::trace::{Silent, TraceSink};
use std::collections::VecDeque;
use std::rc::Rc;

// <program>            ::= <stmts>
// <stmts>              ::= ( <block> | ";" | <expr> ";" )*
// <block>              ::= "{" <stmts> "}"
// <expr>               ::= <lval-lst> <declr-or-rval-lst> | <rval-lst>
// <lval-lst>           ::= <identifier> ( "," <identifier> )*
// <declr-or-rval-lst>  ::= ":" <type> | "=" <rval-lst> | ε
// <rval-lst>           ::= <opers> ( "," <opers> )*
// <opers>              ::= <digit> ( ( "+" | "-" ) <digit> )*
// <digit>              ::= ( "+" | "-" )? <number>

pub struct TraceParser {
    tokens: TokenStream,
    scopes: SymTable,
    pending: VecDeque<Rc<str>>,
    optimize: bool,
    accumulator: i64,
    ir: Box<dyn TraceSink>,
    warn: Box<dyn TraceSink>,
}

impl TraceParser {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            tokens: TokenStream::new(lexer),
            scopes: SymTable::new(),
            pending: VecDeque::new(),
            optimize: true,
            accumulator: 0,
            ir: Box::new(Silent),
            warn: Box::new(Silent),
        }
    }

    /// When off, `opers` writes each operand and operator instead of the sum.
    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_ir(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.ir = sink;
        self
    }

    pub fn with_warnings(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.warn = sink;
        self
    }

    pub fn lookahead(&self) -> &Token {
        self.tokens.peek()
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn symbols(&self) -> &SymTable {
        &self.scopes
    }

    pub fn parse(&mut self) -> ParseResult<()> {
        let result = self.program();
        if result.is_err() {
            self.pending.clear();
        }
        result
    }

    fn program(&mut self) -> ParseResult<()> {
        self.tokens.start()?;
        self.stmts()?;
        self.tokens.finish()
    }
}

impl TraceParser {
    fn stmts(&mut self) -> ParseResult<()> {
        loop {
            match self.tokens.peek().tag() {
                Tag::Operator('{') => self.block()?,
                Tag::Operator(';') => {
                    self.tokens.advance()?;
                }
                _ => {
                    if !self.expr()? {
                        return Ok(());
                    }
                    self.tokens.match_(Tag::Operator(';'))?;
                }
            }
        }
    }

    fn block(&mut self) -> ParseResult<()> {
        self.tokens.match_(Tag::Operator('{'))?;
        self.ir.line("{");

        self.scopes.push_scope();
        let body = self.block_body();
        self.scopes.pop_scope();
        body?;

        self.ir.line("}");
        Ok(())
    }

    fn block_body(&mut self) -> ParseResult<()> {
        self.stmts()?;
        if !self.tokens.peek().is_op('}') {
            let found = self.tokens.peek().tag();
            return Err(self.tokens.error(ParseErrorType::MissingClosingBrace { found }));
        }
        self.tokens.advance()?;
        Ok(())
    }

    fn expr(&mut self) -> ParseResult<bool> {
        if self.lval_lst()? {
            if !self.declr_or_rval_lst()? {
                self.pending.clear();
                self.warn_standalone();
            }
            return Ok(true);
        }

        if self.rval_lst()? {
            self.warn_standalone();
            return Ok(true);
        }
        Ok(false)
    }

    fn lval_lst(&mut self) -> ParseResult<bool> {
        if !self.tokens.peek().is(Tag::Identifier) {
            return Ok(false);
        }
        loop {
            let name = self.tokens.identifier()?;
            self.pending.push_back(name);
            if !self.tokens.peek().is_op(',') {
                return Ok(true);
            }
            self.tokens.advance()?;
        }
    }

    fn declr_or_rval_lst(&mut self) -> ParseResult<bool> {
        match self.tokens.peek().tag() {
            Tag::Operator(':') => {
                self.tokens.advance()?;
                let ty = self.tokens.type_name()?;
                self.declare_pending(&ty)?;
                Ok(true)
            }
            Tag::Operator('=') => {
                self.tokens.advance()?;
                self.rval_lst()
            }
            _ => Ok(false),
        }
    }

    fn declare_pending(&mut self, ty: &str) -> ParseResult<()> {
        while let Some(name) = self.pending.pop_front() {
            if !self.scopes.insert(&name, Symbol::new(&*name, ty)) {
                return Err(self
                    .tokens
                    .error(ParseErrorType::DuplicateDeclaration(name.to_string())));
            }
            self.ir.line(&format!("{} : {}", name, ty));
        }
        Ok(())
    }

    fn rval_lst(&mut self) -> ParseResult<bool> {
        if self.pending.is_empty() {
            return self.standalone_values();
        }

        while let Some(name) = self.pending.pop_front() {
            if self.scopes.find(&name).is_none() {
                let line = self.tokens.line();
                self.warn.line(&format!(
                    "[warning] use of undeclared name `{}` at line {}.",
                    name, line
                ));
            }
            self.ir.emit(&format!("{}=", name), "", true);
            self.opers()?;
            self.ir.line("");

            if !self.pending.is_empty() {
                self.tokens.match_(Tag::Operator(','))?;
            }
        }
        Ok(true)
    }

    fn standalone_values(&mut self) -> ParseResult<bool> {
        if !matches!(
            self.tokens.peek().tag(),
            Tag::Number | Tag::Operator('+' | '-')
        ) {
            return Ok(false);
        }
        loop {
            self.opers()?;
            self.ir.line("");
            if !self.tokens.peek().is_op(',') {
                return Ok(true);
            }
            self.tokens.advance()?;
        }
    }

    fn opers(&mut self) -> ParseResult<()> {
        self.accumulator = self.digit()?;
        loop {
            if !self.optimize {
                self.ir.emit(&self.accumulator.to_string(), "", true);
            }

            let op = match self.tokens.peek().tag() {
                Tag::Operator(c @ ('+' | '-')) => c,
                _ => break,
            };
            self.tokens.advance()?;
            let value = self.digit()?;

            if self.optimize {
                self.accumulator = match op {
                    '+' => self.accumulator.wrapping_add(value),
                    _ => self.accumulator.wrapping_sub(value),
                };
            } else {
                self.ir.emit(&op.to_string(), "", true);
                self.accumulator = value;
            }
        }

        if self.optimize {
            self.ir.emit(&self.accumulator.to_string(), "", true);
        }
        Ok(())
    }

    fn digit(&mut self) -> ParseResult<i64> {
        let negate = match self.tokens.peek().tag() {
            Tag::Operator('-') => {
                self.tokens.advance()?;
                true
            }
            Tag::Operator('+') => {
                self.tokens.advance()?;
                false
            }
            _ => false,
        };

        match self.tokens.peek() {
            Token::Number(value) => {
                let value = *value;
                self.tokens.advance()?;
                Ok(if negate { -value } else { value })
            }
            other => Err(ParseError {
                line: self.tokens.line(),
                error: ParseErrorType::MissingDigit { found: other.tag() },
            }),
        }
    }

    fn warn_standalone(&mut self) {
        if self.tokens.peek().is_op(';') {
            let line = self.tokens.line();
            self.warn.line(&format!(
                "[warning] standalone expression at line {}.",
                line
            ));
        }
    }
}
