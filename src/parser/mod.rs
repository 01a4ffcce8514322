pub mod ast;
pub mod pretty_print_ast;

#[cfg(test)]
mod test;

use crate::lexer::token::{Keyword, Tag, Token};
use crate::lexer::{Lexer, LexerError, LexerErrorType};
use crate::symbols::{SymTable, Symbol};
use crate::trace::{Silent, TraceSink};
use ast::*;
use std::rc::Rc;
use thiserror::Error;

// <program>     ::= <stmts>
// <stmts>       ::= <stmt>*
// <stmt>        ::= ";" | <block> | <var-decl> | <assignment> | <print-stmt>
// <block>       ::= "{" <stmts> "}"
// <var-decl>    ::= "var" <identifier> ":" <type> "=" <expr> ";"
// <assignment>  ::= "set" <identifier> "=" <expr> ";"
// <print-stmt>  ::= "print" <expr> ";"
// <expr>        ::= <opers>
// <opers>       ::= <factor> ( ( "+" | "-" ) <factor> )*
// <factor>      ::= ( "+" | "-" )? <number> | <string> | <identifier>

macro_rules! parse_binary_expr {
    ( $self: ident, $ops: pat, $nextp: ident ) => {{
        let mut lhs = $self.$nextp()?;
        while let $ops = $self.tokens.peek().tag() {
            let op_token = $self.tokens.advance()?;
            let op = binary_op(&op_token);
            let rhs = Box::new($self.$nextp()?);
            lhs = Expr::BinOp(BinOp {
                lhs: Box::new(lhs),
                op,
                rhs,
            })
        }
        Ok(lhs)
    }};
}

#[derive(Error, Debug)]
#[error("ParseError at line {line}: {error}")]
pub struct ParseError {
    pub line: usize,
    #[source]
    pub error: ParseErrorType,
}

#[derive(Error, Debug)]
pub enum ParseErrorType {
    #[error("expected `{expected}`, got `{found}`")]
    UnexpectedToken { expected: Tag, found: Tag },

    #[error("expected `{{` to open a block, got `{found}`")]
    MissingOpeningBrace { found: Tag },

    #[error("expected `}}` at the end of the block, got `{found}`")]
    MissingClosingBrace { found: Tag },

    #[error("variable `{0}` is already declared in this scope")]
    DuplicateDeclaration(String),

    #[error("expected a type name after `:`, got `{found}`")]
    MissingTypeAnnotation { found: Tag },

    #[error("unexpected `{found}` after the end of the program")]
    TrailingInput { found: Tag },

    #[error("expected a digit, got `{found}`")]
    MissingDigit { found: Tag },

    #[error("expected a value, variable or string, got `{found}`")]
    ExpectedValue { found: Tag },

    #[error(transparent)]
    Lexer(LexerErrorType),
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError {
            line: err.line,
            error: ParseErrorType::Lexer(err.error),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// One-token lookahead over a [`Lexer`]. Tokens are scanned on demand, so
/// the lexer's trace interleaves with whatever the parser emits.
pub(crate) struct TokenStream {
    lexer: Lexer,
    lookahead: Token,
}

impl TokenStream {
    pub(crate) fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            lookahead: Token::End,
        }
    }

    pub(crate) fn start(&mut self) -> ParseResult<()> {
        self.lookahead = self.lexer.next_token()?;
        Ok(())
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.lookahead
    }

    pub(crate) fn line(&self) -> usize {
        self.lexer.line()
    }

    /// Consumes the lookahead and returns it.
    pub(crate) fn advance(&mut self) -> ParseResult<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    pub(crate) fn match_(&mut self, expected: Tag) -> ParseResult<Token> {
        if self.lookahead.is(expected) {
            self.advance()
        } else {
            Err(self.error(ParseErrorType::UnexpectedToken {
                expected,
                found: self.lookahead.tag(),
            }))
        }
    }

    pub(crate) fn identifier(&mut self) -> ParseResult<Rc<str>> {
        match &self.lookahead {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            other => Err(self.error(ParseErrorType::UnexpectedToken {
                expected: Tag::Identifier,
                found: other.tag(),
            })),
        }
    }

    pub(crate) fn type_name(&mut self) -> ParseResult<Rc<str>> {
        match &self.lookahead {
            Token::TypeName(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            other => Err(self.error(ParseErrorType::MissingTypeAnnotation {
                found: other.tag(),
            })),
        }
    }

    pub(crate) fn error(&self, error: ParseErrorType) -> ParseError {
        ParseError {
            line: self.line(),
            error,
        }
    }

    /// Wraps up the lexer trace and checks that nothing follows the program.
    pub(crate) fn finish(&mut self) -> ParseResult<()> {
        self.lexer.finish();
        if self.lookahead.is(Tag::End) {
            Ok(())
        } else {
            Err(self.error(ParseErrorType::TrailingInput {
                found: self.lookahead.tag(),
            }))
        }
    }
}

pub struct Parser {
    tokens: TokenStream,
    scopes: SymTable,
    warn: Box<dyn TraceSink>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            tokens: TokenStream::new(lexer),
            scopes: SymTable::new(),
            warn: Box::new(Silent),
        }
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

    pub fn parse(&mut self) -> ParseResult<Program> {
        self.tokens.start()?;
        let program = self.program()?;
        // a `}` left over at the top level has no block to close
        if self.tokens.peek().is_op('}') {
            let found = self.tokens.peek().tag();
            return Err(self.tokens.error(ParseErrorType::MissingOpeningBrace { found }));
        }
        self.tokens.finish()?;
        Ok(program)
    }

    fn warn_if_undeclared(&mut self, name: &str, line: usize) {
        if self.scopes.find(name).is_none() {
            self.warn.line(&format!(
                "[warning] use of undeclared name `{}` at line {}.",
                name, line
            ));
        }
    }
}

impl Parser {
    fn program(&mut self) -> ParseResult<Program> {
        Ok(Program(self.stmts()?))
    }

    fn stmts(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            let stmt = match self.tokens.peek().tag() {
                Tag::Operator(';') => {
                    self.tokens.advance()?;
                    continue;
                }
                Tag::Operator('{') => Stmt::Block(self.block()?),
                Tag::Keyword(Keyword::Var) => Stmt::VarDecl(self.var_decl()?),
                Tag::Keyword(Keyword::Set) => Stmt::Assignment(self.assignment()?),
                Tag::Keyword(Keyword::Print) => Stmt::Print(self.print_stmt()?),
                _ => return Ok(stmts),
            };
            stmts.push(stmt);
        }
    }

    fn block(&mut self) -> ParseResult<Block> {
        self.tokens.match_(Tag::Operator('{'))?;

        self.scopes.push_scope();
        let body = self.block_body();
        self.scopes.pop_scope();

        Ok(Block(body?))
    }

    fn block_body(&mut self) -> ParseResult<Vec<Stmt>> {
        let body = self.stmts()?;
        if !self.tokens.peek().is_op('}') {
            let found = self.tokens.peek().tag();
            return Err(self.tokens.error(ParseErrorType::MissingClosingBrace { found }));
        }
        self.tokens.advance()?;
        Ok(body)
    }

    fn var_decl(&mut self) -> ParseResult<VarDecl> {
        self.tokens.match_(Tag::Keyword(Keyword::Var))?;
        let line = self.tokens.line();
        let name = self.tokens.identifier()?.to_string();
        self.tokens.match_(Tag::Operator(':'))?;
        let ty = self.tokens.type_name()?.to_string();
        self.tokens.match_(Tag::Operator('='))?;
        let init = self.expr()?;
        self.tokens.match_(Tag::Operator(';'))?;

        if !self.scopes.insert(&name, Symbol::new(&name, &ty)) {
            return Err(ParseError {
                line,
                error: ParseErrorType::DuplicateDeclaration(name),
            });
        }
        Ok(VarDecl { name, ty, init })
    }

    fn assignment(&mut self) -> ParseResult<Assignment> {
        self.tokens.match_(Tag::Keyword(Keyword::Set))?;
        let line = self.tokens.line();
        let name = self.tokens.identifier()?.to_string();
        self.warn_if_undeclared(&name, line);
        self.tokens.match_(Tag::Operator('='))?;
        let value = self.expr()?;
        self.tokens.match_(Tag::Operator(';'))?;
        Ok(Assignment { name, value })
    }

    fn print_stmt(&mut self) -> ParseResult<PrintStmt> {
        self.tokens.match_(Tag::Keyword(Keyword::Print))?;
        let expr = self.expr()?;
        self.tokens.match_(Tag::Operator(';'))?;
        Ok(PrintStmt { expr })
    }
}

impl Parser {
    // Methods for parsing expressions

    fn expr(&mut self) -> ParseResult<Expr> {
        self.opers()
    }

    fn opers(&mut self) -> ParseResult<Expr> {
        parse_binary_expr!(self, Tag::Operator('+' | '-'), factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let sign_line = self.tokens.line();
        let sign = match self.tokens.peek().tag() {
            Tag::Operator(c @ ('+' | '-')) => {
                self.tokens.advance()?;
                Some(c)
            }
            _ => None,
        };

        let token = self.tokens.peek().clone();
        match (token, sign) {
            (Token::Number(value), sign) => {
                self.tokens.advance()?;
                let value = if sign == Some('-') { -value } else { value };
                Ok(Expr::Literal(Literal::Integer(value)))
            }
            (Token::Str(value), None) => {
                self.tokens.advance()?;
                Ok(Expr::Literal(Literal::Str(value)))
            }
            (Token::Identifier(name), None) => {
                let line = self.tokens.line();
                self.tokens.advance()?;
                self.warn_if_undeclared(&name, line);
                Ok(Expr::Identifier(name.to_string()))
            }
            (found, Some(_)) => Err(ParseError {
                line: sign_line,
                error: ParseErrorType::MissingDigit { found: found.tag() },
            }),
            (found, None) => Err(self.tokens.error(ParseErrorType::ExpectedValue {
                found: found.tag(),
            })),
        }
    }
}

fn binary_op(token: &Token) -> BinaryOp {
    match token {
        Token::Operator('+') => BinaryOp::Plus,
        Token::Operator('-') => BinaryOp::Minus,
        _ => unreachable!(),
    }
}
