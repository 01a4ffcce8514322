use colored::Color;
use lexer::Lexer;
use parser::{ast::ASTRefVisitor, pretty_print_ast::PrettyPrint, Parser};
use source::CharSource;
use trace::{Recorder, Stderr};

#[cfg(feature = "legacy")]
use legacy::TraceParser;

pub mod lexer;
pub mod parser;
pub mod source;
pub mod symbols;
pub mod trace;

#[cfg(feature = "legacy")]
pub mod legacy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Stop after scanning and return the token trace.
    pub lexer_only: bool,
    /// Mirror the token trace to stderr while parsing.
    pub log: bool,
    /// Echo every consumed source character to stderr.
    pub echo: bool,
    /// Use the trace grammar instead of building an AST.
    pub legacy: bool,
    pub optimize: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            lexer_only: false,
            log: false,
            echo: false,
            legacy: false,
            optimize: true,
        }
    }
}

/// Runs the front-end over `input` and returns what should be shown on
/// stdout: the token trace, the trace grammar's derivation or the pretty
/// printed AST. Warnings and the optional logs go to stderr.
pub fn run(input: &str, options: &Options) -> anyhow::Result<String> {
    let mut source = CharSource::new(input);
    if options.echo {
        source = source.with_echo(Box::new(Stderr::new()));
    }
    let lexer = Lexer::from_source(source);

    if options.lexer_only {
        let trace = Recorder::new();
        let mut lexer = lexer.with_trace(Box::new(trace.clone()));
        lexer.tokenize()?;
        return Ok(trace.contents());
    }

    let lexer = if options.log {
        lexer.with_trace(Box::new(Stderr::dimmed()))
    } else {
        lexer
    };
    let warnings = Box::new(Stderr::colored(Color::Yellow));

    #[cfg(feature = "legacy")]
    {
        if options.legacy {
            let ir = Recorder::new();
            TraceParser::new(lexer)
                .optimize(options.optimize)
                .with_ir(Box::new(ir.clone()))
                .with_warnings(warnings)
                .parse()?;
            return Ok(ir.contents());
        }
    }

    #[cfg(not(feature = "legacy"))]
    {
        if options.legacy {
            anyhow::bail!("this build does not include the trace grammar");
        }
    }

    let program = Parser::new(lexer).with_warnings(warnings).parse()?;
    Ok(PrettyPrint::new().visit_program(&program))
}
