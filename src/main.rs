use clap::Parser;
use colored::Colorize;
use cumpiler::lexer::LexerError;
use cumpiler::parser::ParseError;
use cumpiler::{run, Options};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path of the source file
    file: PathBuf,

    /// Print the token trace and stop
    #[arg(long, short)]
    lexer: bool,

    /// Mirror the token trace to stderr while parsing
    #[arg(long)]
    log: bool,

    /// Echo source characters to stderr as they are read
    #[arg(long)]
    echo: bool,

    /// Parse with the trace grammar and print its derivation
    #[arg(long)]
    legacy: bool,

    /// Print operands and operators instead of folded sums
    #[arg(long)]
    no_optimize: bool,
}

impl From<&Cli> for Options {
    fn from(cli: &Cli) -> Self {
        Options {
            lexer_only: cli.lexer,
            log: cli.log,
            echo: cli.echo,
            legacy: cli.legacy,
            optimize: !cli.no_optimize,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            process::exit(1);
        }
    };

    let text = match fs::read_to_string(&cli.file) {
        Ok(text) => text,
        Err(err) => {
            let msg = format!("Error: cannot read '{}': {}", cli.file.display(), err);
            eprintln!("{}", msg.red());
            process::exit(1);
        }
    };

    match run(&text, &Options::from(&cli)) {
        Ok(output) if output.ends_with('\n') => print!("{}", output),
        Ok(output) => println!("{}", output),
        Err(err) => {
            let located = err
                .downcast_ref::<LexerError>()
                .map(|le| (le.line, le.error.to_string()))
                .or_else(|| {
                    err.downcast_ref::<ParseError>()
                        .map(|pe| (pe.line, pe.error.to_string()))
                });

            let msg = match located {
                Some((line, cause)) => format!("Error line {}: {}", line, cause),
                None => format!("Error: {}", err),
            };
            eprintln!("{}", msg.red());
            process::exit(1);
        }
    }
}
