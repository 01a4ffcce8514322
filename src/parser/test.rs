use super::pretty_print_ast::PrettyPrint;
use super::*;
use crate::trace::Recorder;

fn parse(input: &str) -> ParseResult<Program> {
    Parser::new(Lexer::new(input)).parse()
}

fn parse_err(input: &str) -> ParseError {
    parse(input).expect_err("parse should fail")
}

macro_rules! match_ast {
    ($( $input: expr => $ast: pat $( if $cond: expr )? ),+ $(,)?) => {
        $(
            let program = parse($input)?;
            assert!(matches!(&program, $ast $( if $cond )?), "{:?}", program);
        )+
    };
}

fn lit(value: i64) -> Expr {
    Expr::Literal(Literal::Integer(value))
}

fn bin(lhs: Expr, op: BinaryOp, rhs: Expr) -> Expr {
    Expr::BinOp(BinOp {
        lhs: Box::new(lhs),
        op,
        rhs: Box::new(rhs),
    })
}

fn eval(expr: &Expr) -> i64 {
    match expr {
        Expr::Literal(Literal::Integer(value)) => *value,
        Expr::BinOp(BinOp { lhs, op, rhs }) => match op {
            BinaryOp::Plus => eval(lhs) + eval(rhs),
            BinaryOp::Minus => eval(lhs) - eval(rhs),
        },
        other => panic!("cannot evaluate {other:?}"),
    }
}

#[test]
fn test_statements() -> Result<(), ParseError> {
    match_ast!(
        "" => Program(stmts) if stmts.is_empty(),
        "var x : int = 1;" => Program(stmts) if matches!(
            &stmts[..],
            [Stmt::VarDecl(VarDecl { name, ty, init: Expr::Literal(Literal::Integer(1)) })]
                if name == "x" && ty == "int"
        ),
        "set x = y;" => Program(stmts) if matches!(
            &stmts[..],
            [Stmt::Assignment(Assignment { name, value: Expr::Identifier(y) })]
                if name == "x" && y == "y"
        ),
        "print \"hello\";" => Program(stmts) if matches!(
            &stmts[..],
            [Stmt::Print(PrintStmt { expr: Expr::Literal(Literal::Str(s)) })] if s == "hello"
        ),
    );
    Ok(())
}

#[test]
fn test_empty_nested_blocks() -> Result<(), ParseError> {
    let mut parser = Parser::new(Lexer::new("{ { {} } {} }"));
    let program = parser.parse()?;

    let expected = Program(vec![Stmt::Block(Block(vec![
        Stmt::Block(Block(vec![Stmt::Block(Block(vec![]))])),
        Stmt::Block(Block(vec![])),
    ]))]);
    assert_eq!(program, expected);
    assert_eq!(parser.scope_depth(), 1);
    Ok(())
}

#[test]
fn test_left_associative_opers() -> Result<(), ParseError> {
    let program = parse("print 1 - 2 - 3;")?;
    let Stmt::Print(PrintStmt { expr }) = &program.0[0] else {
        panic!("expected a print statement, got {program:?}");
    };

    let expected = bin(bin(lit(1), BinaryOp::Minus, lit(2)), BinaryOp::Minus, lit(3));
    assert_eq!(*expr, expected);
    assert_eq!(eval(expr), -4);
    Ok(())
}

#[test]
fn test_signed_numbers_are_folded() -> Result<(), ParseError> {
    let program = parse("print -5 + +3 - -2;")?;
    let Stmt::Print(PrintStmt { expr }) = &program.0[0] else {
        panic!("expected a print statement, got {program:?}");
    };

    let expected = bin(
        bin(lit(-5), BinaryOp::Plus, lit(3)),
        BinaryOp::Minus,
        lit(-2),
    );
    assert_eq!(*expr, expected);
    Ok(())
}

#[test]
fn test_sign_only_applies_to_numbers() {
    let err = parse_err("var x : int = 1;\nprint 1 + -x;");
    assert_eq!(err.line, 2);
    assert!(matches!(
        err.error,
        ParseErrorType::MissingDigit {
            found: Tag::Identifier
        }
    ));

    let err = parse_err("print -\"text\";");
    assert!(matches!(
        err.error,
        ParseErrorType::MissingDigit { found: Tag::Str }
    ));
}

#[test]
fn test_missing_value() {
    let err = parse_err("print ;");
    assert!(matches!(
        err.error,
        ParseErrorType::ExpectedValue {
            found: Tag::Operator(';')
        }
    ));
}

#[test]
fn test_duplicate_declaration() {
    let err = parse_err("var x : int = 1;\nvar x : int = 2;");
    assert_eq!(err.line, 2);
    assert!(matches!(err.error, ParseErrorType::DuplicateDeclaration(ref name) if name == "x"));
}

#[test]
fn test_shadowing_in_nested_scope() -> Result<(), ParseError> {
    let mut parser = Parser::new(Lexer::new(
        "var x : int = 1; { var x : char = 2; { var x : i8 = 3; } }",
    ));
    parser.parse()?;

    assert_eq!(parser.scope_depth(), 1);
    assert_eq!(parser.symbols().find("x").unwrap().ty, "int");
    assert_eq!(parser.symbols().current().len(), 1);
    Ok(())
}

#[test]
fn test_scope_restored_after_error() {
    let mut parser = Parser::new(Lexer::new(
        "{ { var x : int = 1; var x : int = 2; } }",
    ));
    assert!(parser.parse().is_err());
    assert_eq!(parser.scope_depth(), 1);
    assert!(parser.symbols().find("x").is_none());
}

#[test]
fn test_block_errors() {
    let err = parse_err("{ print 1;");
    assert!(matches!(
        err.error,
        ParseErrorType::MissingClosingBrace { found: Tag::End }
    ));

    let err = parse_err("{ print 1; set }");
    assert!(matches!(
        err.error,
        ParseErrorType::UnexpectedToken {
            expected: Tag::Identifier,
            found: Tag::Operator('}')
        }
    ));
}

#[test]
fn test_unmatched_closing_brace() {
    let err = parse_err("print 1;\n{ print 2; }\n}");
    assert_eq!(err.line, 3);
    assert!(matches!(
        err.error,
        ParseErrorType::MissingOpeningBrace {
            found: Tag::Operator('}')
        }
    ));
}

#[test]
fn test_missing_type_annotation() {
    let err = parse_err("var x : y = 1;");
    assert!(matches!(
        err.error,
        ParseErrorType::MissingTypeAnnotation {
            found: Tag::Identifier
        }
    ));
}

#[test]
fn test_missing_semicolon() {
    let err = parse_err("print 1");
    assert!(matches!(
        err.error,
        ParseErrorType::UnexpectedToken {
            expected: Tag::Operator(';'),
            found: Tag::End
        }
    ));
}

#[test]
fn test_trailing_input() {
    let mut parser = Parser::new(Lexer::new("var x : int = 1; extra_garbage"));
    let err = parser.parse().unwrap_err();

    assert_eq!(err.line, 1);
    assert!(matches!(
        err.error,
        ParseErrorType::TrailingInput {
            found: Tag::Identifier
        }
    ));
    assert_eq!(parser.lookahead().name(), Some("extra_garbage"));
}

#[test]
fn test_bare_identifier_is_not_a_statement() {
    let err = parse_err("x : int");
    assert!(matches!(err.error, ParseErrorType::TrailingInput { .. }));
}

#[test]
fn test_stray_and_synthesized_separators() -> Result<(), ParseError> {
    let program = parse(";; print 1;;;")?;
    assert_eq!(program.0.len(), 1);

    let program = parse("var a : int = 1;\nset a = a + 2;\n{\n  print a;\n}\n")?;
    assert_eq!(program.0.len(), 3);
    Ok(())
}

#[test]
fn test_sign_is_folded_after_range_check() -> Result<(), ParseError> {
    let program = parse("print -9223372036854775807;")?;
    assert!(matches!(
        &program.0[..],
        [Stmt::Print(PrintStmt { expr })] if *expr == lit(-i64::MAX)
    ));

    let err = parse_err("print -9223372036854775808;");
    assert!(matches!(
        err.error,
        ParseErrorType::Lexer(LexerErrorType::NumberOutOfRange(ref digits))
            if digits == "9223372036854775808"
    ));
    Ok(())
}

#[test]
fn test_lexer_errors_propagate() {
    let err = parse_err("print 1;\nprint 2.5;");
    assert_eq!(err.line, 2);
    assert!(matches!(
        err.error,
        ParseErrorType::Lexer(LexerErrorType::UnsupportedFloat(_))
    ));
}

#[test]
fn test_undeclared_names_warn() -> Result<(), ParseError> {
    let warnings = Recorder::new();
    let mut parser = Parser::new(Lexer::new(
        "var a : int = 1;\nset b = a;\n{ var c : int = 2; }\nprint c + a;\n",
    ))
    .with_warnings(Box::new(warnings.clone()));
    parser.parse()?;

    assert_eq!(
        warnings.lines(),
        vec![
            "[warning] use of undeclared name `b` at line 2.",
            "[warning] use of undeclared name `c` at line 4.",
        ]
    );
    Ok(())
}

#[test]
fn test_pretty_print() -> Result<(), ParseError> {
    colored::control::set_override(false);
    let program = parse("var x : int = 1 + y;\n{ print \"hi\"; }")?;

    assert_eq!(
        PrettyPrint::new().visit_program(&program),
        "PROGRAM\n    VAR x : int =\n        BINARY(\"+\",\n            INT(1),\n            ID(y)\n        )\n    BLOCK\n        PRINT\n            STR(\"hi\")"
    );
    Ok(())
}
