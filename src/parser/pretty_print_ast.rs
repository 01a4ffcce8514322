use super::ast::*;
use colored::Colorize;

pub struct PrettyPrint {
    indent: usize,
}

impl PrettyPrint {
    const INDENT: &'static str = "    ";

    pub fn new() -> Self {
        Self { indent: 0 }
    }

    fn visit_stmts(&mut self, stmts: &[Stmt]) -> String {
        stmts
            .iter()
            .map(|stmt| format!("\n{}", self.visit_stmt(stmt)))
            .collect()
    }
}

impl Default for PrettyPrint {
    fn default() -> Self {
        Self::new()
    }
}

impl ASTRefVisitor<String> for PrettyPrint {
    fn visit_program(&mut self, program: &Program) -> String {
        self.indent += 1;
        let body = self.visit_stmts(&program.0);
        self.indent -= 1;
        format!("{}{}", "PROGRAM".blue().bold(), body)
    }

    fn visit_block(&mut self, block: &Block) -> String {
        format!("{}{}", "BLOCK".blue(), self.visit_stmts(&block.0))
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> String {
        let pad = Self::INDENT.repeat(self.indent);
        self.indent += 1;
        let stmt_str = match stmt {
            Stmt::Assignment(assign) => format!(
                "{} {} =\n{}",
                "SET".red(),
                assign.name.blue(),
                self.visit_expr(&assign.value)
            ),
            Stmt::Block(block) => self.visit_block(block),
            Stmt::Print(print) => format!("{}\n{}", "PRINT".red(), self.visit_expr(&print.expr)),
            Stmt::VarDecl(decl) => format!(
                "{} {} : {} =\n{}",
                "VAR".red(),
                decl.name.blue(),
                decl.ty.green(),
                self.visit_expr(&decl.init)
            ),
        };
        self.indent -= 1;
        format!("{}{}", pad, stmt_str)
    }

    fn visit_expr(&mut self, expr: &Expr) -> String {
        let pad = Self::INDENT.repeat(self.indent);
        self.indent += 1;
        let expr_str = match expr {
            Expr::Literal(lit) => self.visit_literal(lit),
            Expr::Identifier(name) => format!("{}({})", "ID".green(), name.blue()),
            Expr::BinOp(BinOp { lhs, op, rhs }) => format!(
                "{}(\"{}\",\n{},\n{}\n{})",
                "BINARY".cyan().bold(),
                op.to_string().yellow(),
                self.visit_expr(lhs),
                self.visit_expr(rhs),
                pad
            ),
        };
        self.indent -= 1;
        format!("{}{}", pad, expr_str)
    }

    fn visit_literal(&mut self, literal: &Literal) -> String {
        match literal {
            Literal::Integer(i) => format!("{}({})", "INT".green(), i.to_string().magenta()),
            Literal::Str(s) => format!("{}({})", "STR".green(), format!("{:?}", s).magenta()),
        }
    }
}
