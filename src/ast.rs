//! A parenthesized, Lisp-like dump of an expression or statement tree. This is
//! a debugging aid only — it is never invoked by the CLI or the REPL, and
//! exists purely so a developer working on the parser can eyeball what it
//! produced.

use crate::expr::{self, Expr, ExprVisitor};
use crate::stmt::{self, Stmt, StmtVisitor};

macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";
            string
        }
    };
}

#[allow(dead_code)]
pub struct AstPrinter;

#[allow(dead_code)]
impl AstPrinter {
    pub fn print_expr(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_literal_expr(&mut self, expr: &Expr) -> String {
        let Expr::Literal(literal) = expr else { unreachable!() };
        literal.to_string()
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> String {
        let Expr::Unary(data) = expr else { unreachable!() };
        parenthesize!(self, &data.operator.lexeme, data.expr)
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> String {
        let Expr::Binary(data) = expr else { unreachable!() };
        parenthesize!(self, &data.operator.lexeme, data.left, data.right)
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> String {
        let Expr::Grouping(data) = expr else { unreachable!() };
        parenthesize!(self, "group", data.expr)
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> String {
        let Expr::Variable(data) = expr else { unreachable!() };
        data.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> String {
        let Expr::Assign(data) = expr else { unreachable!() };
        parenthesize!(self, format!("= {}", data.name.lexeme).as_str(), data.value)
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> String {
        let Expr::Logical(data) = expr else { unreachable!() };
        parenthesize!(self, &data.operator.lexeme, data.left, data.right)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> String {
        let Expr::Call(data) = expr else { unreachable!() };
        let mut string = data.callee.accept(self);
        string += "(";
        string += &data.arguments.iter().map(|arg| arg.accept(self)).collect::<Vec<_>>().join(" ");
        string += ")";
        string
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> String {
        let Expr::Get(data) = expr else { unreachable!() };
        format!("(. {} {})", data.object.accept(self), data.name.lexeme)
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> String {
        let Expr::Set(data) = expr else { unreachable!() };
        format!("(= (. {} {}) {})", data.object.accept(self), data.name.lexeme, data.value.accept(self))
    }

    fn visit_this_expr(&mut self, _expr: &Expr) -> String {
        "this".to_string()
    }
}

impl StmtVisitor<String> for AstPrinter {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Expression(data) = stmt else { unreachable!() };
        parenthesize!(self, "expr", data.expr)
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Print(data) = stmt else { unreachable!() };
        parenthesize!(self, "print", data.expr)
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Var(data) = stmt else { unreachable!() };
        match &data.initializer {
            Some(initializer) => format!("(var {} = {})", data.name.lexeme, initializer.accept(self)),
            None => format!("(var {})", data.name.lexeme),
        }
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Block(data) = stmt else { unreachable!() };
        let mut string = String::from("{");
        for stmt in &data.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";
        string
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::If(data) = stmt else { unreachable!() };
        let mut string = format!("(if {} {}", data.condition.accept(self), data.then_branch.accept(self));
        if let Some(else_branch) = &data.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";
        string
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::While(data) = stmt else { unreachable!() };
        parenthesize!(self, "while", data.condition, data.body)
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Function(data) = stmt else { unreachable!() };
        let params = data.params.iter().map(|p| p.lexeme.clone()).collect::<Vec<_>>().join(" ");
        let body = data.body.iter().map(|s| s.accept(self)).collect::<Vec<_>>().join(" ");
        format!("(fun {}({}) {{ {} }})", data.name.lexeme, params, body)
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Return(data) = stmt else { unreachable!() };
        match &data.value {
            Some(value) => format!("(return {})", value.accept(self)),
            None => "(return)".to_string(),
        }
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Class(data) = stmt else { unreachable!() };
        let methods = data.methods.iter().map(|m| m.accept(self)).collect::<Vec<_>>().join(" ");
        format!("(class {} {})", data.name.lexeme, methods)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::{Token, Type};

    #[test]
    fn prints_a_binary_expression() {
        let expr = Expr::Binary(expr::BinaryData {
            left: Box::new(Expr::Literal(crate::literal::Literal::Number(1.0))),
            operator: Token::new(Type::Plus, "+".to_string(), None, 1),
            right: Box::new(Expr::Literal(crate::literal::Literal::Number(2.0))),
        });

        let mut printer = AstPrinter;
        assert_eq!(printer.print_expr(&expr), "(+ 1 2)");
    }

    #[test]
    fn prints_a_grouping_expression() {
        let expr = Expr::Grouping(expr::GroupingData {
            expr: Box::new(Expr::Literal(crate::literal::Literal::Bool(true))),
        });

        let mut printer = AstPrinter;
        assert_eq!(printer.print_expr(&expr), "(group true)");
    }

    #[test]
    fn prints_a_var_statement() {
        let stmt = Stmt::Var(stmt::VarData {
            name: Token::new(Type::Identifier, "a".to_string(), None, 1),
            initializer: Some(Expr::Literal(crate::literal::Literal::Number(1.0))),
        });

        let mut printer = AstPrinter;
        assert_eq!(printer.print_stmt(&stmt), "(var a = 1)");
    }
}
