use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::class::Class;
use crate::environment::{self, Environment};
use crate::error::{Error, RuntimeError, Unwind};
use crate::expr::{Expr, ExprId, ExprVisitor};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

type EvalResult = Result<Object, RuntimeError>;
type ExecResult = Result<(), Unwind>;

/// Tree-walks a resolved statement list, threading a "current environment"
/// reference that changes shape at block entry, function invocation, and
/// class-body resolution, but never the identity of `globals`.
pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    stdout: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Builds an interpreter that writes `print` output to `writer` instead
    /// of the process's stdout, so tests can capture it in-process.
    pub fn with_writer<W: Write + 'static>(writer: W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new(None)));

        for native in NativeFunction::globals() {
            globals.borrow_mut().define(&native.name.clone(), Object::from(native));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            stdout: Rc::new(RefCell::new(writer)),
        }
    }

    /// Called by the resolver once per locally-bound `Variable`/`Assign`/`This`
    /// node, recording how many `enclosing` links separate its use from its
    /// binding scope.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Runs every top-level statement in order. Stops at the first runtime
    /// error, reporting it and returning control to the caller — a script
    /// run this way should exit 70, while the REPL simply issues the next
    /// prompt.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {},
                Err(Unwind::RuntimeError(error)) => {
                    error.throw();
                    return;
                },
                Err(Unwind::Return(_)) => {
                    unreachable!("the resolver forbids top-level return");
                },
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes `statements` in `new_environment`, restoring the previous
    /// environment afterward regardless of whether execution completed
    /// normally or unwound via `Return`/`RuntimeError`.
    pub fn execute_block(&mut self, statements: &[Stmt], new_environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = Rc::clone(&self.environment);
        self.environment = new_environment;

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    fn lookup_variable(&mut self, id: ExprId, name: &Token) -> EvalResult {
        match self.locals.get(&id) {
            Some(&depth) => Ok(environment::get_at(&self.environment, depth, name)),
            None => self.globals.borrow().get(name),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_equal(left: &Object, right: &Object) -> bool {
    left == right
}

impl ExprVisitor<EvalResult> for Interpreter {
    fn visit_literal_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Literal(literal) = expr else { unreachable!() };
        Ok(Object::from(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Grouping(data) = expr else { unreachable!() };
        self.evaluate(&data.expr)
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Unary(data) = expr else { unreachable!() };
        let right = self.evaluate(&data.expr)?;

        match data.operator.r#type {
            Type::Minus => {
                let n = right.as_number().ok_or_else(|| RuntimeError {
                    token: data.operator.clone(),
                    message: "Operand must be a number.".to_string(),
                })?;
                Ok(Object::from(-n))
            },
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!("scanner only produces '-' and '!' as unary operators"),
        }
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Binary(data) = expr else { unreachable!() };
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;

        let both_numbers = || -> Result<(f64, f64), RuntimeError> {
            match (left.as_number(), right.as_number()) {
                (Some(l), Some(r)) => Ok((l, r)),
                _ => Err(RuntimeError {
                    token: data.operator.clone(),
                    message: "Operands must be numbers.".to_string(),
                }),
            }
        };

        match data.operator.r#type {
            Type::Minus => both_numbers().map(|(l, r)| Object::from(l - r)),
            Type::Slash => both_numbers().map(|(l, r)| Object::from(l / r)),
            Type::Star => both_numbers().map(|(l, r)| Object::from(l * r)),
            Type::Greater => both_numbers().map(|(l, r)| Object::from(l > r)),
            Type::GreaterEqual => both_numbers().map(|(l, r)| Object::from(l >= r)),
            Type::Less => both_numbers().map(|(l, r)| Object::from(l < r)),
            Type::LessEqual => both_numbers().map(|(l, r)| Object::from(l <= r)),
            Type::Plus => match (left.as_number(), right.as_number(), left.as_string(), right.as_string()) {
                (Some(l), Some(r), _, _) => Ok(Object::from(l + r)),
                (_, _, Some(l), Some(r)) => Ok(Object::from(format!("{l}{r}"))),
                _ => Err(RuntimeError {
                    token: data.operator.clone(),
                    message: "Operands must be two numbers or two strings.".to_string(),
                }),
            },
            Type::BangEqual => Ok(Object::from(!is_equal(&left, &right))),
            Type::EqualEqual => Ok(Object::from(is_equal(&left, &right))),
            _ => unreachable!("parser only produces these token kinds as binary operators"),
        }
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Variable(data) = expr else { unreachable!() };
        self.lookup_variable(data.id, &data.name)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Assign(data) = expr else { unreachable!() };
        let value = self.evaluate(&data.value)?;

        match self.locals.get(&data.id) {
            Some(&depth) => environment::assign_at(&self.environment, depth, &data.name, value.clone()),
            None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Logical(data) = expr else { unreachable!() };
        let left = self.evaluate(&data.left)?;

        if data.operator.r#type == Type::Or {
            if left.is_truthy() { return Ok(left); }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(&data.right)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Call(data) = expr else { unreachable!() };

        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        match &callee {
            Object::Function(function) => {
                check_arity(function, &data.paren, arguments.len())?;
                function.call(self, arguments)
            },
            Object::NativeFunction(function) => {
                check_arity(function, &data.paren, arguments.len())?;
                function.call(self, arguments)
            },
            Object::Class(class) => {
                check_arity(&*class.borrow(), &data.paren, arguments.len())?;
                class.borrow().call(self, arguments)
            },
            _ => Err(RuntimeError {
                token: data.paren.clone(),
                message: "Can only call functions and classes.".to_string(),
            }),
        }
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Get(data) = expr else { unreachable!() };
        let object = self.evaluate(&data.object)?;

        match object {
            Object::Instance(instance) => {
                let result = instance.borrow().get(&data.name, &instance);
                result
            },
            _ => Err(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have properties.".to_string(),
            }),
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Set(data) = expr else { unreachable!() };
        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have fields.".to_string(),
            });
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::This(data) = expr else { unreachable!() };
        self.lookup_variable(data.id, &data.keyword)
    }
}

fn check_arity(callable: &dyn Callable, paren: &Token, got: usize) -> Result<(), RuntimeError> {
    if callable.arity() != got {
        return Err(RuntimeError {
            token: paren.clone(),
            message: format!("Expected {} arguments but got {}.", callable.arity(), got),
        });
    }
    Ok(())
}

impl StmtVisitor<ExecResult> for Interpreter {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Expression(data) = stmt else { unreachable!() };
        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Print(data) = stmt else { unreachable!() };
        let value = self.evaluate(&data.expr)?;
        writeln!(self.stdout.borrow_mut(), "{value}").expect("write to print sink to succeed");
        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Var(data) = stmt else { unreachable!() };

        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Block(data) = stmt else { unreachable!() };
        let new_environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
        self.execute_block(&data.statements, new_environment)
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::If(data) = stmt else { unreachable!() };

        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::While(data) = stmt else { unreachable!() };

        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Function(data) = stmt else { unreachable!() };
        let function = Function::new(stmt, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function));
        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Return(data) = stmt else { unreachable!() };

        let value = match &data.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::from(Literal::Nil),
        };

        Err(Unwind::Return(value))
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Class(data) = stmt else { unreachable!() };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(method_data) = method else { unreachable!() };
            let is_initializer = method_data.name.lexeme == "init";
            let function = Function::new(method, Rc::clone(&self.environment), is_initializer);
            methods.insert(method_data.name.lexeme.clone(), function);
        }

        let class = Class::new(data.name.lexeme.clone(), methods);
        self.environment.borrow_mut().assign(&data.name, Object::Class(Rc::new(RefCell::new(class))))?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc as StdRc;

    fn run(source: &str) -> String {
        let output = StdRc::new(StdRefCell::new(Vec::new()));
        let tokens = Scanner::new(source).scan_tokens();
        let statements = Parser::new(tokens).parse();

        let mut interpreter = Interpreter::with_writer(SharedBuffer(StdRc::clone(&output)));
        {
            let mut resolver = Resolver::new(&mut interpreter);
            resolver.resolve(&statements);
        }
        interpreter.interpret(&statements);

        String::from_utf8(output.borrow().clone()).unwrap()
    }

    struct SharedBuffer(StdRc<StdRefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn prints_string_concatenation() {
        assert_eq!(run(r#"print "Hello, " + "world!";"#), "Hello, world!\n");
    }

    #[test]
    fn adds_two_numbers() {
        assert_eq!(run("var a = 1; var b = 2; print a + b;"), "3\n");
    }

    #[test]
    fn block_scoping_shadows_then_restores() {
        assert_eq!(run("var a = 1; { var a = 2; print a; } print a;"), "2\n1\n");
    }

    #[test]
    fn closures_capture_mutable_state_across_calls() {
        let source = "
            fun makeCounter() {
                var i = 0;
                fun c() { i = i + 1; print i; }
                return c;
            }
            var c = makeCounter();
            c();
            c();
        ";
        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn for_loop_prints_each_iteration() {
        assert_eq!(run("for (var i = 0; i < 3; i = i + 1) print i;"), "0\n1\n2\n");
    }

    #[test]
    fn class_method_reads_a_field_via_this() {
        let source = r#"
            class Cake { taste() { print "yum " + this.flavor; } }
            var c = Cake();
            c.flavor = "choco";
            c.taste();
        "#;
        assert_eq!(run(source), "yum choco\n");
    }

    #[test]
    fn mismatched_plus_operands_is_a_runtime_error() {
        assert_eq!(run(r#"print 1 + "x";"#), "");
        assert!(crate::error::had_runtime_error());
        crate::error::reset_error();
    }

    #[test]
    fn initializer_always_returns_the_bound_instance() {
        let source = r#"
            class Cake {
                init(flavor) { this.flavor = flavor; }
            }
            var c = Cake("choco");
            print c.flavor;
        "#;
        assert_eq!(run(source), "choco\n");
    }

    #[test]
    fn numbers_print_without_a_trailing_zero() {
        assert_eq!(run("print 3.0; print 3.5;"), "3\n3.5\n");
    }

    #[test]
    fn whole_numbers_beyond_i64_range_print_exactly() {
        assert_eq!(run("print 10000000000000000000;"), "10000000000000000000\n");
    }
}
