use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::Stmt;
use crate::token::Token;

/// A user-defined function or method closure: a declaration plus the
/// environment that was current at its definition site.
#[derive(Clone)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(declaration: &Stmt, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        let Stmt::Function(data) = declaration else {
            panic!("Function::new called with a non-Function statement");
        };

        Function {
            name: data.name.clone(),
            params: data.params.clone(),
            body: Rc::new(data.body.clone()),
            closure,
            is_initializer,
        }
    }

    /// Returns a new closure over the same declaration whose environment
    /// additionally binds `this` to `instance`.
    pub fn bind(&self, instance: Object) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance);

        Function {
            name: self.name.clone(),
            params: self.params.clone(),
            body: Rc::clone(&self.body),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params && Rc::ptr_eq(&self.body, &other.body)
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        for (param, arg) in self.params.iter().zip(arguments.into_iter()) {
            environment.define(&param.lexeme, arg);
        }

        match interpreter.execute_block(&self.body, Rc::new(RefCell::new(environment))) {
            Ok(()) => {
                if self.is_initializer {
                    Ok(this_at_depth_zero(&self.closure))
                } else {
                    Ok(Object::from(Literal::Nil))
                }
            },
            Err(Unwind::Return(value)) => {
                if self.is_initializer {
                    Ok(this_at_depth_zero(&self.closure))
                } else {
                    Ok(value)
                }
            },
            Err(Unwind::RuntimeError(error)) => Err(error),
        }
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

/// An initializer always returns the instance it was bound to, which `bind`
/// always places one frame above the call's own parameter frame.
fn this_at_depth_zero(closure: &Rc<RefCell<Environment>>) -> Object {
    closure.borrow().get(&Token::new(crate::token::Type::This, "this".to_string(), None, 0))
        .expect("initializer closure to have 'this' bound")
}

impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}

/// A function implemented in Rust rather than declared in Lox source.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl NativeFunction {
    pub fn globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                function: |_, _| {
                    let seconds = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .expect("system clock to be after the epoch")
                        .as_secs_f64();
                    Ok(Object::from(seconds))
                },
            },
        ]
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn native_clock_has_zero_arity_and_prints_without_a_name() {
        let clock = &NativeFunction::globals()[0];
        assert_eq!(clock.arity(), 0);
        assert_eq!(format!("{clock}"), "<native fn>");
    }
}
