use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A single lexical frame: a name→value mapping plus a link to the frame that
/// enclosed it at definition time. Frames are reference-counted so a closure
/// can keep its defining frame alive after the scope that created it returns.
#[derive(Debug)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment { enclosing, values: HashMap::new() }
    }

    pub fn define(&mut self, name: &str, value: Object) {
        self.values.insert(name.to_string(), value);
    }

    /// Walks `distance` `enclosing` links up from this frame.
    fn ancestor(environment: Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut current = environment;
        for _ in 0..distance {
            let next = current.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("resolved distance to stay within the environment chain"));
            current = next;
        }
        current
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }
}

/// Reads the value bound to `name` exactly `distance` frames above `environment`.
/// Does not walk further than `distance`, and does not fall back to a global
/// lookup if the binding is somehow missing there — that would indicate a
/// resolver bug, not a user error, so it panics rather than raising a
/// `RuntimeError`.
pub fn get_at(environment: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Object {
    let frame = Environment::ancestor(Rc::clone(environment), distance);
    let value = frame.borrow().values.get(&name.lexeme).cloned();
    value.unwrap_or_else(|| panic!("resolved variable '{}' to be bound at depth {}", name.lexeme, distance))
}

pub fn assign_at(environment: &Rc<RefCell<Environment>>, distance: usize, name: &Token, value: Object) {
    let frame = Environment::ancestor(Rc::clone(environment), distance);
    frame.borrow_mut().values.insert(name.lexeme.clone(), value);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::literal::Literal;
    use crate::token::Type;

    fn token(lexeme: &str) -> Token {
        Token::new(Type::Identifier, lexeme.to_string(), None, 1)
    }

    #[test]
    fn defines_and_reads_in_the_same_frame() {
        let mut env = Environment::new(None);
        env.define("a", Object::from(Literal::Number(1.0)));
        assert_eq!(env.get(&token("a")).unwrap(), Object::from(Literal::Number(1.0)));
    }

    #[test]
    fn reads_fall_through_to_enclosing_frames() {
        let global = Rc::new(RefCell::new(Environment::new(None)));
        global.borrow_mut().define("a", Object::from(Literal::Number(1.0)));

        let local = Environment::new(Some(Rc::clone(&global)));
        assert_eq!(local.get(&token("a")).unwrap(), Object::from(Literal::Number(1.0)));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let env = Environment::new(None);
        let err = env.get(&token("missing")).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'missing'.");
    }

    #[test]
    fn assign_does_not_implicitly_define() {
        let mut env = Environment::new(None);
        let err = env.assign(&token("a"), Object::from(Literal::Number(1.0))).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'a'.");
    }

    #[test]
    fn get_at_and_assign_at_touch_exactly_the_resolved_frame() {
        let global = Rc::new(RefCell::new(Environment::new(None)));
        global.borrow_mut().define("a", Object::from(Literal::Number(1.0)));

        let local = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&global)))));
        local.borrow_mut().define("a", Object::from(Literal::Number(2.0)));

        assert_eq!(get_at(&local, 0, &token("a")), Object::from(Literal::Number(2.0)));
        assert_eq!(get_at(&local, 1, &token("a")), Object::from(Literal::Number(1.0)));

        assign_at(&local, 1, &token("a"), Object::from(Literal::Number(3.0)));
        assert_eq!(global.borrow().get(&token("a")).unwrap(), Object::from(Literal::Number(3.0)));
        assert_eq!(local.borrow().get(&token("a")).unwrap(), Object::from(Literal::Number(2.0)));
    }
}
