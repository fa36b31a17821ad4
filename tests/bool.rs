#[macro_use]
mod common;

#[cfg(test)]
mod bool_literal {
    tests! {
        literal in bool is OK
        "true"
        "false"
    }
}
