#[macro_use]
mod common;

#[cfg(test)]
mod string_literal {
    tests! {
        literal in string is OK
        "hello"
    }

    tests! {
        unterminated in string is ERR
        "[line 1] Error: Unterminated string."
    }
}
