#[macro_use]
mod common;

#[cfg(test)]
mod call {
    tests! {
        native_clock in call is OK
        "true"
    }

    tests! {
        class_arity in call is ERR
        "Expected 1 arguments but got 0."
        "[line 7]"
    }
}
