#[macro_use]
mod common;

#[cfg(test)]
mod constructor {
    tests! {
        init_runs in constructor is OK
        "1"
    }

    tests! {
        init_returns_instance in constructor is OK
        "Foo instance"
    }

    tests! {
        arity_from_init in constructor is ERR
        "Expected 2 arguments but got 1."
        "[line 8]"
    }

    tests! {
        return_value_from_init in constructor is ERR
        "[line 3] Error at 'return': Can't return a value from an initializer."
    }
}
