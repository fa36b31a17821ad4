#[macro_use]
mod common;

#[cfg(test)]
mod return_stmt {
    tests! {
        early_return in return is OK
        "before"
    }

    tests! {
        value in return is OK
        "5"
    }

    tests! {
        top_level in return is ERR
        "[line 1] Error at 'return': Can't return from top-level code."
    }
}
