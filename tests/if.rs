#[macro_use]
mod common;

#[cfg(test)]
mod if_stmt {
    tests! {
        then_branch in if is OK
        "yes"
    }

    tests! {
        else_branch in if is OK
        "no"
    }

    tests! {
        no_else in if is OK
        "after"
    }

    tests! {
        truthiness in if is OK
        "zero is truthy"
        "empty string is truthy"
        "nil is falsey"
    }
}
