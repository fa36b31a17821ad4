#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        uninitialized in variable is OK
        "nil"
    }

    tests! {
        redefine_global in variable is OK
        "after"
    }

    tests! {
        undefined_reference in variable is ERR
        "Undefined variable 'notDefined'."
        "[line 1]"
    }

    tests! {
        assign_undefined in variable is ERR
        "Undefined variable 'notDefined'."
        "[line 1]"
    }

    tests! {
        use_in_own_initializer in variable is ERR
        "[line 2] Error at 'a': Can't read local variable in its own initializer."
    }
}
