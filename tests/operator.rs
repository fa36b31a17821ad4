#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        arithmetic in operator is OK
        "3"
        "2"
        "8"
        "2.5"
        "-5"
    }

    tests! {
        comparison in operator is OK
        "true"
        "true"
        "true"
        "false"
        "true"
        "true"
    }

    tests! {
        string_concat in operator is OK
        "foobar"
    }

    tests! {
        add_type_error in operator is ERR
        "Operands must be two numbers or two strings."
        "[line 1]"
    }

    tests! {
        subtract_type_error in operator is ERR
        "Operands must be numbers."
        "[line 1]"
    }

    tests! {
        negate_type_error in operator is ERR
        "Operand must be a number."
        "[line 1]"
    }

    tests! {
        not in operator is OK
        "false"
        "true"
        "true"
        "false"
    }
}
