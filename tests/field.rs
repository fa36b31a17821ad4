#[macro_use]
mod common;

#[cfg(test)]
mod field {
    tests! {
        get_and_set in field is OK
        "1"
    }

    tests! {
        shadows_method in field is OK
        "field"
    }

    tests! {
        call_function_field in field is OK
        "Hi, Dear Reader!"
    }
}
