#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        empty in class is OK
        "Foo"
    }

    tests! {
        method_this in class is OK
        "The cinnamon cake is delicious!"
    }

    tests! {
        instance_to_string in class is OK
        "Bagel instance"
    }

    tests! {
        undefined_property in class is ERR
        "Undefined property 'bar'."
        "[line 3]"
    }

    tests! {
        get_on_non_instance in class is ERR
        "Only instances have properties."
        "[line 2]"
    }

    tests! {
        set_on_non_instance in class is ERR
        "Only instances have fields."
        "[line 2]"
    }
}
