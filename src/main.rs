use std::{env, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    let code = match args.len() {
        n if n > 2 => plox::usage_error(),
        2 => plox::run_file(&args[1]),
        _ => {
            plox::run_prompt();
            0
        }
    };

    process::exit(code);
}
