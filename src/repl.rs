use crate::evaluator::Evaluator;
use crate::host::{Host, StdHost};
use log::debug;
use std::io::{self, Write};

/// Line-at-a-time console. Editing and history are left to the terminal.
pub fn start(cwd: &str) {
    println!("NScript Console v0.1.0");
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    // one evaluator for the whole session so variables and cwd persist
    let mut evaluator = Evaluator::with_cwd(StdHost::new(), cwd);

    loop {
        print!("{} $ ", evaluator.cwd());
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, &mut evaluator);
                evaluator.host_mut().end_line();

                if evaluator.shutdown_requested() {
                    debug!("leaving the console after shutdown()");
                    break;
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

/// Evaluates one line and prints its result; `none` results print nothing.
pub fn run_repl_command<H: Host>(source: &str, evaluator: &mut Evaluator<H>) {
    match evaluator.evaluate_line(source) {
        Ok(value) => {
            if !value.is_none() {
                evaluator.host_mut().write_output(&format!("{}\n", value));
            }
        }
        Err(error) => error.report(source, None),
    }
}
