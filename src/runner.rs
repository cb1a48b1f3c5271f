use crate::evaluator::Evaluator;
use crate::host::{Host, StdHost};
use log::info;

/// Runs a script as if each line had been typed into the console.
///
/// Stops at the first failing line and reports it. Returns whether every
/// line succeeded.
pub fn run(source: &str, filename: Option<&str>, cwd: &str) -> bool {
    let mut evaluator = Evaluator::with_cwd(StdHost::new(), cwd);
    run_with(&mut evaluator, source, filename)
}

pub fn run_with<H: Host>(evaluator: &mut Evaluator<H>, source: &str, filename: Option<&str>) -> bool {
    for (number, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match evaluator.evaluate_line(line) {
            Ok(value) => {
                if !value.is_none() {
                    evaluator.host_mut().write_output(&format!("{}\n", value));
                }
            }
            Err(error) => {
                info!("line {} failed", number + 1);
                error.report(line, filename);
                return false;
            }
        }

        if evaluator.shutdown_requested() {
            info!("script requested shutdown at line {}", number + 1);
            break;
        }
    }

    true
}
