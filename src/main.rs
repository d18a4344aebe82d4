use std::process::ExitCode;

use ixa_grid_spread::runner::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
