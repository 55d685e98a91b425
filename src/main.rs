use std::process::ExitCode;

fn main() -> ExitCode {
    match crux_ranks::cli::run_update(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
