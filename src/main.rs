use std::process::ExitCode;

use coursekeeper::ui::output;

fn main() -> ExitCode {
    match coursekeeper::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
