use std::process::ExitCode;

use gitctx::ui::output;

fn main() -> ExitCode {
    match gitctx::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
