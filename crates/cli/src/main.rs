use std::process::ExitCode;

fn main() -> ExitCode {
    dopgen_cli::run()
}
