use std::process::ExitCode;

fn main() -> ExitCode {
    quickquote_cli::run()
}
