use std::process::ExitCode;

fn main() -> ExitCode {
    finsight::run()
}
