mod platform;

use std::process::ExitCode;

fn main() -> ExitCode {
    platform::run_app(platform::CliArgs::parse(std::env::args().skip(1)))
}
