use clap::Parser;
use retiresim::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
