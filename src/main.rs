use clap::Parser;
use newsalpha::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
