use clap::Parser;
use posttrader::cli::{run, Cli};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
