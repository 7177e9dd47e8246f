//! democam entry point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use democam_cli::Cli;

fn main() -> anyhow::Result<()> {
    // Initialize logging (stderr, so stdout stays clean for the summary)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let outcome = democam_cli::execute(&cli)?;
    print!("{}", outcome.render(cli.format)?);

    if outcome.failed() > 0 {
        anyhow::bail!("{} camera export(s) failed", outcome.failed());
    }
    Ok(())
}
