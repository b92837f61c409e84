use anyhow::Result;
use clap::Parser;
use importcost::{analyzer, cli::Cli, config::AnalyzerConfig};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    // Config file first, flags on top
    let config = AnalyzerConfig::resolve(&args)?;

    let analysis = analyzer::run(&args.file, &config)?;
    analysis.stats.print_summary();

    Ok(())
}
