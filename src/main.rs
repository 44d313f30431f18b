//! fliprate CLI - Rank flaky tests from JUnit or CSV test history.

use std::io::stdout;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fliprate::analysis::Analyzer;
use fliprate::cli::Cli;
use fliprate::config::{Config, OutputFormat};
use fliprate::core::{AnalysisContext, Analyzer as _, Error};
use fliprate::output::Format;
use fliprate::report::Renderer;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> fliprate::core::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(".")?,
    };
    cli.apply_to(&mut config);
    config.validate()?;

    let source = cli
        .source()
        .ok_or_else(|| Error::InvalidArgument("no test result input given".to_string()))?;
    let ledger = source.load()?;

    let mut analyzer = Analyzer::default();
    analyzer.configure(&config)?;
    let ctx = AnalysisContext::new(&ledger, &config);
    let analysis = analyzer.analyze(&ctx)?;

    let format = match config.output.format {
        OutputFormat::Json => Format::Json,
        OutputFormat::Markdown => Format::Markdown,
        OutputFormat::Text => Format::Text,
    };
    format.write_ranking(&analysis, &mut stdout())?;

    if config.heatmap.enabled && analysis.has_flaky_tests() {
        let renderer = Renderer::new()?;
        let path = renderer.render_to_file(&analysis, &config.heatmap.output_dir)?;
        eprintln!("Heatmap written to {}", path.display());
    }

    Ok(())
}
