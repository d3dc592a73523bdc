use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use sitetime::cli::args::Cli;
use sitetime::cli::commands;
use sitetime::config::{ColorSetting, Config, Paths};
use sitetime::error::SiteTimeError;
use sitetime::logging::setup_tracing;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        let usage = e
            .downcast_ref::<SiteTimeError>()
            .is_some_and(SiteTimeError::is_usage_error);
        std::process::exit(if usage { 2 } else { 1 });
    }
}

fn run() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let paths = match cli.home {
        Some(root) => Paths::with_root(root),
        None => Paths::new()?,
    };
    let config = Config::load_from_path(&paths.config_file)
        .with_context(|| format!("loading {}", paths.config_file.display()))?;

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    let format = cli.output.unwrap_or(config.general.default_output);
    let output = commands::execute(cli.command, &paths, &config, format)?;

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
