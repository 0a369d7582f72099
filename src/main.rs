use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use signscribe::app::{ReplayOptions, load_recording, run_replay};
use signscribe::cli::{Cli, Commands, ConfigAction};
use signscribe::config::{Config, OutputFormat};
use signscribe::label::LetterLabel;
use signscribe::output::format_label_row;
use signscribe::resolve::Resolver;
use std::fs;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            input,
            realtime,
            json,
            confirm_hold,
            flush_blank,
        } => {
            let config = load_config(cli.config.as_deref())?;
            if cli.verbose >= 1 && !cli.quiet {
                eprintln!("{}", format!("signscribe {}", signscribe::version_string()).dimmed());
            }
            let records = load_recording(&input)
                .with_context(|| format!("Failed to read recording {}", input.display()))?;
            let options = ReplayOptions {
                realtime,
                json,
                confirm_hold,
                flush_blank,
                quiet: cli.quiet,
                verbosity: cli.verbose,
            };
            let text_output = !json && config.output.format == OutputFormat::Text;

            let summary = run_replay(config, records, options).await?;
            if text_output && let Some(sentence) = summary.sentence {
                println!("{}", sentence.bold());
            }
        }
        Commands::Labels => {
            print_labels()?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "signscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/signscribe/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

fn config_path(custom_path: Option<&Path>) -> Result<PathBuf> {
    custom_path
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .context("Could not determine config directory; pass --config")
}

/// Print the label set with each label's routing group.
fn print_labels() -> Result<()> {
    let resolver = Resolver::new()?;

    println!("{}", "Labels (index, label, group):".bold());
    for label in LetterLabel::ALL {
        let group = resolver.route(label).map(|g| g.name);
        println!("  {}", format_label_row(label, group));
    }

    println!();
    println!("{}", "Disambiguation groups (priority order):".bold());
    for group in resolver.groups() {
        let labels: Vec<&str> = group.labels.iter().map(|l| l.as_str()).collect();
        println!(
            "  {:<5} {:<10} specialist: {}",
            group.name,
            labels.join(","),
            group.specialist
        );
    }
    Ok(())
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", config_path(custom_path)?.display());
        }
        ConfigAction::Init { force } => {
            let path = config_path(custom_path)?;
            if path.exists() && !force {
                eprintln!(
                    "{} {} already exists (use --force to overwrite)",
                    "Error:".red(),
                    path.display()
                );
                std::process::exit(1);
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, Config::default().to_toml()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display().green());
        }
    }
    Ok(())
}
