//! Command-line host for the form engine.
//!
//! Provides commands for:
//! - Schema validation
//! - Form metadata inspection
//! - Rendering a schema against form data
//! - Exporting the JSON Schema for form documents
//! - Replaying recorded form events

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid --log-level '{}'", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.engine.to_config();

    match cli.command {
        Commands::Validate { schema } => {
            let validation = commands::validate(&schema, &config)?;
            if validation.errors.is_empty() {
                println!(
                    "{}: ok ({} nodes checked)",
                    schema.display(),
                    validation.nodes_checked
                );
                return Ok(ExitCode::SUCCESS);
            }
            for error in &validation.errors {
                println!("{}", error);
            }
            println!("{} error(s)", validation.errors.len());
            Ok(ExitCode::FAILURE)
        }
        Commands::Meta { schema, display } => {
            print_json(&commands::meta(&schema, &config, display)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Render {
            schema,
            data,
            page,
            display,
            mode,
            context,
        } => {
            let options = commands::RenderOptions {
                data,
                page,
                display,
                mode,
                context,
            };
            print_json(&commands::render(&schema, &config, &options)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Schema { out } => {
            let schema = commands::schema(out.as_deref())?;
            if out.is_none() {
                print_json(&schema)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Replay {
            schema,
            events,
            data,
            display,
        } => {
            let report = commands::replay(&schema, &events, &config, data.as_deref(), display)?;
            print_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
