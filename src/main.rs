//! capy-launcher - Desktop application launcher for CapyShell
//!
//! Lists installed applications, launches one by name, or watches the
//! application directories and keeps the catalog fresh.

mod services;

use clap::{Parser, Subcommand};
use log::error;
use serde_json::json;
use std::error::Error;

#[derive(Parser)]
#[command(name = "capy-launcher", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the application catalog
    List {
        /// Include entries marked Hidden or NoDisplay
        #[arg(long)]
        include_hidden: bool,
        /// Print JSON instead of aligned text
        #[arg(long)]
        json: bool,
    },
    /// Launch the application with this Name
    Run { name: String },
    /// Watch application directories and log catalog rebuilds
    Watch,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let launcher = services::apps::start();

    match cli.command {
        Cmd::List {
            include_hidden,
            json,
        } => {
            let rows = services::apps::rows(&launcher, include_hidden);
            if json {
                let out: Vec<_> = rows
                    .iter()
                    .map(|row| {
                        json!({
                            "app": row.entry,
                            "annotation": row.annotation,
                            "launch": capy_apps::build_in_current_dir(&row.entry),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let width = rows.iter().map(|r| r.entry.name.len()).max().unwrap_or(0);
                for row in &rows {
                    match &row.annotation {
                        Some(note) => println!("{:<width$}  {}", row.entry.name, note),
                        None => println!("{}", row.entry.name),
                    }
                }
            }
        }
        Cmd::Run { name } => {
            if let Err(e) = services::apps::run(&launcher, &name) {
                error!("Failed to launch '{}': {}", name, e);
                return Err(e.into());
            }
        }
        Cmd::Watch => services::apps::watch(&launcher)?,
    }

    Ok(())
}
