//! Twinpad - multi-tab notes in plain text and markdown side by side.
//!
//! # Usage
//!
//! ```bash
//! twinpad                       # interactive shell
//! twinpad list
//! twinpad render tab_2 > note.html
//! twinpad convert --to markdown notes.txt
//! twinpad --data-dir ./notes --keep-empty --save
//! ```

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use twinpad::app::{App, Timing};
use twinpad::config::{
    ConfigFlags, DEFAULT_STATUS_MS, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use twinpad::convert::{markdown_to_text, text_to_markdown};
use twinpad::tab::TabId;

/// Multi-tab notes in plain text and markdown side by side
#[derive(Parser, Debug)]
#[command(name = "twinpad", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Cmd>,

    /// Directory holding tab and settings records
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Quiet period after the last edit before auto-saving
    #[arg(long, global = true, value_name = "MS")]
    autosave_ms: Option<u64>,

    /// Keep empty tabs on save instead of dropping their records
    #[arg(long, global = true)]
    keep_empty: bool,

    /// Log lifecycle events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

impl Cli {
    fn config_flags(&self) -> ConfigFlags {
        ConfigFlags {
            data_dir: self.data_dir.clone(),
            autosave_ms: self.autosave_ms,
            keep_empty: self.keep_empty,
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Interactive shell (default)
    Shell,
    /// List tabs in order
    List,
    /// Print a tab's markdown as HTML
    Render {
        /// Tab id such as tab_2; defaults to the active tab
        id: Option<TabId>,
    },
    /// Convert a file or stdin without touching stored notes
    Convert {
        #[arg(long, value_enum)]
        to: Target,
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Remove stored records of closed tabs
    Gc,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Markdown,
    Text,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.config_flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.verbose);

    let timing = Timing {
        autosave_ms: effective.effective_autosave_ms(),
        status_ms: DEFAULT_STATUS_MS,
    };
    let app = App::new(effective.resolved_data_dir())
        .with_timing(timing)
        .with_policy(effective.empty_tab_policy());

    match cli.command.unwrap_or(Cmd::Shell) {
        Cmd::Shell => app.run().context("Application error"),
        Cmd::List => app.write_tab_list(&mut io::stdout().lock()),
        Cmd::Render { id } => {
            let html = app.render_tab(id)?;
            io::stdout().lock().write_all(html.as_bytes())?;
            Ok(())
        }
        Cmd::Gc => {
            let mut store = app.open_store()?;
            let removed = store
                .cleanup_orphans()
                .context("Failed to remove closed tab records")?;
            println!("removed {removed} closed tab record(s)");
            Ok(())
        }
        Cmd::Convert { to, file } => convert(to, file.as_ref()),
    }
}

fn convert(to: Target, file: Option<&PathBuf>) -> Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    let output = match to {
        Target::Markdown => text_to_markdown(&input),
        Target::Text => markdown_to_text(&input),
    };
    println!("{output}");
    Ok(())
}
