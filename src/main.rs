//! folder-epub - Package a folder into an EPUB

use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use folder_epub::{
    cli::{CliHost, default_prefs_path},
    host::{FixedPicker, PromptPicker},
    plugin::{PluginConfig, STATUS_OK, run},
    types::{EntryOrder, PackOptions, PathEncoding},
};

#[derive(Parser)]
#[command(name = "folder-epub")]
#[command(version, about = "Package a folder into an EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    folder-epub Book                  Write Book.epub to the current directory
    folder-epub Book -o out --sorted  Write out/Book.epub with sorted entries
    folder-epub                       Prompt for the folder")]
struct Cli {
    /// Folder to package; prompts when omitted
    #[arg(value_name = "FOLDER")]
    folder: Option<PathBuf>,

    /// Directory the produced book is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Preference file (default: ~/.folder-epub/prefs.json)
    #[arg(long, value_name = "FILE")]
    prefs: Option<PathBuf>,

    /// Write entries sorted by path instead of directory order
    #[arg(long)]
    sorted: bool,

    /// Reject file names that are not valid Unicode
    #[arg(long)]
    strict_paths: bool,

    /// Deflate level for compressed entries
    #[arg(short = 'l', long, value_name = "LEVEL")]
    compression_level: Option<i64>,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "folder_epub=debug"
    } else {
        "folder_epub=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut options = PackOptions::default();
    if cli.sorted {
        options = options.with_order(EntryOrder::Sorted);
    }
    if cli.strict_paths {
        options = options.with_encoding(PathEncoding::Strict);
    }
    if let Some(level) = cli.compression_level {
        options = options.with_compression_level(level);
    }
    let config = PluginConfig::default().with_pack_options(options);

    let prefs_path = cli.prefs.unwrap_or_else(default_prefs_path);
    let mut host = CliHost::new(prefs_path, cli.output_dir);

    let status = match cli.folder {
        Some(folder) => run(&mut host, &mut FixedPicker::new(folder), &config),
        None => {
            let mut picker = PromptPicker::new(io::stdin().lock(), io::stderr());
            run(&mut host, &mut picker, &config)
        }
    };

    if status == STATUS_OK {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
