use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

pub mod commands;

use crate::output::OutputMode;

/// Read a line from stdin, handling terminal focus loss issues on Windows.
/// Gets a fresh handle each time so a terminal that lost and regained focus
/// does not leave stdin in a stale state.
pub(crate) fn read_line_from_stdin() -> io::Result<String> {
    // Flush stdout to ensure prompt is visible before reading
    io::stdout().flush()?;

    use std::io::BufRead;

    let mut input = String::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();
    handle.read_line(&mut input)?;

    Ok(input)
}

#[derive(Parser)]
#[command(name = "unitscan")]
#[command(version)]
#[command(about = "Index PLC program files across location/unit directories")]
#[command(
    long_about = "Unitscan walks a two-level location/unit directory tree, records which \
    program file (.ACD/.RSS) and quick-panel file (.MER) each unit carries, and keeps the \
    results between runs.\n\n\
    Examples:\n  \
    unitscan scan --root D:\\Plants        # Index every unit directory\n  \
    unitscan list --missing-mer           # Units without a quick-panel file\n  \
    unitscan list --tree                  # Location/unit tree of the results\n  \
    unitscan duplicates                   # Directories with more than one program file\n  \
    unitscan cleanup --dry-run            # Preview the archive/recycle batch\n  \
    unitscan note Greeley LACT-1 \"rebuilt after lightning strike\""
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk the tree and replace the stored results (notes are kept)
    #[command(visible_alias = "s")]
    Scan {
        /// Root of the location/unit tree (default: paths.scan_root from config)
        #[arg(long, value_name = "PATH")]
        root: Option<PathBuf>,

        /// Output results as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show stored results, optionally filtered or as a tree
    #[command(visible_alias = "ls")]
    List {
        /// Only rows for this location
        #[arg(long, value_name = "LOCATION")]
        location: Option<String>,

        /// Only rows for this unit (requires --location)
        #[arg(long, value_name = "UNIT")]
        unit: Option<String>,

        /// Only rows whose quick-panel (.MER) file is missing
        #[arg(long, conflicts_with = "missing_program")]
        missing_mer: bool,

        /// Only rows whose program file is missing
        #[arg(long)]
        missing_program: bool,

        /// Location/unit tree with row counts instead of the table
        #[arg(
            long,
            conflicts_with_all = ["location", "unit", "missing_mer", "missing_program", "json"]
        )]
        tree: bool,

        /// Output results as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show every stored row for one unit, plus its note
    Show {
        /// Location segment, as shown by list
        location: String,

        /// Unit segment, as shown by list
        unit: String,
    },

    /// Read, set, or clear the free-text note for a unit
    Note {
        /// Location segment, as shown by list
        location: String,

        /// Unit segment, as shown by list
        unit: String,

        /// Note text; omit to print the current note
        text: Option<String>,

        /// Remove the note
        #[arg(long, conflicts_with = "text")]
        clear: bool,
    },

    /// List directories holding more than one program file, plus all bak files
    #[command(visible_alias = "dups")]
    Duplicates {
        /// Root of the location/unit tree (default: paths.scan_root from config)
        #[arg(long, value_name = "PATH")]
        root: Option<PathBuf>,

        /// Output results as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Archive duplicate program files and recycle bak files, then rescan
    Cleanup {
        /// Root of the location/unit tree (default: paths.scan_root from config)
        #[arg(long, value_name = "PATH")]
        root: Option<PathBuf>,

        /// Flat directory that receives archived files (default: paths.archive_root)
        #[arg(long, value_name = "PATH")]
        archive_root: Option<PathBuf>,

        /// Preview only, don't move or delete anything
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt (use with caution!)
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Move a single file into the flat archive
    Archive {
        /// The file to archive
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Flat directory that receives the file (default: paths.archive_root)
        #[arg(long, value_name = "PATH")]
        archive_root: Option<PathBuf>,
    },

    /// View or reset configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,

        /// Print the config file path and nothing else
        #[arg(long)]
        path: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn run(self) -> anyhow::Result<()> {
        let output_mode = if self.quiet {
            OutputMode::Quiet
        } else if self.verbose >= 2 {
            OutputMode::VeryVerbose
        } else if self.verbose == 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        };

        match self.command {
            Commands::Scan { root, json } => {
                commands::scan_command::handle_scan(root, json, output_mode)
            }
            Commands::List {
                location,
                unit,
                missing_mer,
                missing_program,
                tree,
                json,
            } => commands::list_command::handle_list(
                location,
                unit,
                missing_mer,
                missing_program,
                tree,
                json,
                output_mode,
            ),
            Commands::Show { location, unit } => {
                commands::show_command::handle_show(location, unit)
            }
            Commands::Note {
                location,
                unit,
                text,
                clear,
            } => commands::note_command::handle_note(location, unit, text, clear, output_mode),
            Commands::Duplicates { root, json } => {
                commands::duplicates_command::handle_duplicates(root, json, output_mode)
            }
            Commands::Cleanup {
                root,
                archive_root,
                dry_run,
                yes,
            } => commands::cleanup_command::handle_cleanup(
                root,
                archive_root,
                dry_run,
                yes,
                output_mode,
            ),
            Commands::Archive { file, archive_root } => {
                commands::archive_command::handle_archive(file, archive_root, output_mode)
            }
            Commands::Config { show, reset, path } => {
                commands::config_command::handle_config(show, reset, path)
            }
        }
    }
}
