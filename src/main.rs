use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "cfgvault")]
#[command(about = "Backup and restore configuration for AI CLI tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a vendor's configuration directory
    Backup {
        /// Vendor to back up (claude, gemini, codex, cursor, aider)
        vendor: Option<String>,
        /// Back up every installed vendor
        #[arg(short, long)]
        all: bool,
        /// Back up this directory instead of the vendor's default
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
    /// List existing backups
    List {
        /// Only list backups for this vendor
        vendor: Option<String>,
    },
    /// Verify a backup archive against its recorded checksum
    Verify {
        /// Path to the backup archive
        archive: PathBuf,
    },
    /// Restore a backup archive over a vendor's configuration
    Restore {
        /// Backup archive path, or a vendor id for its newest backup
        archive: PathBuf,
        /// Restore into this directory instead of the vendor's default
        #[arg(short, long)]
        dest: Option<PathBuf>,
        /// Skip the automatic backup of the current state
        #[arg(long)]
        no_pre_backup: bool,
        /// Show what would be restored without writing anything
        #[arg(short, long)]
        preview: bool,
    },
    /// Restore only selected subdirectories from a backup archive
    RestoreDirs {
        /// Path to the backup archive
        archive: PathBuf,
        /// Subdirectory names to restore
        names: Vec<String>,
        /// Restore into this directory instead of the vendor's default
        #[arg(short, long)]
        dest: Option<PathBuf>,
        /// List restorable subdirectories instead of restoring
        #[arg(short, long)]
        list: bool,
    },
    /// Roll back to a pre-restore backup
    Rollback {
        /// Path to the pre-restore backup archive
        archive: PathBuf,
        /// Roll back this directory instead of the vendor's default
        #[arg(short, long)]
        dest: Option<PathBuf>,
    },
    /// Delete a backup archive and its manifest entry
    Delete {
        /// Path to the backup archive
        archive: PathBuf,
    },
    /// Show supported vendors and whether they are installed
    Vendors,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Backup {
            vendor,
            all,
            source,
        } => cli::backup::run(vendor, all, source),
        Commands::List { vendor } => cli::list::run(vendor),
        Commands::Verify { archive } => cli::verify::run(archive),
        Commands::Restore {
            archive,
            dest,
            no_pre_backup,
            preview,
        } => cli::restore::run(archive, dest, no_pre_backup, preview),
        Commands::RestoreDirs {
            archive,
            names,
            dest,
            list,
        } => cli::restore_dirs::run(archive, names, dest, list),
        Commands::Rollback { archive, dest } => cli::rollback::run(archive, dest),
        Commands::Delete { archive } => cli::delete::run(archive),
        Commands::Vendors => cli::vendors::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
