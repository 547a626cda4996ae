use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "perfumery-maint")]
#[command(about = "Maintenance jobs for the perfumery database")]
pub struct CliConfig {
    /// Path to an optional TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Repair composition details that point at nonexistent fragrances
    Repair {
        /// Database file (prompted for when missing)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Show the planned remapping without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Clear the database and reload it from the spreadsheet exports
    Reimport {
        /// Database file (prompted for when missing)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Directory holding Kunden, Düfte and Zusammenstellungen exports
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Run the whole reimport in one transaction
        #[arg(long)]
        atomic: bool,
    },

    /// List customers whose compositions reference missing fragrances
    Audit {
        /// Database file (prompted for when missing)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Create the perfumery tables in a new or existing database file
    Init {
        #[arg(long)]
        db: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reimport() {
        let cli = CliConfig::parse_from([
            "perfumery-maint",
            "reimport",
            "--db",
            "parfumerie.db",
            "--dir",
            "exporte",
            "--atomic",
        ]);

        match cli.command {
            Command::Reimport { db, dir, atomic } => {
                assert_eq!(db, Some(PathBuf::from("parfumerie.db")));
                assert_eq!(dir, Some(PathBuf::from("exporte")));
                assert!(atomic);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::parse_from(["perfumery-maint", "repair", "--dry-run", "-v"]);

        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Repair {
                db: None,
                dry_run: true
            }
        ));
    }
}
