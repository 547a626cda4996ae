use clap::Parser;
use perfumery_maint::config::{self, CliConfig, Command, TomlConfig};
use perfumery_maint::utils::{logger, prompt};
use perfumery_maint::{
    app, AuditJob, ImportOptions, JobRunner, MaintError, ReimportJob, RepairJob, SqliteStore,
};
use std::io;
use std::path::{Path, PathBuf};

const STORE_QUESTION: &str = "Full path to the parfumerie.db file";
const SOURCE_QUESTION: &str = "Path to the directory with the Excel files";

fn main() {
    let cli = CliConfig::parse();

    let settings = match config::load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load settings: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    logger::init_cli_logger(cli.verbose || settings.verbose());
    tracing::debug!("CLI config: {:?}", cli);

    let exit_code = match run(cli.command, &settings) {
        Ok(code) => code,
        Err(e) => app::finish::<String>(Err(e)),
    };
    std::process::exit(exit_code);
}

fn run(command: Command, settings: &TomlConfig) -> Result<i32, MaintError> {
    match command {
        Command::Repair { db, dry_run } => {
            let store = store_path(db, settings)?;
            let job = RepairJob::new(store).dry_run(dry_run);
            Ok(app::finish(JobRunner::new(job).run()))
        }
        Command::Reimport { db, dir, atomic } => {
            let store = store_path(db, settings)?;
            let source_dir = config::resolve_path(dir, settings.import_directory(), || {
                ask(SOURCE_QUESTION)
            })?;
            let options = ImportOptions {
                atomic: atomic || settings.atomic_import(),
            };
            let job = ReimportJob::new(store, source_dir).with_options(options);
            Ok(app::finish(JobRunner::new(job).run()))
        }
        Command::Audit { db } => {
            let store = store_path(db, settings)?;
            Ok(app::finish(JobRunner::new(AuditJob::new(store)).run()))
        }
        Command::Init { db } => init(&db),
    }
}

fn init(db: &Path) -> Result<i32, MaintError> {
    let store = SqliteStore::open(db)?;
    store.ensure_schema()?;
    tracing::info!("Database schema ready at {}", db.display());
    println!("✅ Database schema ready at {}", db.display());
    Ok(0)
}

fn store_path(flag: Option<PathBuf>, settings: &TomlConfig) -> Result<PathBuf, MaintError> {
    config::resolve_path(flag, settings.store_path(), || ask(STORE_QUESTION))
}

fn ask(question: &str) -> Result<PathBuf, MaintError> {
    let stdin = io::stdin();
    prompt::prompt_path(&mut stdin.lock(), &mut io::stdout(), question)
}
