//! Standalone reimport: asks for the database file and the export directory,
//! backs the database up, clears it and reloads it from the spreadsheets.

use anyhow::Context;
use perfumery_maint::utils::{logger, prompt};
use perfumery_maint::{app, JobRunner, ReimportJob};
use std::io;

fn main() -> anyhow::Result<()> {
    logger::init_cli_logger(false);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let store = prompt::prompt_path(&mut input, &mut output, "Full path to the parfumerie.db file")
        .context("no database path given")?;
    let source_dir = prompt::prompt_path(
        &mut input,
        &mut output,
        "Path to the directory with the Excel files",
    )
    .context("no export directory given")?;

    let exit_code = app::finish(JobRunner::new(ReimportJob::new(store, source_dir)).run());
    std::process::exit(exit_code);
}
