//! Standalone reference repair: asks for the database file, backs it up and
//! rewrites composition details that point at nonexistent fragrances.

use anyhow::Context;
use perfumery_maint::utils::{logger, prompt};
use perfumery_maint::{app, JobRunner, RepairJob};
use std::io;

fn main() -> anyhow::Result<()> {
    logger::init_cli_logger(false);

    let stdin = io::stdin();
    let store = prompt::prompt_path(
        &mut stdin.lock(),
        &mut io::stdout(),
        "Full path to the parfumerie.db file",
    )
    .context("no database path given")?;

    let exit_code = app::finish(JobRunner::new(RepairJob::new(store)).run());
    std::process::exit(exit_code);
}
