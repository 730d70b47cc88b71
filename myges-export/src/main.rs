use std::{env, fs};

use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use myges_agenda::{AuditLog, DateRange, Exporter, MygesCli};

mod cli;

const LOG: &str = "LOG";

fn setup_logging() {
    if env::var(LOG).is_err() {
        env::set_var(LOG, "myges_agenda=info,myges_export=info");
    }

    pretty_env_logger::init_custom_env(LOG);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    setup_logging();

    let range = DateRange::resolve(&args.start, &args.end, Local::now().date_naive());

    let log = AuditLog::create(&args.log_file)
        .with_context(|| format!("Failed to create {}", args.log_file.display()))?;

    info!("Using `{}` as agenda source", args.program);

    let report = Exporter::new(MygesCli::new(args.program), log)
        .with_pause(args.pause)
        .run(range)
        .await?;

    println!("Total events added: {}", report.events_added());
    if report.skipped_records > 0 {
        println!("Records skipped: {}", report.skipped_records);
    }

    fs::write(&args.calendar_file, report.calendar.serialize())
        .with_context(|| format!("Failed to write {}", args.calendar_file.display()))?;

    println!("Full agenda saved to {}", args.log_file.display());
    println!("ICS file created at {}", args.calendar_file.display());

    Ok(())
}
