use std::env;
use std::path::PathBuf;
use std::process;

use getopts::Options;
use tokio::time::Duration;

const DEFAULT_START: &str = "2024-01-01";
const DEFAULT_END: &str = "2024-12-31";
const DEFAULT_PROGRAM: &str = "myges";
const DEFAULT_CALENDAR_FILE: &str = "myges_calendar.ics";
const DEFAULT_LOG_FILE: &str = "full_agenda.log";
const DEFAULT_PAUSE_MS: u64 = 1000;

#[derive(Debug, PartialEq)]
pub struct Args {
    pub start: String,
    pub end: String,
    pub program: String,
    pub calendar_file: PathBuf,
    pub log_file: PathBuf,
    pub pause: Duration,
}

#[derive(Debug, PartialEq)]
enum Parsed {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "s",
        "start",
        "First day to export, YYYY-MM-DD [Env: START_DATE, Default: 2024-01-01]",
        "DATE",
    );
    opts.optopt(
        "e",
        "end",
        "Last day to export, YYYY-MM-DD [Env: END_DATE, Default: 2024-12-31]",
        "DATE",
    );
    opts.optopt(
        "b",
        "bin",
        "myges executable to run [Env: MYGES_BIN, Default: myges]",
        "PROGRAM",
    );
    opts.optopt(
        "o",
        "output",
        "Calendar file to write [Env: MYGES_CALENDAR_FILE, Default: myges_calendar.ics]",
        "FILE",
    );
    opts.optopt(
        "l",
        "log-file",
        "Raw agenda log to write [Env: MYGES_LOG_FILE, Default: full_agenda.log]",
        "FILE",
    );
    opts.optopt(
        "p",
        "pause",
        "Delay between two weeks [Default: 1000]",
        "MILLISECONDS",
    );
    opts
}

fn try_parse<F>(args: Vec<String>, var: F) -> Result<Parsed, String>
where
    F: Fn(&str) -> Option<String>,
{
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let value = |name: &str, key: &str, default: &str| {
        matches
            .opt_str(name)
            .or_else(|| var(key))
            .unwrap_or_else(|| default.to_string())
    };

    let pause = match matches.opt_get_default("pause", DEFAULT_PAUSE_MS) {
        Ok(millis) => Duration::from_millis(millis),
        Err(err) => return Err(format!("Provided value for option 'pause' is invalid: {err}")),
    };

    Ok(Parsed::Run(Args {
        start: value("start", "START_DATE", DEFAULT_START),
        end: value("end", "END_DATE", DEFAULT_END),
        program: value("bin", "MYGES_BIN", DEFAULT_PROGRAM),
        calendar_file: value("output", "MYGES_CALENDAR_FILE", DEFAULT_CALENDAR_FILE).into(),
        log_file: value("log-file", "MYGES_LOG_FILE", DEFAULT_LOG_FILE).into(),
        pause,
    }))
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args, |key| env::var(key).ok()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
