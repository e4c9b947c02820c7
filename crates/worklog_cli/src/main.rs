//! `worklog` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto engine services over a SQLite database.
//! - Report failures on stderr with a non-zero exit code.

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use worklog_core::db::open_db;
use worklog_core::{
    format_workload, init_from_config, parse_day, parse_workload, BulkMutationService,
    BulkUpdateRequest, CoreConfig, SqliteWorkLogStore, TagService, WorkLogQuery, WorkLogRecord,
    WorkLogService,
};

/// worklog: query and bulk-tag work-log records
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, short, env = "WORKLOG_CONFIG")]
    config: Option<PathBuf>,
    /// SQLite database file; overrides `database_path` from the config.
    #[arg(long, env = "WORKLOG_DB")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Counts records matched by a query (e.g. `!employee=john.doe+!date=2019:04`).
    Validate { query: String },
    /// Adds and removes tags on every record matched by a query.
    BulkUpdate {
        /// Space-separated query, e.g. `#nvm *john.doe @2019/04`.
        #[arg(long, short)]
        query: String,
        /// Tag expression, e.g. `+#done -#in-progress`.
        #[arg(long, short)]
        expression: String,
        /// Acting user; must own every matched record.
        #[arg(long, short, env = "WORKLOG_USER")]
        user: String,
    },
    /// Lists records matched by a query.
    List {
        #[arg(default_value = "")]
        query: String,
    },
    /// Lists known tags, optionally only from `--from` (YYYY/MM/DD) onward.
    Tags {
        #[arg(long)]
        from: Option<String>,
    },
    /// Suggests tag combinations from a user's recent history.
    Presets {
        user: String,
        #[arg(long, short)]
        limit: Option<usize>,
    },
    /// Records a work-log entry.
    Add {
        #[arg(long, short)]
        employee: String,
        /// Day in YYYY/MM/DD form; defaults to today.
        #[arg(long, short)]
        day: Option<String>,
        /// Duration such as `1d 2h 30m`, `1h` or `45m`.
        #[arg(long, short)]
        workload: String,
        #[arg(long, short, num_args(1..))]
        tags: Vec<String>,
        #[arg(long, short)]
        note: Option<String>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("worklog: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_from_config(&config).context("failed to initialize logging")?;

    let db_path = cli.db.unwrap_or(config.database_path);
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let conn = &conn;
    let store = move || SqliteWorkLogStore::try_new(conn);
    info!("event=cli_command module=cli status=start");

    match cli.command {
        Command::Validate { query } => {
            let matched = BulkMutationService::new(store()?).validate_query(&query)?;
            println!("{matched}");
        }
        Command::BulkUpdate {
            query,
            expression,
            user,
        } => {
            let request = BulkUpdateRequest { query, expression };
            let modified = BulkMutationService::new(store()?).bulk_update(&request, &user)?;
            println!("{modified}");
        }
        Command::List { query } => {
            let criteria = WorkLogQuery::from_query_string(&query)?.to_search_criteria();
            let records = WorkLogService::new(store()?).find_matching(&criteria)?;
            for record in records {
                println!(
                    "{}  {:<16} {:>8}  {}",
                    record.day,
                    record.employee_id,
                    format_workload(record.workload_minutes),
                    record.tags.join(" ")
                );
            }
        }
        Command::Tags { from } => {
            let from = from.as_deref().map(parse_day_arg).transpose()?;
            for tag in TagService::new(store()?).find_all(from)? {
                println!("{tag}");
            }
        }
        Command::Presets { user, limit } => {
            let today = Local::now().date_naive();
            let service = TagService::with_config(store()?, config.presets);
            for preset in service.find_presets(&user, limit, today)? {
                println!("{}", preset.join(" "));
            }
        }
        Command::Add {
            employee,
            day,
            workload,
            tags,
            note,
        } => {
            let day = match day.as_deref() {
                Some(value) => parse_day_arg(value)?,
                None => Local::now().date_naive(),
            };
            let minutes = parse_workload(&workload)?;
            let mut record = WorkLogRecord::new(employee, day, minutes, tags);
            if let Some(note) = note {
                record = record.with_note(note);
            }
            let id = store()?.insert_record(&record)?;
            println!("{id}");
        }
    }
    Ok(())
}

fn parse_day_arg(value: &str) -> Result<NaiveDate> {
    parse_day(value).ok_or_else(|| anyhow!("invalid day `{value}`, expected YYYY/MM/DD"))
}
