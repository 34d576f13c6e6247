//! Tributary command-line interface.
//!
//! Replays a JSON-lines event log through an incremental join and prints every output
//! delta as it is produced. Each line names the input it belongs to:
//!
//! ```text
//! {"side": "left", "polarity": "addition", "bindings": {"a": "<http://example.org/1>"}}
//! {"side": "right", "polarity": "retraction", "bindings": {"a": "<http://example.org/1>"}}
//! ```

use clap::Parser;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tributary::core::{Bindings, BindingsRecord};
use tributary::sources;
use tributary::stream::operators::{JoinKind, JoinSide, ReadResult};
use tributary::{Error, JoinConfig, MaterializedView, Result};

#[derive(Parser, Debug)]
#[command(name = "tributary")]
#[command(
    about = "Replay an addition/retraction event log through an incremental join",
    long_about = None
)]
struct Args {
    /// JSON-lines event log
    #[arg(short, long)]
    events: PathBuf,

    /// JSON join configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Join kind: nested-loop, hash, optional or minus (overrides the configuration)
    #[arg(short, long)]
    kind: Option<JoinKind>,

    /// Join variable, repeatable (overrides the configuration)
    #[arg(long = "join-var")]
    join_vars: Vec<String>,

    /// Print the final materialized view after the deltas
    #[arg(long, default_value = "false")]
    materialize: bool,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    side: JoinSide,
    #[serde(flatten)]
    row: BindingsRecord,
}

fn read_events(path: &Path) -> Result<Vec<(JoinSide, Bindings)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: EventRecord = serde_json::from_str(trimmed)
            .map_err(|e| Error::Serialization(format!("line {}: {}", number + 1, e)))?;
        events.push((record.side, Bindings::try_from(record.row)?));
    }
    Ok(events)
}

/// Variables bound anywhere on each side, for configurations without schemas.
fn infer_schemas(events: &[(JoinSide, Bindings)]) -> (Vec<String>, Vec<String>) {
    let mut left = BTreeSet::new();
    let mut right = BTreeSet::new();
    for (side, row) in events {
        let target = match side {
            JoinSide::Left => &mut left,
            JoinSide::Right => &mut right,
        };
        target.extend(row.variables().map(|v| v.as_str().to_string()));
    }
    (left.into_iter().collect(), right.into_iter().collect())
}

fn write_delta(out: &mut impl Write, delta: &Bindings) -> Result<()> {
    writeln!(out, "{}", BindingsRecord::from(delta).to_json()?)?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => JoinConfig::from_file(path)?,
        None => JoinConfig::default(),
    };
    if let Some(kind) = args.kind {
        config.kind = kind;
    }
    if !args.join_vars.is_empty() {
        config.join_variables = Some(args.join_vars.clone());
    }

    let events = read_events(&args.events)?;
    info!("Loaded {} events from {}", events.len(), args.events.display());

    if config.join_variables.is_none()
        && config.left_variables.is_empty()
        && config.right_variables.is_empty()
    {
        let (left, right) = infer_schemas(&events);
        debug!("Inferred schemas: left {:?}, right {:?}", left, right);
        config.left_variables = left;
        config.right_variables = right;
    }

    let (left_tx, left_rx) = sources::channel();
    let (right_tx, right_rx) = sources::channel();
    let mut join = config.builder()?.build(sources::boxed(left_rx), sources::boxed(right_rx))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut view = MaterializedView::new();

    for (side, row) in events {
        match side {
            JoinSide::Left => left_tx.send(row)?,
            JoinSide::Right => right_tx.send(row)?,
        }
        for delta in join.drain_available()? {
            write_delta(&mut out, &delta)?;
            view.apply(&delta);
        }
    }

    left_tx.end();
    right_tx.end();
    loop {
        match join.try_read()? {
            ReadResult::Row(delta) => {
                write_delta(&mut out, &delta)?;
                view.apply(&delta);
            }
            ReadResult::Ended => break,
            ReadResult::Pending => {
                warn!("Join still pending after both sources ended");
                break;
            }
        }
    }

    let stats = join.stats();
    info!(
        "{} join consumed {} left / {} right events, emitted {} deltas ({} ignored retractions)",
        config.kind,
        stats.left_events,
        stats.right_events,
        stats.emitted(),
        stats.ignored_retractions
    );

    if args.materialize {
        writeln!(out, "# materialized view: {} rows", view.len())?;
        for record in view.to_records() {
            writeln!(out, "{}", record.to_json()?)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
