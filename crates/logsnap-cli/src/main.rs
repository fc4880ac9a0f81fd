use std::fs::File;
use std::io::{Read, stdin};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use logsnap::{ContextBag, LogArg, Options, Snapshotter};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "logsnap-cli",
    about = "Print the bounded log snapshot of a JSON document",
    version
)]
struct Args {
    /// Maximum leaf fields before the snapshot collapses to text
    /// (defaults to LOGSNAP_MAX_FIELDS, then 50)
    #[arg(long)]
    max_fields: Option<usize>,

    /// Also snapshot bare strings, numbers and booleans
    #[arg(long, default_value_t = false)]
    simple: bool,

    /// Context entry as KEY=JSON (repeatable)
    #[arg(long = "context", value_name = "KEY=JSON")]
    context: Vec<String>,

    /// Pretty-print the snapshot
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Normalize a URL path instead of reading a document
    #[arg(long, value_name = "URL")]
    clean_url: Option<String>,

    /// Input file (defaults to stdin)
    input: Option<PathBuf>,
}

fn parse_context(raw: &[String]) -> Result<Vec<(String, Value)>> {
    raw.iter()
        .map(|entry| {
            let Some((key, json)) = entry.split_once('=') else {
                bail!("context entry `{entry}` is not KEY=JSON");
            };
            // Anything that is not JSON is taken as a plain string.
            let value = serde_json::from_str(json).unwrap_or_else(|_| Value::from(json));
            Ok((key.to_string(), value))
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(url) = &args.clean_url {
        println!("{}", logsnap::clean_partial_url(url));
        return Ok(());
    }

    let mut options = Options::from_env()?;
    if let Some(max_fields) = args.max_fields {
        if max_fields == 0 {
            bail!("--max-fields must be positive");
        }
        options.max_fields = max_fields;
    }

    let mut buf = String::new();
    match &args.input {
        Some(path) => {
            let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            f.read_to_string(&mut buf)?;
        }
        None => {
            stdin().read_to_string(&mut buf)?;
        }
    }
    let value: Option<Value> = if buf.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(&buf).context("input is not JSON")?)
    };

    let entries = parse_context(&args.context)?;
    let bag: ContextBag<'_> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v as &dyn LogArg))
        .collect();

    tracing::debug!(max_fields = options.max_fields, context = bag.len(), "snapshotting input");
    let snap = Snapshotter::new(options);
    let out = snap.serialize_debug_data(
        value.as_ref().map(|v| v as &dyn LogArg),
        args.simple,
        Some(&bag),
    );
    match out {
        Some(json) if args.pretty => {
            let v: Value = serde_json::from_str(&json)?;
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
        Some(json) => println!("{}", json),
        None => println!("null"),
    }

    Ok(())
}
