use serde_json::json;
use sliced_reader::client::registry::ClientRegistry;
use sliced_reader::executor::bag::PartitionedBag;
use sliced_reader::executor::types::{ProgressEvent, UnitOutcome};
use sliced_reader::reader::builder::read_search;
use sliced_reader::reader::options::{DEFAULT_NPARTITIONS, ReadOptions};
use sliced_reader::reader::types::{ClientConfig, Query};
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <query words...> [--partitions N] [--index NAME] [--host URL] [--workers N]",
            args[0]
        );
        eprintln!("Example: {} rust --index books --partitions 4", args[0]);
        eprintln!("The host defaults to $ELASTICSEARCH_URL, then http://localhost:9200");

        std::process::exit(1);
    }

    let CliArgs {
        text,
        npartitions,
        index,
        mut hosts,
        workers,
    } = parse_args(&args[1..])?;

    if hosts.is_empty() {
        if let Ok(url) = std::env::var("ELASTICSEARCH_URL") {
            hosts.push(url);
        }
    }

    let mut client = ClientConfig::default();
    if !hosts.is_empty() {
        client = client.param("hosts", hosts);
    }

    let mut options = ReadOptions::new().npartitions(npartitions).client(client);
    if let Some(index) = index {
        options = options.index(index);
    }

    let mut query = Query::new();
    query.insert(
        "query".to_string(),
        json!({ "multi_match": { "query": text } }),
    );

    let units = read_search(Some(&query), options)?;
    let mut bag = PartitionedBag::from_units(units).with_progress(print_progress);
    if let Some(workers) = workers {
        bag = bag.with_workers(workers);
    }

    println!("Partitions: {}", bag.npartitions());

    let clients = ClientRegistry::with_defaults();
    let count = bag.count(&clients).await?;

    eprintln!();
    println!("Result: {}", count);

    Ok(())
}

#[derive(Debug)]
struct CliArgs {
    text: String,
    npartitions: u32,
    index: Option<String>,
    hosts: Vec<String>,
    workers: Option<usize>,
}

/// Every word that is not a flag or a flag value is part of the query text.
fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut words: Vec<&str> = vec![];
    let mut npartitions = DEFAULT_NPARTITIONS;
    let mut index: Option<String> = None;
    let mut hosts: Vec<String> = vec![];
    let mut workers: Option<usize> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--partitions" | "--index" | "--host" | "--workers") => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow::anyhow!("{} requires a value", flag))?;
                match flag {
                    "--partitions" => npartitions = value.parse()?,
                    "--index" => index = Some(value.clone()),
                    "--host" => hosts.push(value.clone()),
                    _ => workers = Some(value.parse()?),
                }
                i += 2;
            }
            word => {
                words.push(word);
                i += 1;
            }
        }
    }

    if words.is_empty() {
        return Err(anyhow::anyhow!("missing query text"));
    }

    Ok(CliArgs {
        text: words.join(" "),
        npartitions,
        index,
        hosts,
        workers,
    })
}

fn print_progress(event: &ProgressEvent) {
    let marker = match event.outcome {
        UnitOutcome::Succeeded { .. } => "ok",
        UnitOutcome::Failed { .. } => "failed",
    };
    eprint!(
        "\r[{:>3.0}%] {}/{} partitions (slice {} {})",
        event.fraction() * 100.0,
        event.completed,
        event.total,
        event.slice,
        marker
    );
    let _ = std::io::stderr().flush();
}
