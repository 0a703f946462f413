use clap::Parser;
use regex::bytes::Regex;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::process;
use std::thread;

use rdb_decode::filter::Simple;
use rdb_decode::pipeline::{self, PipelineConfig, Stats};
use rdb_decode::{RdbResult, RdbValueDecoder, Type};

const READER_BUFFER_SIZE: usize = 1024 * 1024;
const WRITER_BUFFER_SIZE: usize = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "rdb-decode",
    version,
    about = "Decode a Redis RDB dump into JSON lines"
)]
struct Cli {
    /// Dump to read, standard input when absent or empty
    #[arg(short, long)]
    input: Option<String>,

    /// Where to write the JSON lines, standard output when absent or empty
    #[arg(short, long)]
    output: Option<String>,

    /// Number of decode workers
    #[arg(short, long, value_parser = parse_parallel)]
    parallel: Option<usize>,

    /// Only decode keys from this database (repeatable)
    #[arg(long = "db", alias = "databases")]
    databases: Vec<u32>,

    /// Only decode keys of this type (repeatable)
    #[arg(long = "type", value_parser = ["string", "list", "set", "sortedset", "zset", "hash"])]
    types: Vec<String>,

    /// Only decode keys matching this regular expression
    #[arg(long = "key", alias = "keys")]
    key: Option<String>,
}

fn parse_parallel(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn default_parallel() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Treats a missing or empty path as the standard stream.
fn named(path: &Option<String>) -> Option<&str> {
    path.as_deref().filter(|p| !p.is_empty())
}

fn build_filter(cli: &Cli) -> Result<Simple, String> {
    let mut filter = Simple::new();

    for db in &cli.databases {
        filter.add_database(*db);
    }

    for t in &cli.types {
        filter.add_type(t.parse::<Type>()?);
    }

    if let Some(pattern) = &cli.key {
        let re = Regex::new(pattern).map_err(|e| format!("invalid key pattern: {}", e))?;
        filter.add_keys(re);
    }

    Ok(filter)
}

fn open_input(path: Option<&str>) -> RdbResult<(Box<dyn Read + Send>, Option<u64>)> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            let size = file.metadata()?.len();
            let reader: Box<dyn Read + Send> =
                Box::new(BufReader::with_capacity(READER_BUFFER_SIZE, file));
            Ok((reader, Some(size)))
        }
        None => {
            let reader: Box<dyn Read + Send> =
                Box::new(BufReader::with_capacity(READER_BUFFER_SIZE, io::stdin()));
            Ok((reader, None))
        }
    }
}

fn open_output(path: Option<&str>) -> RdbResult<Box<dyn Write + Send>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::with_capacity(
            WRITER_BUFFER_SIZE,
            File::create(path)?,
        ))),
        None => Ok(Box::new(BufWriter::with_capacity(
            WRITER_BUFFER_SIZE,
            io::stdout(),
        ))),
    }
}

fn decode(cli: &Cli, filter: Simple) -> RdbResult<()> {
    let input_path = named(&cli.input);
    let output_path = named(&cli.output);

    log::info!(
        "decode from '{}' to '{}'",
        input_path.unwrap_or("/dev/stdin"),
        output_path.unwrap_or("/dev/stdout"),
    );

    let (input, total_size) = open_input(input_path)?;
    let output = open_output(output_path)?;

    let config = PipelineConfig {
        parallel: cli.parallel.unwrap_or_else(default_parallel),
        total_size: total_size.filter(|size| *size > 0),
        ..Default::default()
    };

    let summary = pipeline::run(
        input,
        output,
        filter,
        &RdbValueDecoder,
        &config,
        Stats::new(),
    )?;
    log::debug!("{:?}", summary);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let filter = match build_filter(&cli) {
        Ok(filter) => filter,
        Err(e) => {
            log::error!("error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = decode(&cli, filter) {
        log::error!("error: {}", e);
        process::exit(1);
    }
}
