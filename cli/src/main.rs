use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use arena_json::{Charset, Document, DocumentOptions, Value};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ajson", version, about = "Parse, query and re-serialize JSON documents")]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Print only the value at a dotted path, e.g. `items.0.name`.
    #[arg(long, value_name = "path")]
    get: Option<String>,

    /// Charset of string content: utf-8, latin1, ascii (default: utf-8).
    #[arg(long, value_name = "name")]
    charset: Option<Charset>,

    /// JSON file with document options (nodeCapacity, bufferCapacity, charset).
    #[arg(long, value_name = "file")]
    config: Option<String>,

    /// Initial number of node slots.
    #[arg(long = "node-capacity", value_name = "number")]
    node_capacity: Option<usize>,

    /// Initial output buffer size in bytes.
    #[arg(long = "buffer-capacity", value_name = "number")]
    buffer_capacity: Option<usize>,

    /// Show arena statistics on stderr.
    #[arg(long)]
    stats: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let options = resolve_options(&args)?;
    let input = read_input(args.input.as_deref())?;

    let doc = arena_json::parse_with_options(&input, &options)?;
    tracing::debug!(entries = doc.len(), nodes = doc.node_count(), "parsed input");

    let output = match args.get.as_deref() {
        Some(path) => match lookup_path(&doc, path) {
            Some(value) => render(&value)?,
            None => return Err(format!("no value at path \"{path}\"").into()),
        },
        None => doc.to_bytes()?,
    };
    write_output(args.output.as_deref(), &output)?;

    if args.stats {
        eprintln!("ℹ Charset: {}", doc.charset().name());
        eprintln!("ℹ Entries: {}", doc.len());
        eprintln!("ℹ Nodes: {}", doc.node_count());
        eprintln!("ℹ Output buffer: {} bytes", doc.output_capacity());
    }
    Ok(())
}

fn resolve_options(args: &Args) -> Result<DocumentOptions, Box<dyn Error>> {
    let mut options = match args.config.as_deref() {
        Some(path) => serde_json::from_slice(&fs::read(path)?)?,
        None => DocumentOptions::default(),
    };
    if let Some(charset) = args.charset {
        options = options.with_charset(charset);
    }
    if let Some(node_capacity) = args.node_capacity {
        options = options.with_node_capacity(node_capacity);
    }
    if let Some(buffer_capacity) = args.buffer_capacity {
        options = options.with_buffer_capacity(buffer_capacity);
    }
    Ok(options)
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(fs::read(path)?),
    }
}

/// Walk a dotted path. Numeric segments index into arrays.
fn lookup_path(doc: &Document, path: &str) -> Option<Value> {
    let mut current = Value::Document(doc.clone());
    for segment in path.split('.').filter(|segment| !segment.is_empty()) {
        let doc = current.into_document()?;
        current = if doc.is_array() {
            let index: usize = segment.parse().ok()?;
            doc.iter().nth(index)?.value
        } else {
            doc.get(segment)?
        };
    }
    Some(current)
}

fn render(value: &Value) -> Result<Vec<u8>, Box<dyn Error>> {
    Ok(match value {
        Value::Null => b"null".to_vec(),
        Value::Text(text) | Value::Literal(text) => text.as_bytes().to_vec(),
        Value::Document(doc) => doc.to_bytes()?,
    })
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) if path != "-" => fs::write(path, data)?,
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)?;
        }
    }
    Ok(())
}
