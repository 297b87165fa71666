use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser as ClapParser, Subcommand};
use command_line_core::{CommandSchema, ParserConfig, SymbolId, SymbolKind, SymbolTree};
use command_line_parser::{OutputFormat, Parser, format_report};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, ClapParser)]
#[command(name = "cmdline")]
#[command(about = "Parse command lines against a declarative command schema")]
#[command(version)]
struct Cli {
    /// Log parser decisions to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse one command line and print the result.
    Parse(ParseArgs),
    /// Build the symbol tree from a schema and list every symbol.
    Check(CheckArgs),
    /// Parse every line of a file in parallel and print one diagram per line.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    schema: PathBuf,
    /// Parser configuration file (YAML, or JSON with a .json extension).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value = "diagram")]
    format: OutputFormat,
    /// Parse this string instead of the trailing arguments.
    #[arg(long, conflicts_with = "args")]
    line: Option<String>,
    /// Arguments to parse, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Schema file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    schema: PathBuf,
    /// File with one command line per line.
    #[arg(long)]
    input: PathBuf,
    /// Parser configuration file (YAML, or JSON with a .json extension).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of parallel jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

/// Process outcome of a subcommand that parsed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Clean,
    ParseErrors,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args).map(|()| Outcome::Clean),
        Command::Batch(args) => run_batch(args),
    };

    match result {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::ParseErrors) => std::process::exit(2),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run_parse(args: ParseArgs) -> Result<Outcome, String> {
    let tree = load_tree(&args.schema)?;
    let config = load_config(args.config.as_deref())?;
    let parser = Parser::with_config(&tree, config);

    let result = match &args.line {
        Some(line) => parser.parse_str(line),
        None => parser.parse(&args.args),
    };
    println!("{}", format_report(&result, args.format)?.trim_end());

    if result.is_success() {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::ParseErrors)
    }
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let tree = load_tree(&args.schema)?;
    for id in tree.walk(tree.root()) {
        println!("{}", describe_symbol(&tree, id));
    }
    println!("{} symbol(s).", tree.len());
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<Outcome, String> {
    use rayon::prelude::*;

    let tree = load_tree(&args.schema)?;
    let config = load_config(args.config.as_deref())?;
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let lines: Vec<(usize, &str)> = raw
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let parser = Parser::with_config(&tree, config);
    let outcomes: Vec<(usize, String, usize)> = pool.install(|| {
        lines
            .par_iter()
            .map(|&(number, line)| {
                let result = parser.parse_str(line);
                (number, result.diagram(), result.errors().len())
            })
            .collect()
    });

    let mut failed = 0usize;
    for (number, diagram, errors) in &outcomes {
        println!("{number}: {diagram}");
        if *errors > 0 {
            failed += 1;
        }
    }
    debug!(lines = outcomes.len(), failed, "batch finished");

    if failed > 0 {
        eprintln!("{failed} of {} line(s) had parse errors.", outcomes.len());
        Ok(Outcome::ParseErrors)
    } else {
        Ok(Outcome::Clean)
    }
}

fn load_tree(path: &Path) -> Result<SymbolTree, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let schema: CommandSchema = if is_yaml(path) {
        serde_yaml::from_str(&raw)
            .map_err(|err| format!("Invalid schema YAML '{}': {err}", path.display()))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|err| format!("Invalid schema JSON '{}': {err}", path.display()))?
    };
    SymbolTree::from_schema(&schema)
        .map_err(|err| format!("Invalid schema '{}': {err}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<ParserConfig, String> {
    match path {
        Some(path) => ParserConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(ParserConfig::default()),
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// One `check` line: indentation by command depth, kind, spellings and the
/// value slot when there is one.
fn describe_symbol(tree: &SymbolTree, id: SymbolId) -> String {
    let symbol = tree.symbol(id);
    let indent = "  ".repeat(depth(tree, id));
    let mut line = format!("{indent}{} {}", symbol.kind_name(), symbol.aliases().join(", "));

    if let Some(slot) = symbol.slot() {
        line.push_str(&format!(" <{}> {}", slot.value_type(), slot.arity()));
    }
    match symbol.kind() {
        SymbolKind::Option(option) => {
            if option.is_required() {
                line.push_str(" required");
            }
            if option.is_global() {
                line.push_str(" global");
            }
            if option.is_exclusive() {
                line.push_str(" exclusive");
            }
        }
        SymbolKind::Argument(argument) if argument.is_required() => line.push_str(" required"),
        SymbolKind::Command(command) => {
            if let Some(handler) = command.handler() {
                line.push_str(&format!(" -> {handler}"));
            }
        }
        SymbolKind::Argument(_) => {}
    }
    line
}

/// Depth along first parents; the root is 0.
fn depth(tree: &SymbolTree, id: SymbolId) -> usize {
    let mut depth = 0;
    let mut current = id;
    while let Some(&parent) = tree.parents(current).first() {
        if depth > tree.len() {
            break;
        }
        depth += 1;
        current = parent;
    }
    depth
}
