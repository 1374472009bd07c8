//! influxql: build InfluxQL statements from the command line
//!
//! # Usage
//!
//! ```bash
//! # A select with filters and a time bucket
//! influxql select --from cpu --field 'mean(value)' --where host=server01 --every 1h
//!
//! # Remove points in a range
//! influxql delete --from cpu --start 2015-06-06T00:00:00Z --end 2015-06-07T00:00:00Z
//!
//! # Register a continuous query
//! influxql cq --name 1h_clicks --database test --from clicks --field 'count(col)' --every 1h --into clicks.1h
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use influxql::config::Config;
use influxql::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "influxql")]
#[command(version)]
#[command(about = "Build InfluxQL statements", long_about = None)]
#[command(after_help = "EXAMPLES:
    influxql select --from x --field 'count(a)' --where g__lt=4 --group-by a --every 1h --fill
    influxql delete --from series --start 20 --end 40
    influxql functions")]
struct Cli {
    /// Config file (defaults to ./influxql.toml, then the user config dir)
    #[arg(long, global = true, env = "INFLUXQL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a SELECT statement
    Select(SelectArgs),
    /// Build a DELETE statement
    Delete(FilterArgs),
    /// Build a CREATE CONTINUOUS QUERY statement
    Cq {
        /// Continuous query name
        #[arg(long)]
        name: String,

        /// Database to register on (defaults to the config value)
        #[arg(long)]
        database: Option<String>,

        #[command(flatten)]
        select: SelectArgs,
    },
    /// List the aggregate functions
    Functions,
}

/// Source, filters and time range shared by every statement.
#[derive(Args)]
struct FilterArgs {
    /// Measurement to read from (defaults to the config value)
    #[arg(long)]
    from: Option<String>,

    /// Filter as KEY=VALUE, e.g. host=server01 or value__gt=5
    #[arg(long = "where", value_name = "KEY=VALUE")]
    filters: Vec<String>,

    /// Filters as a JSON object
    #[arg(long = "filters", value_name = "JSON")]
    filters_json: Option<String>,

    /// Lower time bound (exclusive)
    #[arg(long)]
    start: Option<String>,

    /// Upper time bound (exclusive)
    #[arg(long)]
    end: Option<String>,
}

#[derive(Args)]
struct SelectArgs {
    /// Select expression, e.g. 'count(a)' or 'sum(b) as total'
    #[arg(long = "field", value_name = "EXPR", default_value = "*")]
    fields: Vec<String>,

    #[command(flatten)]
    filter: FilterArgs,

    /// Group by column
    #[arg(long = "group-by", value_name = "COL")]
    group_by: Vec<String>,

    /// Time bucket interval, e.g. 1h
    #[arg(long, value_name = "INTERVAL")]
    every: Option<String>,

    /// Fill empty buckets with 0
    #[arg(long)]
    fill: bool,

    /// Maximum number of rows
    #[arg(long)]
    limit: Option<u64>,

    /// Series to write results into
    #[arg(long, value_name = "SERIES")]
    into: Option<String>,

    /// Ordering as FIELD[:asc|desc]
    #[arg(long, value_name = "FIELD[:DIR]")]
    order: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "influxql=debug" } else { "influxql=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    if !config.color {
        colored::control::set_override(false);
    }

    match &cli.command {
        Commands::Select(args) => {
            let query = build_select(args, &config)?;
            emit(cli.format, &query.to_influxql()?, &query)
        }
        Commands::Delete(args) => {
            let query = apply_filters(Query::new(), args, &config)?.delete();
            emit(cli.format, &query.to_influxql()?, &query)
        }
        Commands::Cq {
            name,
            database,
            select,
        } => {
            let Some(database) = database.clone().or_else(|| config.database.clone()) else {
                bail!("no database given; use --database or set `database` in the config");
            };
            let cq = ContinuousQuery::new(name.as_str(), database, build_select(select, &config)?);
            emit(cli.format, &cq.to_influxql()?, &cq)
        }
        Commands::Functions => {
            show_functions();
            Ok(())
        }
    }
}

fn build_select(args: &SelectArgs, config: &Config) -> Result<Query> {
    let fields = args
        .fields
        .iter()
        .map(|f| parse_expr(f).with_context(|| format!("bad --field '{}'", f)))
        .collect::<Result<Vec<_>>>()?;

    let mut query = apply_filters(Query::new(), &args.filter, config)?.columns(fields)?;

    if !args.group_by.is_empty() {
        query = query.group_by(args.group_by.iter().cloned());
    }
    if let Some(every) = &args.every {
        query = query.group_by_time(parse_interval(every)?);
    }
    if args.fill {
        query = query.fill();
    }
    if let Some(n) = args.limit {
        query = query.limit(n);
    }
    if let Some(series) = &args.into {
        query = query.into_series(series.as_str());
    }
    if let Some(order) = &args.order {
        let (field, direction) = order.split_once(':').unwrap_or((order.as_str(), "asc"));
        query = query.order(field, direction)?;
    }
    Ok(query)
}

fn apply_filters(mut query: Query, args: &FilterArgs, config: &Config) -> Result<Query> {
    if let Some(source) = args.from.as_ref().or(config.measurement.as_ref()) {
        query = query.from(source.as_str());
    }
    for clause in &args.filters {
        let (key, value) = parse_filter(clause)?;
        query = query.filter(key, value);
    }
    if let Some(json) = &args.filters_json {
        let value: serde_json::Value =
            serde_json::from_str(json).context("--filters is not valid JSON")?;
        query = query.filter_json(value)?;
    }
    if args.start.is_some() || args.end.is_some() {
        let start = args.start.as_deref().map(parse_literal).transpose()?;
        let end = args.end.as_deref().map(parse_literal).transpose()?;
        query = query.date_range(start, end)?;
    }
    Ok(query)
}

fn emit(format: OutputFormat, statement: &str, model: &impl serde::Serialize) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", statement.white()),
        OutputFormat::Json => {
            let out = serde_json::json!({
                "statement": statement,
                "query": model,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn show_functions() {
    println!("{}", "Aggregate functions".cyan().bold());
    println!();
    for kind in FunctionKind::ALL {
        let params = (1..=kind.arity())
            .map(|i| format!("arg{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {}({})", kind.identifier().yellow(), params);
    }
}
