//! Strata CLI - query banking data through the data access layer
//!
//! Usage:
//!   strata query --entity <entity> [--metric <m>]... [--filter k=v]... [--aggregation <a>]...
//!   strata query --json '<descriptor>'
//!   strata sql --entity <entity> [--dialect <dialect>]
//!   strata exec <sql>
//!   strata schema <table>
//!   strata tables
//!   strata info
//!   strata providers
//!
//! Examples:
//!   strata query --entity loans --metric count --filter status=default
//!   strata --provider snowflake query --entity deposits --aggregation by_type
//!   strata sql --entity loans --metric sum --start 2024-07-01 --end 2024-09-30 --dialect snowflake

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use strata::compile::{QueryCompiler, QueryDescriptor, Scalar, TimePeriod};
use strata::config::Settings;
use strata::factory::ProviderFactory;
use strata::sql::Dialect;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata - backend-agnostic banking data access")]
#[command(version)]
struct Cli {
    /// Data provider (local or snowflake); defaults to the configured provider
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Path to a strata.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a structured query and print the result envelope
    Query(DescriptorArgs),

    /// Print the SQL a structured query compiles to, without connecting
    Sql {
        #[command(flatten)]
        descriptor: DescriptorArgs,

        /// SQL dialect to generate
        #[arg(short, long, default_value = "sqlite")]
        dialect: DialectArg,

        /// Render parameter values inline instead of placeholders
        #[arg(long)]
        inline: bool,
    },

    /// Execute raw SQL
    Exec {
        /// SQL statement
        sql: String,
    },

    /// Show the columns of a table
    Schema {
        /// Table name
        table: String,
    },

    /// List the available tables
    Tables,

    /// Show connection details
    Info,

    /// List the providers usable with the current configuration
    Providers,
}

#[derive(Args)]
struct DescriptorArgs {
    /// Full descriptor as JSON
    #[arg(long, conflicts_with = "entity")]
    json: Option<String>,

    /// Entity to query (loans, deposits, customers)
    #[arg(short, long, required_unless_present = "json")]
    entity: Option<String>,

    /// Metric to compute (count, sum, average, default_rate)
    #[arg(short, long)]
    metric: Vec<String>,

    /// Equality filter as column=value; quote the value to keep it text
    #[arg(short, long, value_parser = parse_filter)]
    filter: Vec<(String, Scalar)>,

    /// Grouping (by_category, by_type)
    #[arg(short, long)]
    aggregation: Vec<String>,

    /// Free-form period label
    #[arg(long)]
    label: Option<String>,

    /// Quarter, e.g. Q3 (used with --year)
    #[arg(long)]
    quarter: Option<String>,

    #[arg(long)]
    year: Option<String>,

    /// Inclusive start date
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Inclusive end date
    #[arg(long, requires = "start")]
    end: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Sqlite,
    Snowflake,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Snowflake => Dialect::Snowflake,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("strata=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strata=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, Box<dyn Error>> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?.with_env(),
        None => Settings::load()?,
    };
    Ok(settings)
}

fn run(cli: Cli) -> CliResult {
    if let Commands::Sql {
        descriptor,
        dialect,
        inline,
    } = &cli.command
    {
        return cmd_sql(descriptor, (*dialect).into(), *inline);
    }

    let settings = load_settings(cli.config.as_ref())?;
    let factory = ProviderFactory::new(&settings);

    if let Commands::Providers = cli.command {
        return print_json(&factory.get_available_providers());
    }

    let selection = factory.create(cli.provider.as_deref());
    if let Some(reason) = &selection.fallback {
        eprintln!(
            "Note: using {} instead of '{}' ({})",
            selection.provider, selection.requested, reason
        );
    }
    let session = selection.open()?;

    match cli.command {
        Commands::Query(args) => {
            let descriptor = args.to_descriptor()?;
            let envelope = session.execute_structured_query(&descriptor);
            print_json(&envelope.to_json())
        }
        Commands::Exec { sql } => {
            let result = session.execute_query(&sql, &[])?;
            print_json(&result.records())
        }
        Commands::Schema { table } => print_json(&session.get_table_schema(&table)?),
        Commands::Tables => print_json(&session.get_available_tables()?),
        Commands::Info => print_json(&session.get_connection_info()),
        Commands::Sql { .. } | Commands::Providers => Ok(()),
    }
}

fn cmd_sql(args: &DescriptorArgs, dialect: Dialect, inline: bool) -> CliResult {
    let descriptor = args.to_descriptor()?;
    let compiled = QueryCompiler::new(dialect).compile(&descriptor);

    if inline {
        println!("{}", compiled.inline_sql());
        return Ok(());
    }

    let params: Vec<Value> = compiled.params.iter().map(Value::from).collect();
    print_json(&json!({
        "dialect": compiled.dialect.to_string(),
        "sql": compiled.sql,
        "params": params,
    }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl DescriptorArgs {
    fn to_descriptor(&self) -> Result<QueryDescriptor, Box<dyn Error>> {
        if let Some(json) = &self.json {
            return Ok(QueryDescriptor::from_json(json)?);
        }

        let mut descriptor = QueryDescriptor::new(self.entity.clone().unwrap_or_default());
        for metric in &self.metric {
            descriptor = descriptor.metric(metric.as_str());
        }
        for (column, value) in &self.filter {
            descriptor = descriptor.filter(column.clone(), value.clone());
        }
        for aggregation in &self.aggregation {
            descriptor = descriptor.aggregation(aggregation.as_str());
        }

        let period = TimePeriod {
            label: self.label.clone(),
            quarter: self.quarter.as_deref().map(parse_scalar),
            year: self.year.as_deref().map(parse_scalar),
            start: self.start.as_deref().map(Scalar::from),
            end: self.end.as_deref().map(Scalar::from),
        };
        if period != TimePeriod::default() {
            descriptor = descriptor.time_period(period);
        }

        Ok(descriptor)
    }
}

/// Parse `column=value`. The value is read as a JSON scalar when it is one
/// (`42`, `1.5`, `true`, `"00012"`) and as text otherwise.
fn parse_filter(s: &str) -> Result<(String, Scalar), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{}'", s))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", s));
    }
    Ok((column.to_string(), parse_scalar(value.trim())))
}

/// JSON number grammar has no leading zeros, `NaN` or `inf`, so ids and
/// names like those stay text.
fn parse_scalar(s: &str) -> Scalar {
    serde_json::from_str(s).unwrap_or_else(|_| Scalar::Text(s.to_string()))
}
