use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use influxql_route::{influxql, route_file, route_query, Route, RouteOptions};

#[derive(Parser)]
#[command(name = "influxql-route")]
#[command(author, version, about = "Inspect InfluxQL statements for shard routing")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Defaults {
    /// Database used when the statement does not name one
    #[arg(long, default_value = "")]
    default_database: String,

    /// Retention policy used when the statement does not name one
    #[arg(long, default_value = "")]
    default_retention_policy: String,
}

impl From<Defaults> for RouteOptions {
    fn from(d: Defaults) -> Self {
        RouteOptions {
            default_database: d.default_database,
            default_retention_policy: d.default_retention_policy,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a statement, one per line
    Tokens {
        query: String,
    },

    /// Report whether a statement is routable and needs a target lookup
    Classify {
        query: String,
    },

    /// Classify a statement and extract its database, retention policy and measurement
    Route {
        query: String,

        #[command(flatten)]
        defaults: Defaults,
    },

    /// Route every statement in a file (one per line)
    Batch {
        /// Path to the query file
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        defaults: Defaults,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_route(route: &Route) {
    println!("supported: {}", route.supported);
    println!("needs_target: {}", route.needs_target);
    if let Some(target) = &route.target {
        println!("database: {}", target.database);
        println!("retention_policy: {}", target.retention_policy);
        println!("measurement: {}", target.measurement);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tokens { query } => {
            for token in influxql::try_scan_tokens(&query)? {
                println!("{}", token);
            }
        }
        Commands::Classify { query } => {
            let c = influxql::classify(&query);
            println!("supported: {}", c.supported);
            println!("needs_target: {}", c.needs_target);
        }
        Commands::Route { query, defaults } => {
            let route = route_query(&query, &defaults.into())?;
            print_route(&route);
        }
        Commands::Batch { file, defaults } => {
            for (query, result) in route_file(&file, &defaults.into())? {
                println!("{}", query);
                match result {
                    Ok(route) => print_route(&route),
                    Err(err) => println!("error: {}", err),
                }
                println!();
            }
        }
    }

    Ok(())
}
