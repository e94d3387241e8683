//! sql-dialect-resolver CLI - Resolve SQL dialects and inspect their capabilities.

use clap::{Parser, Subcommand};
use serde::Serialize;
use sql_dialect_resolver::{
    Capability, CapabilityDescriptor, Config, ConnectionIdentity, DialectError, DialectRegistry,
    InlineValueTable, LogicalType, ResultDescription, SqlTypeCode,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(name = "sql-dialect-resolver")]
#[command(about = "Resolve SQL dialects and inspect their capabilities")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the connection described in the configuration file
    Resolve,

    /// List registered dialects in matching order
    List,

    /// Show the composed capabilities of a dialect
    Capabilities {
        /// Dialect tag (e.g. "oracle", "mysql")
        tag: String,

        /// Product version, for version-gated dialects
        #[arg(long, default_value = "")]
        product_version: String,
    },

    /// Render an inline value table as SQL
    Inline {
        /// Comma-separated column names
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Comma-separated logical types, one per column
        #[arg(long, value_delimiter = ',', required = true)]
        types: Vec<String>,

        /// Comma-separated row values; repeat for more rows. NULL is a null value.
        #[arg(long = "row")]
        rows: Vec<String>,

        /// Column to order the result by
        #[arg(long)]
        order_by: Option<String>,

        /// Dialect tag; resolved from the configuration file when omitted
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Classify a raw column type code
    MapType {
        /// Type code, numeric (e.g. 3) or by name (e.g. DECIMAL)
        #[arg(long)]
        code: String,

        /// Declared precision
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        precision: i32,

        /// Declared scale
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        scale: i32,

        /// Dialect tag; resolved from the configuration file when omitted
        #[arg(long)]
        dialect: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DialectError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(DialectError::Config)?;

    let registry = DialectRegistry::with_builtins()?;
    debug!(dialects = registry.tags().len(), "registry ready");

    match cli.command {
        Commands::Resolve => {
            let descriptor = resolve_from_config(&cli.config, &registry).await?;
            info!(
                dialect = descriptor.identity_tag(),
                product = descriptor.product_name(),
                "resolved dialect"
            );
            if cli.output_json {
                print_json(&descriptor.summary())?;
            } else {
                print_descriptor(&descriptor);
            }
        }

        Commands::List => {
            let listing: Vec<DialectListing> = registry
                .entries()
                .iter()
                .map(|entry| DialectListing {
                    tag: entry.tag,
                    chain: registry
                        .resolve_tag(entry.tag, &ConnectionIdentity::default())
                        .map(|d| d.chain().to_vec())
                        .unwrap_or_default(),
                    patterns: entry.patterns.iter().map(|p| p.to_string()).collect(),
                    guarded: entry.guard.is_some(),
                })
                .collect();

            if cli.output_json {
                print_json(&listing)?;
            } else {
                for item in &listing {
                    println!(
                        "{:<12} {}{}",
                        item.tag,
                        item.patterns.join(", "),
                        if item.guarded { " (guarded)" } else { "" }
                    );
                }
            }
        }

        Commands::Capabilities {
            tag,
            product_version,
        } => {
            let identity = ConnectionIdentity::new(tag.as_str(), product_version);
            let descriptor = registry.resolve_tag(&tag, &identity)?;
            if cli.output_json {
                print_json(&descriptor.summary())?;
            } else {
                print_descriptor(&descriptor);
                println!();
                for capability in Capability::ALL {
                    println!(
                        "  {:<36} {:<5} ({})",
                        capability.name(),
                        descriptor.flag(capability),
                        descriptor.provenance(capability)
                    );
                }
            }
        }

        Commands::Inline {
            columns,
            types,
            rows,
            order_by,
            dialect,
        } => {
            let descriptor =
                descriptor_for(dialect.as_deref(), &cli.config, &registry).await?;
            let types = types
                .iter()
                .map(|t| t.parse::<LogicalType>())
                .collect::<Result<Vec<_>, _>>()?;

            let mut table = InlineValueTable::new(columns, types);
            for row in &rows {
                table.push_nullable_row(parse_row(row));
            }
            if let Some(column) = order_by {
                table = table.with_order_by(column);
            }

            let sql = descriptor.generate_inline(&table)?;
            if cli.output_json {
                print_json(&InlineOutput {
                    dialect: descriptor.identity_tag(),
                    rows: table.rows().len(),
                    sql: &sql,
                })?;
            } else {
                println!("{}", sql);
            }
        }

        Commands::MapType {
            code,
            precision,
            scale,
            dialect,
        } => {
            let descriptor =
                descriptor_for(dialect.as_deref(), &cli.config, &registry).await?;
            let code = code.parse::<SqlTypeCode>()?;
            let column = ResultDescription::default().with_column("value", code, precision, scale);
            let logical = descriptor.map_type(&column, 0)?;

            if cli.output_json {
                print_json(&MapTypeOutput {
                    dialect: descriptor.identity_tag(),
                    code: code.code(),
                    precision,
                    scale,
                    logical: logical.name(),
                })?;
            } else {
                println!("{}", logical.name());
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct DialectListing {
    tag: &'static str,
    chain: Vec<&'static str>,
    patterns: Vec<String>,
    guarded: bool,
}

#[derive(Serialize)]
struct InlineOutput<'a> {
    dialect: &'a str,
    rows: usize,
    sql: &'a str,
}

#[derive(Serialize)]
struct MapTypeOutput {
    dialect: &'static str,
    code: i32,
    precision: i32,
    scale: i32,
    logical: &'static str,
}

/// Resolve the connection described in the configuration file at `path`.
async fn resolve_from_config(
    path: &Path,
    registry: &DialectRegistry,
) -> Result<Arc<CapabilityDescriptor>, DialectError> {
    let config = Config::load(path)?;
    info!("Loaded configuration from {:?}", path);

    let identity = config.connection.identity();
    if let Some(ref tag) = config.resolver.force_dialect {
        info!(dialect = %tag, "using forced dialect");
        return registry.resolve_tag(tag, &identity);
    }

    if config.resolver.refine_identity {
        let probe = config.recorded_probe()?;
        let descriptor = registry.resolve_connection(&identity, &probe).await?;
        debug!(probes = probe.call_count(), "refinement finished");
        Ok(descriptor)
    } else {
        registry.resolve_unrefined(&identity)
    }
}

/// An explicit dialect tag wins; otherwise fall back to the configuration file.
async fn descriptor_for(
    dialect: Option<&str>,
    config: &Path,
    registry: &DialectRegistry,
) -> Result<Arc<CapabilityDescriptor>, DialectError> {
    match dialect {
        Some(tag) => registry.resolve_tag(tag, &ConnectionIdentity::default()),
        None => resolve_from_config(config, registry).await,
    }
}

fn parse_row(row: &str) -> Vec<Option<String>> {
    row.split(',')
        .map(|value| match value {
            "NULL" => None,
            other => Some(other.to_string()),
        })
        .collect()
}

fn print_descriptor(descriptor: &CapabilityDescriptor) {
    println!("dialect: {}", descriptor.identity_tag());
    if !descriptor.product_name().is_empty() {
        println!(
            "product: {} {}",
            descriptor.product_name(),
            descriptor.product_version()
        );
    }
    if let Some(original) = descriptor.impersonated_via() {
        println!("impersonated via: {}", original);
    }
    println!("chain: {}", descriptor.chain().join(" -> "));
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), DialectError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
