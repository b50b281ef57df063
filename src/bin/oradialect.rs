//! oradialect: Oracle dialect CLI
//!
//! Prints the SQL the dialect generates. Nothing is executed; pipe the
//! output into your client of choice.
//!
//! # Usage
//!
//! ```bash
//! # Catalog queries
//! oradialect columns posts --schema blog
//! oradialect table-exists posts
//!
//! # Row limiting
//! oradialect limit "SELECT * FROM posts ORDER BY id" --limit 10 --offset 20
//!
//! # Type mapping
//! oradialect classify "VARCHAR2" --length 100
//! oradialect native-type decimal --size 10 --scale 2
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use oradialect::config::search_path;
use oradialect::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oradialect")]
#[command(version)]
#[command(about = "Oracle SQL dialect: catalog queries, DDL and type mapping", long_about = None)]
#[command(after_help = "EXAMPLES:
    oradialect columns posts --schema blog
    oradialect limit 'SELECT * FROM posts' --limit 10 --offset 20
    oradialect drop-table posts --if-exists")]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(long, global = true, env = "ORADIALECT_CONFIG")]
    config: Option<PathBuf>,

    /// Default quoting policy, overriding the configuration file
    #[arg(long, global = true, value_enum)]
    quote: Option<QuoteArg>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum QuoteArg {
    Bare,
    Literal,
    Identifier,
}

impl From<QuoteArg> for QuotePolicy {
    fn from(arg: QuoteArg) -> Self {
        match arg {
            QuoteArg::Bare => QuotePolicy::Bare,
            QuoteArg::Literal => QuotePolicy::Literal,
            QuoteArg::Identifier => QuotePolicy::Identifier,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Integer,
    Decimal,
    Varchar,
    Float,
    Timestamp,
    Datetime,
    Date,
    Char,
    Text,
    Boolean,
    BigInteger,
    Double,
    Blob,
    Json,
}

impl From<TypeArg> for ColumnType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Integer => ColumnType::Integer,
            TypeArg::Decimal => ColumnType::Decimal,
            TypeArg::Varchar => ColumnType::Varchar,
            TypeArg::Float => ColumnType::Float,
            TypeArg::Timestamp => ColumnType::Timestamp,
            TypeArg::Datetime => ColumnType::Datetime,
            TypeArg::Date => ColumnType::Date,
            TypeArg::Char => ColumnType::Char,
            TypeArg::Text => ColumnType::Text,
            TypeArg::Boolean => ColumnType::Boolean,
            TypeArg::BigInteger => ColumnType::BigInteger,
            TypeArg::Double => ColumnType::Double,
            TypeArg::Blob => ColumnType::Blob,
            TypeArg::Json => ColumnType::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List tables, optionally within one schema
    Tables {
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// List views, optionally within one schema
    Views {
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Check whether a table exists
    TableExists {
        table: String,
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Check whether a view exists
    ViewExists {
        view: String,
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Describe the columns of a table
    Columns {
        table: String,
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Describe the indexes of a table
    Indexes {
        table: String,
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Describe the foreign keys of a table
    References {
        table: String,
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Wrap a query in ROWNUM pagination
    Limit {
        sql: String,
        #[arg(short, long)]
        limit: u64,
        #[arg(short, long)]
        offset: Option<u64>,
    },
    /// Create a view from a SELECT statement
    CreateView {
        view: String,
        /// The view body
        #[arg(long)]
        sql: String,
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Drop a view
    DropView {
        view: String,
        #[arg(short, long)]
        schema: Option<String>,
        #[arg(long)]
        if_exists: bool,
    },
    /// Drop a table
    DropTable {
        table: String,
        #[arg(short, long)]
        schema: Option<String>,
        #[arg(long)]
        if_exists: bool,
    },
    /// Map a native catalog type to an abstract column definition
    Classify {
        native_type: String,
        #[arg(long)]
        length: Option<u32>,
        #[arg(long)]
        precision: Option<u32>,
        #[arg(long)]
        scale: Option<u32>,
    },
    /// Map an abstract column type to its native Oracle type
    NativeType {
        #[arg(value_enum)]
        column_type: TypeArg,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        scale: Option<u32>,
        /// Column name used in error messages
        #[arg(long, default_value = "column")]
        name: String,
    },
    /// Show which DDL operations the dialect generates
    Capabilities,
    /// Show the resolved configuration
    Config,
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

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let dialect = match cli.quote {
        Some(quote) => OracleDialect::with_quote(quote.into()),
        None => config.dialect(),
    };
    let format = cli.format;

    match &cli.command {
        Commands::Tables { schema } => print_sql(&dialect.list_tables(schema.as_deref()), format),
        Commands::Views { schema } => print_sql(&dialect.list_views(schema.as_deref()), format),
        Commands::TableExists { table, schema } => {
            print_sql(&dialect.table_exists(table, schema.as_deref()), format)
        }
        Commands::ViewExists { view, schema } => {
            print_sql(&dialect.view_exists(view, schema.as_deref()), format)
        }
        Commands::Columns { table, schema } => {
            print_sql(&dialect.describe_columns(table, schema.as_deref()), format)
        }
        Commands::Indexes { table, schema } => {
            print_sql(&dialect.describe_indexes(table, schema.as_deref()), format)
        }
        Commands::References { table, schema } => {
            print_sql(&dialect.describe_references(table, schema.as_deref()), format)
        }
        Commands::Limit { sql, limit, offset } => {
            let spec = match offset {
                Some(offset) => LimitSpec::LimitOffset(*limit, *offset),
                None => LimitSpec::Limit(*limit),
            };
            print_sql(&dialect.limit(sql, spec), format)
        }
        Commands::CreateView { view, sql, schema } => {
            let sql = dialect.create_view(view, &ViewDefinition::new(sql.as_str()), schema.as_deref())?;
            print_sql(&sql, format)
        }
        Commands::DropView {
            view,
            schema,
            if_exists,
        } => print_sql(&dialect.drop_view(view, schema.as_deref(), *if_exists), format),
        Commands::DropTable {
            table,
            schema,
            if_exists,
        } => print_sql(&dialect.drop_table(table, schema.as_deref(), *if_exists), format),
        Commands::Classify {
            native_type,
            length,
            precision,
            scale,
        } => {
            let definition = dialect.classify_type(native_type, CatalogSize::new(*length, *precision, *scale));
            match format {
                OutputFormat::Json => print_json(&definition),
                OutputFormat::Text => {
                    println!("{} {}", "Type:".dimmed(), definition.column_type.to_string().cyan());
                    if let Some(size) = definition.size {
                        println!("{} {}", "Size:".dimmed(), size);
                    }
                    if let Some(scale) = definition.scale {
                        println!("{} {}", "Scale:".dimmed(), scale);
                    }
                    if definition.is_numeric {
                        println!("{} {:?}", "Bind:".dimmed(), definition.bind_type);
                    }
                    Ok(())
                }
            }
        }
        Commands::NativeType {
            column_type,
            size,
            scale,
            name,
        } => {
            let definition = ColumnDefinition::new((*column_type).into()).size(*size).scale(*scale);
            let native = dialect.native_type_for(&Column::of_type(name.as_str(), definition))?;
            match format {
                OutputFormat::Json => print_json(&json!({ "native_type": native })),
                OutputFormat::Text => {
                    println!("{}", native);
                    Ok(())
                }
            }
        }
        Commands::Capabilities => show_capabilities(&dialect, format),
        Commands::Config => show_config(&config, format),
    }
}

fn print_sql(sql: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "sql": sql })),
        OutputFormat::Text => {
            println!("{}", sql);
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_capabilities(dialect: &OracleDialect, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let ops: Vec<_> = DdlOperation::ALL
            .iter()
            .map(|op| json!({ "operation": op, "supported": dialect.supports(*op) }))
            .collect();
        return print_json(&json!({
            "dialect": dialect.name(),
            "operations": ops,
            "savepoints": dialect.supports_savepoints(),
            "release_savepoints": dialect.supports_release_savepoints(),
        }));
    }

    println!("{} {}", "Dialect:".dimmed(), dialect.name().cyan().bold());
    println!();
    for op in DdlOperation::ALL {
        if dialect.supports(op) {
            println!("  {} {}", "✓".green(), op.to_string().white());
        } else {
            println!("  {} {}", "✗".red(), op.to_string().dimmed());
        }
    }
    println!();
    println!(
        "{} {}   {} {}",
        "Savepoints:".dimmed(),
        dialect.supports_savepoints(),
        "Release savepoints:".dimmed(),
        dialect.supports_release_savepoints()
    );
    Ok(())
}

fn show_config(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(config);
    }

    println!("{}", "Search path:".green().bold());
    for path in search_path() {
        let marker = if path.exists() { "✓".green() } else { "·".dimmed() };
        println!("  {} {}", marker, path.display());
    }
    println!();
    println!("{} {}", "Quote policy:".dimmed(), config.dialect.quote.to_string().cyan());
    match &config.connection {
        Some(conn) => {
            println!("{} {}", "Database:".dimmed(), conn.dbname.white());
            match conn.address() {
                Ok(addr) => {
                    println!("{} {}", "Host:".dimmed(), addr.host);
                    println!("{} {}", "Port:".dimmed(), addr.port);
                    if let Some(service) = &addr.service {
                        println!("{} {}", "Service:".dimmed(), service);
                    }
                }
                Err(_) => println!("{}", "Not an Easy Connect address, passed through as-is".dimmed()),
            }
            if let Some(user) = &conn.username {
                println!("{} {}", "User:".dimmed(), user);
            }
            let startup = conn.startup_statements();
            if !startup.is_empty() {
                println!("{}", "Startup:".dimmed());
                for sql in startup {
                    println!("  {}", sql.yellow());
                }
            }
        }
        None => println!("{}", "No [connection] configured".yellow()),
    }
    Ok(())
}
