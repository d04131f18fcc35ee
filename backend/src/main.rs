//! Salonbase CLI - salon data import/export and reporting
//!
//! # Main Commands
//!
//! ```bash
//! salonbase serve                         # Start HTTP server (port 3000)
//! salonbase import customers.csv -e customers
//! salonbase export products               # Write products_{date}.csv
//! ```
//!
//! # Utility Commands
//!
//! ```bash
//! salonbase export customers --sample     # Header-only import template
//! salonbase import list.csv -e staff --dry-run
//! salonbase report sales_2026-08-07.csv --by month
//! salonbase columns products              # Show a column catalog
//! ```

use clap::{Parser, Subcommand};
use salonbase::{
    decode_upload_bytes, parse_import, revenue_by_day, revenue_by_month, validate_rows,
    DataServiceClient, DirSink, Entity,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salonbase")]
#[command(about = "Salon data import/export and membership backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV file into the data service
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Target entity (customers, staff, products)
        #[arg(short, long)]
        entity: String,

        /// Parse and validate only, insert nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Export entity rows from the data service as CSV
    Export {
        /// Entity to export (customers, staff, products, sales)
        entity: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the header-only import template instead
        #[arg(long)]
        sample: bool,
    },

    /// Aggregate revenue from an exported sales CSV
    Report {
        /// Input sales CSV file
        input: PathBuf,

        /// Grouping: day or month
        #[arg(long, default_value = "day")]
        by: String,
    },

    /// Show the column catalog for one or all entities
    Columns {
        /// Entity name (all entities if omitted)
        entity: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            entity,
            dry_run,
        } => cmd_import(&input, &entity, dry_run).await,

        Commands::Export {
            entity,
            output,
            sample,
        } => cmd_export(&entity, output, sample).await,

        Commands::Report { input, by } => cmd_report(&input, &by),

        Commands::Columns { entity } => cmd_columns(entity.as_deref()),

        Commands::Serve { port } => salonbase::server::start_server(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_import(
    input: &Path,
    entity: &str,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entity: Entity = entity.parse::<Entity>()?;
    if !entity.importable() {
        return Err(format!("CSV import is not offered for {}", entity).into());
    }

    eprintln!("📄 Importing: {}", input.display());

    let file_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or("Input path has no file name")?;

    let bytes = fs::read(input)?;
    let text = decode_upload_bytes(&bytes)?;

    let columns = entity.columns();
    let records = parse_import(file_name, &text, &columns)?;
    eprintln!("   Parsed {} rows", records.len());

    let (valid, failures) = validate_rows(entity, &records);
    if !failures.is_empty() {
        eprintln!("   ✅ Valid: {}", valid);
        eprintln!("   ❌ Invalid: {}", failures.len());
        for (index, errors) in failures.iter().take(5) {
            eprintln!("\n   Row {}:", index + 1);
            for error in errors.iter().take(3) {
                eprintln!("     - {}", error);
            }
        }
        return Err(salonbase::ImportError::Validation {
            invalid: failures.len(),
            total: records.len(),
        }
        .into());
    }
    eprintln!("   ✅ All {} rows valid", valid);

    if dry_run {
        eprintln!("\n✨ Dry run: nothing inserted.");
        return Ok(());
    }

    let client = DataServiceClient::from_env()?;
    for (index, record) in records.iter().enumerate() {
        client
            .insert_record(entity, record)
            .await
            .map_err(|e| format!("Row {}: {}", index + 1, e))?;
    }

    eprintln!("\n✨ Imported {} rows into {}.", records.len(), entity);
    Ok(())
}

async fn cmd_export(
    entity: &str,
    output: Option<PathBuf>,
    sample: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entity: Entity = entity.parse::<Entity>()?;
    let columns = entity.columns();

    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    let mut sink = DirSink::new(&dir);

    let filename = if sample {
        salonbase::export_sample(&columns, entity.base_name(), &mut sink)?
    } else {
        eprintln!("📦 Fetching {} from the data service...", entity);
        let client = DataServiceClient::from_env()?;
        let records = client.fetch_entity(entity).await?;
        eprintln!("   {} rows", records.len());

        salonbase::export_csv(
            &records,
            &columns,
            entity.base_name(),
            chrono::Utc::now().date_naive(),
            &mut sink,
        )?
    };

    eprintln!("💾 Written to: {}", dir.join(filename).display());
    Ok(())
}

fn cmd_report(input: &Path, by: &str) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📊 Reading: {}", input.display());

    let file_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or("Input path has no file name")?;

    let bytes = fs::read(input)?;
    let text = decode_upload_bytes(&bytes)?;
    let sales = parse_import(file_name, &text, &Entity::Sales.columns())?;

    let (buckets, skipped) = match by {
        "day" => revenue_by_day(&sales),
        "month" => revenue_by_month(&sales),
        other => return Err(format!("Unknown grouping '{}' (expected day or month)", other).into()),
    };

    if skipped > 0 {
        eprintln!("   ⚠️  Skipped {} unparseable rows", skipped);
    }

    for bucket in &buckets {
        println!("{}  {:>10.2}  ({} sales)", bucket.period, bucket.total, bucket.sales);
    }

    let grand_total: f64 = buckets.iter().map(|b| b.total).sum();
    eprintln!("\n📈 Total: {:.2} across {} periods", grand_total, buckets.len());
    Ok(())
}

fn cmd_columns(entity: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let entities: Vec<Entity> = match entity {
        Some(name) => vec![name.parse::<Entity>()?],
        None => Entity::all().to_vec(),
    };

    for entity in entities {
        println!("📋 {}", entity);
        for column in entity.columns() {
            println!("   {:<18} {}", column.key, column.label);
        }
        if !entity.importable() {
            println!("   (export and reporting only)");
        }
        println!();
    }

    Ok(())
}
