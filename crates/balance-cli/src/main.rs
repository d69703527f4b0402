//! Balance Sync CLI
//!
//! Command-line tool for importing designer CSV tables into the balance
//! store and exporting them back.

use balance_core::{
    export_path, export_string, import_path, scan_directory, BalanceStore, ImportReport,
    TableKind,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "balance-cli")]
#[command(about = "Game balance table sync", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one CSV table into the store
    Import {
        /// Path to the store JSON file (created if missing)
        #[arg(short, long)]
        store: PathBuf,

        /// Table kind (levels, enemies, characters, weapons, cards)
        #[arg(short, long, value_parser = parse_table_kind)]
        table: TableKind,

        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Report what would change without saving the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Export one table from the store to canonical CSV
    Export {
        /// Path to the store JSON file
        #[arg(short, long)]
        store: PathBuf,

        /// Table kind (levels, enemies, characters, weapons, cards)
        #[arg(short, long, value_parser = parse_table_kind)]
        table: TableKind,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Scan a directory for table CSVs and import them all
    Sync {
        /// Path to the store JSON file (created if missing)
        #[arg(short, long)]
        store: PathBuf,

        /// Root directory containing <table>.csv files
        #[arg(short, long)]
        root: PathBuf,

        /// Report what would change without saving the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Print one table from the store
    Show {
        /// Path to the store JSON file
        #[arg(short, long)]
        store: PathBuf,

        /// Table kind (levels, enemies, characters, weapons, cards)
        #[arg(short, long, value_parser = parse_table_kind)]
        table: TableKind,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn parse_table_kind(s: &str) -> Result<TableKind, String> {
    TableKind::parse(s).ok_or_else(|| {
        format!(
            "unknown table '{}'. Supported: levels, enemies, characters, weapons, cards",
            s
        )
    })
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run() -> balance_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            store,
            table,
            file,
            dry_run,
        } => cmd_import(&store, table, &file, dry_run),
        Commands::Export {
            store,
            table,
            output,
        } => cmd_export(&store, table, &output),
        Commands::Sync {
            store,
            root,
            dry_run,
        } => cmd_sync(&store, &root, dry_run),
        Commands::Show {
            store,
            table,
            limit,
        } => cmd_show(&store, table, limit),
    }
}

fn cmd_import(
    store_path: &PathBuf,
    table: TableKind,
    file: &PathBuf,
    dry_run: bool,
) -> balance_core::Result<()> {
    let mut store = BalanceStore::load(store_path)?;
    let report = import_path(&mut store, table, file)?;

    print_report(&report);

    if dry_run {
        println!("Dry run: store not saved.");
    } else {
        store.save(store_path)?;
        println!("Store saved to {}", store_path.display());
    }

    Ok(())
}

fn cmd_export(
    store_path: &PathBuf,
    table: TableKind,
    output: &PathBuf,
) -> balance_core::Result<()> {
    let store = BalanceStore::load(store_path)?;
    let rows = export_path(&store, table, output)?;
    println!("Exported {} rows to {}", rows, output.display());
    Ok(())
}

fn cmd_sync(store_path: &PathBuf, root: &PathBuf, dry_run: bool) -> balance_core::Result<()> {
    let mut store = BalanceStore::load(store_path)?;
    let scan = scan_directory(root)?;

    if scan.tables.is_empty() {
        println!("No table files found under {}", root.display());
        return Ok(());
    }

    let mut committed = 0;
    let mut failed = 0;

    for table_file in &scan.tables {
        println!("Importing {}", table_file.path.display());
        let report = import_path(&mut store, table_file.kind, &table_file.path)?;
        committed += report.rows_committed;
        failed += report.rows_failed;
        print_report(&report);
        println!();
    }

    println!("Sync complete:");
    println!("  {} files imported", scan.tables.len());
    println!("  {} rows committed, {} rows failed", committed, failed);
    if scan.skipped > 0 {
        println!("  {} CSV files skipped (not balance tables)", scan.skipped);
    }

    if dry_run {
        println!("Dry run: store not saved.");
    } else {
        store.save(store_path)?;
        println!("Store saved to {}", store_path.display());
    }

    Ok(())
}

fn cmd_show(
    store_path: &PathBuf,
    table: TableKind,
    limit: Option<usize>,
) -> balance_core::Result<()> {
    let store = BalanceStore::load(store_path)?;
    let text = export_string(&store, table)?;
    let text = text.trim_start_matches('\u{feff}');

    let lines: Vec<&str> = text.lines().collect();
    let total_rows = lines.len().saturating_sub(1);
    let row_limit = limit.unwrap_or(total_rows);

    for line in lines.iter().take(row_limit + 1) {
        println!("{}", line);
    }
    if total_rows > row_limit {
        println!("... ({} more rows)", total_rows - row_limit);
    }

    Ok(())
}

fn print_report(report: &ImportReport) {
    println!("{}", report.summary());

    if report.has_errors() {
        println!("Errors:");
        for issue in report.sample_errors(10) {
            println!("  row {}: {}", issue.line, issue.message);
        }
        if report.errors.len() > 10 {
            println!("  ... ({} more errors)", report.errors.len() - 10);
        }
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for issue in report.warnings.iter().take(10) {
            println!("  row {}: {}", issue.line, issue.message);
        }
        if report.warnings.len() > 10 {
            println!("  ... ({} more warnings)", report.warnings.len() - 10);
        }
    }
}
