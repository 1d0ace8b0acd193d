use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heapdb::buffer::buffer_manager::BufferManager;
use heapdb::catalog::Catalog;
use heapdb::common::PAGE_SIZE;
use heapdb::concurrency::TransactionManager;
use heapdb::printer::Printer;
use heapdb::storage::heap::file::HeapFile;
use heapdb::tuple::schema::Schema;
use tracing::info;

#[derive(Parser)]
#[command(about = "Inspect and scan heap files")]
struct Config {
    #[arg(long, default_value_t = 8, help = "Size of buffer pool")]
    pool_size: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prints the table id and page count of a heap file
    Info { file: PathBuf },
    /// Prints all tuples of a heap file
    Scan {
        file: PathBuf,

        /// Column as name:Type, Type is one of Boolean, Integer, Text.
        /// Append ? for nullable columns
        #[arg(long = "column", required = true)]
        columns: Vec<String>,
    },
}

fn setup_tracing() {
    use tracing_subscriber::{
        fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
    };

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(layer().with_writer(std::io::stderr))
        .init();
}

fn print_info(file: PathBuf) -> Result<()> {
    let heap_file = HeapFile::new(&file, Schema::new(vec![]))
        .with_context(|| format!("Could not open heap file {}", file.display()))?;
    let size = heap_file.path().metadata()?.len();
    let num_pages = heap_file.num_pages()?;

    println!("path:      {}", heap_file.path().display());
    println!("table id:  {}", heap_file.id());
    println!("size:      {size} bytes");
    println!("pages:     {num_pages} of {PAGE_SIZE} bytes");
    if size % PAGE_SIZE as u64 != 0 {
        println!("trailing:  {} bytes", size % PAGE_SIZE as u64);
    }
    Ok(())
}

fn scan(file: PathBuf, columns: Vec<String>, pool_size: usize) -> Result<()> {
    let schema = Schema::parse_columns(columns.as_slice()).context("Invalid column definition")?;
    let catalog = Catalog::new();
    let heap_file = catalog
        .attach(&file, schema)
        .with_context(|| format!("Could not attach heap file {}", file.display()))?;
    let buffer_manager = BufferManager::new(&catalog, pool_size);
    let transaction_manager = TransactionManager::new();
    let tid = transaction_manager.begin()?;
    info!(%tid, table_id = heap_file.id(), "starting scan");

    let mut cursor = heap_file.scan(&buffer_manager, tid);
    let mut writer = BufWriter::new(stdout().lock());
    let result = cursor
        .open()
        .map_err(anyhow::Error::from)
        .and_then(|()| {
            Printer::new(heap_file.schema()).print_all_tuples(&mut cursor, &mut writer)
        });
    cursor.close();

    match result {
        Ok(count) => {
            buffer_manager.transaction_complete(tid);
            writeln!(writer, "({count} rows)")?;
            writer.flush()?;
            Ok(())
        }
        Err(e) => {
            buffer_manager.abort_transaction(tid);
            writer.flush()?;
            Err(e.context(format!("Scan of {} failed", file.display())))
        }
    }
}

fn main() -> Result<()> {
    setup_tracing();
    let config = Config::parse();

    match config.command {
        Command::Info { file } => print_info(file),
        Command::Scan { file, columns } => scan(file, columns, config.pool_size),
    }
}
