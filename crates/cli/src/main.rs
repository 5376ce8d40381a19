//! Small demo binary: runs a single `SELECT` against the bundled
//! `AREACODES` fixture and prints the result as a table, the way the
//! driver's viewer tools dump query output for manual inspection.

use std::sync::Arc;

use catalog::{areacodes_fixture, CatalogAdapter, MemoryCatalog};
use clap::Parser;
use common::{Column, EngineConfig};
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Parser)]
#[command(
    name = "paradox-cli",
    about = "Run a read-only SELECT against the bundled AREACODES fixture catalog"
)]
struct Args {
    /// SQL query to run.
    #[arg(default_value = "SELECT AC, State, CITIES FROM AREACODES")]
    sql: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let catalog: Arc<dyn CatalogAdapter> =
        Arc::new(MemoryCatalog::new().with_table(areacodes_fixture()));

    let config = EngineConfig::builder().catalog_dir(".").build();
    let mut result_set = engine::query(&args.sql, catalog, &config)?;
    let columns = result_set.get_metadata()?.to_vec();

    let mut rows = Vec::new();
    while result_set.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 1..=columns.len() {
            cells.push(result_set.get_string(index)?);
        }
        rows.push(cells);
    }
    result_set.close();

    print_table(&columns, rows);
    Ok(())
}

fn print_table(columns: &[Column], rows: Vec<Vec<String>>) {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.label.clone()));
    for row in rows {
        builder.push_record(row);
    }
    println!("{}", builder.build().with(Style::rounded()));
}
