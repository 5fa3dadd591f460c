// Entry point and front ends.
//
// The sales table is loaded once at startup; a load failure stops the
// program. After that the dashboard runs as one of:
// - `menu` (default): an interactive terminal with one option per tab plus
//   the two CSV downloads; the analysis tab prompts for a year.
// - `export`: write both CSV downloads and exit.
// - `serve`: the HTTP dashboard.
mod dashboard;
mod error;
mod formatter;
mod loader;
mod output;
mod reports;
mod server;
mod types;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dashboard::{Session, Tab};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use types::SalesTable;

#[derive(Parser, Debug)]
#[command(name = "sales-dashboard")]
#[command(about = "Interactive sales dashboard over a spreadsheet of transactions")]
struct Args {
    /// Sales spreadsheet (.xlsx, .xls, .ods or .csv)
    #[arg(short, long, default_value = "Data/Adidas.xlsx", global = true)]
    data: PathBuf,

    /// Directory the CSV downloads are written to
    #[arg(short, long, default_value = ".", global = true)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the dashboard in the terminal
    Menu,
    /// Write retailer_sales.csv and regional_sales.csv
    Export,
    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
}

fn init_tracing() {
    // Logs go to stderr so they never interleave with menu output on stdout.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn print_header() {
    let header = dashboard::header(chrono::Local::now().date_naive());
    println!("{}", header.title);
    println!("Last updated by: {}\n", header.last_updated);
}

fn show_overview(table: &SalesTable) {
    let tab = dashboard::overview(table);
    println!("== {} ==\n", Tab::Overview.title());
    println!("{}\n{}\n", tab.heading, tab.description);
    println!("{}\n", tab.chart.title);
    output::preview_table_rows(&tab.chart.data, 20);
    println!("[4] {}\n", tab.download.label);
}

/// Ask for a year from the available ones. Empty input keeps the current
/// selection.
fn prompt_year(session: &mut Session, table: &SalesTable) {
    let years = reports::available_years(table);
    let current = session.selected_year.or_else(|| years.first().copied());
    let options: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    println!("Select Year ({})", options.join(", "));
    let prompt = match current {
        Some(y) => format!("Year [{}]: ", y),
        None => "Year: ".to_string(),
    };
    let Some(input) = read_line(&prompt) else {
        return;
    };
    if input.is_empty() {
        return;
    }
    match input.parse::<i32>() {
        Ok(year) => session.select_year(year),
        Err(_) => println!("Invalid year {:?}; keeping the current selection.", input),
    }
}

fn show_analysis(session: &Session, table: &SalesTable) {
    let tab = session.analysis(table);
    println!("\n== {} ==\n", Tab::Analysis.title());
    match tab.selected_year {
        Some(y) => println!("Year: {}\n", y),
        None => println!("No data loaded for any year.\n"),
    }
    println!("{}\n", tab.monthly.title);
    output::preview_table_rows(&tab.monthly.data, 12);
    println!("{}\n", tab.states.title);
    output::preview_table_rows(&tab.states.data, 60);
}

fn show_regional(table: &SalesTable) -> Result<()> {
    let tab = dashboard::regional(table)?;
    println!("== {} ==\n", Tab::Regional.title());
    println!("{}\n", tab.heading);
    output::preview_table_rows(&tab.chart.data, 60);
    println!("[5] {}\n", tab.download.label);
    Ok(())
}

fn write_retailer_sales(table: &SalesTable, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(output::RETAILER_SALES_FILE);
    let bytes = output::retailer_sales_csv(table)?;
    output::write_file(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn write_regional_sales(table: &SalesTable, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(output::REGIONAL_SALES_FILE);
    let rows = reports::region_city_totals(table)?;
    let bytes = output::regional_sales_csv(&rows)?;
    output::write_file(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn report_download(result: Result<PathBuf>) {
    match result {
        Ok(path) => println!("Saved {}\n", path.display()),
        Err(e) => {
            warn!(error = %e, "download failed");
            eprintln!("Write error: {:#}\n", e);
        }
    }
}

fn run_menu(table: &SalesTable, output_dir: &Path) {
    let mut session = Session::default();
    print_header();
    loop {
        println!("[1] {}", Tab::Overview.title());
        println!("[2] {}", Tab::Analysis.title());
        println!("[3] {}", Tab::Regional.title());
        println!("[4] Download Retailer Sales Data");
        println!("[5] Download Regional Sales Data");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        println!();
        match choice.as_str() {
            "1" => show_overview(table),
            "2" => {
                prompt_year(&mut session, table);
                show_analysis(&session, table);
            }
            "3" => {
                if let Err(e) = show_regional(table) {
                    eprintln!("Cannot show regional data: {:#}\n", e);
                }
            }
            "4" => report_download(write_retailer_sales(table, output_dir)),
            "5" => report_download(write_regional_sales(table, output_dir)),
            "0" => break,
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
    println!("Exiting the program.");
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let table = loader::load_sales(&args.data)
        .with_context(|| format!("Failed to load sales data from {}", args.data.display()))?;
    println!(
        "Processing dataset... ({} rows loaded)\n",
        util::format_int(table.len())
    );
    if table.is_empty() {
        warn!(path = %args.data.display(), "sales table has no rows");
    }

    match args.command.unwrap_or(Command::Menu) {
        Command::Menu => run_menu(&table, &args.output_dir),
        Command::Export => {
            let retailer = write_retailer_sales(&table, &args.output_dir)?;
            let regional = write_regional_sales(&table, &args.output_dir)?;
            info!(retailer = %retailer.display(), regional = %regional.display(), "export complete");
        }
        Command::Serve { addr } => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(server::serve(Arc::new(table), addr))?;
        }
    }
    Ok(())
}
