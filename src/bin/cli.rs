use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use xg_value::config::AppConfig;
use xg_value::export::{save_records_to_csv, save_records_to_json};
use xg_value::fetch_match_records;
use xg_value::rankings::{top_by_over25, top_by_value, TOP_OVER25_COUNT, TOP_VALUE_COUNT};

#[derive(Parser)]
#[command(name = "xg-value")]
#[command(about = "Expected-goals match valuation for upcoming football fixtures")]
struct Cli {
    /// Match date (YYYY-MM-DD); defaults to today plus the lookahead window
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Number of fixtures in each ranking (defaults to 7 by value, 5 by over 2.5)
    #[arg(long)]
    top: Option<usize>,

    /// Write all fixtures to this CSV file
    #[arg(long)]
    csv: Option<String>,

    /// Write all fixtures to this JSON file
    #[arg(long)]
    json: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables and configuration
    let config = AppConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("xG Match Valuation\n");
    match cli.date {
        Some(date) => println!("Fetching fixtures for {}...\n", date),
        None => println!(
            "Fetching fixtures for the next {} days...\n",
            config.lookahead_days
        ),
    }

    let records = fetch_match_records(&config, cli.date).await?;

    if records.is_empty() {
        println!("No fixtures found.");
        return Ok(());
    }

    println!("=== All Fixtures ({}) ===\n", records.len());
    for record in &records {
        println!("{}", record.format());
    }

    let value_count = cli.top.unwrap_or(TOP_VALUE_COUNT);
    println!("\n=== Top {} by Value ===\n", value_count);
    for (i, record) in top_by_value(&records, value_count).iter().enumerate() {
        println!("{}. {}", i + 1, record.format());
    }

    let over_count = cli.top.unwrap_or(TOP_OVER25_COUNT);
    println!("\n=== Top {} Over 2.5 ===\n", over_count);
    for (i, record) in top_by_over25(&records, over_count).iter().enumerate() {
        println!(
            "{}. {} vs {} ({}) - Over 2.5: {:.1}%",
            i + 1,
            record.home,
            record.away,
            record.league,
            record.prob.over25 * 100.0
        );
    }

    if let Some(path) = cli.csv.as_deref() {
        save_records_to_csv(&records, path)?;
        println!("\nSaved fixtures to {}", path);
    }
    if let Some(path) = cli.json.as_deref() {
        save_records_to_json(&records, path)?;
        println!("\nSaved fixtures to {}", path);
    }

    Ok(())
}
