use std::io::{self, Write};
use std::sync::Arc;

use colored::*;

use offers_backend::config::Config;
use offers_backend::domain::services::approval::{ApprovalService, Outcome};
use offers_backend::domain::services::normalizer;
use offers_backend::domain::ports::PendingOfferStore;
use offers_backend::error::AppError;
use offers_backend::infra::factory::connect_database;
use offers_backend::infra::sheets::csv_store::CsvPendingStore;

enum Mode {
    List,
    Approve,
}

#[tokio::main]
async fn main() {
    println!("{}", "🍽️  Restaurant Offers Approval System".bold());
    println!("{}", "=".repeat(50));

    let mode = match std::env::args().nth(1).as_deref() {
        Some("list") => Mode::List,
        Some("approve") => Mode::Approve,
        Some(_) => {
            eprintln!("Usage: admin [list|approve]");
            std::process::exit(1);
        }
        None => prompt_menu(),
    };

    let result = match mode {
        Mode::List => list_pending().await,
        Mode::Approve => approve_all().await,
    };

    if let Err(e) = result {
        eprintln!("{}", format!("❌ {}", e).red().bold());
        std::process::exit(1);
    }
}

fn prompt_menu() -> Mode {
    println!("1. List pending offers");
    println!("2. Approve all pending offers");

    match prompt("\nSelect option (1/2): ").as_str() {
        "1" => Mode::List,
        "2" => Mode::Approve,
        _ => {
            println!("Invalid option.");
            std::process::exit(1);
        }
    }
}

async fn list_pending() -> Result<(), AppError> {
    let config = Config::from_env();
    let store = CsvPendingStore::new(config.pending_sheet_path.clone());

    let rows = store.read_all().await?;
    let pending: Vec<_> = rows.iter().filter(|r| r.is_pending()).collect();

    if pending.is_empty() {
        println!("{}", "✅ No pending offers found.".green());
        return Ok(());
    }

    println!("\n📋 Found {} pending offers:\n", pending.len());
    println!("{}", "-".repeat(100));
    for (i, offer) in pending.iter().enumerate() {
        println!(
            "{:2}. {:<40} | {:<20} | {}",
            i + 1,
            truncate(&offer.title, 40),
            truncate(&offer.restaurant_name, 20),
            offer.offer_type
        );
        println!("     Description: {}...", truncate(&offer.description, 60));
        println!("     Submitted: {}", truncate(&offer.timestamp, 16));
        if let Ok(Some(bag)) = normalizer::parse_surprise_bag(&offer.surprise_bag_data) {
            println!(
                "     Surprise Bag: ${} (Est. Value: ${})",
                bag.price, bag.estimated_value
            );
        }
        println!("{}", "-".repeat(100));
    }
    Ok(())
}

async fn approve_all() -> Result<(), AppError> {
    let config = Config::from_env();

    println!("🔍 Reading pending offers...");
    let store = Arc::new(CsvPendingStore::new(config.pending_sheet_path.clone()));
    let pending_count = store.read_all().await?.iter().filter(|r| r.is_pending()).count();

    if pending_count == 0 {
        println!("{}", "✅ No pending offers to approve.".green());
        return Ok(());
    }
    println!("📋 Found {} pending offers to approve...", pending_count);

    let answer = prompt(&format!(
        "\nDo you want to approve all {} offers? (y/N): ",
        pending_count
    ));
    if !answer.eq_ignore_ascii_case("y") {
        println!("{}", "❌ Approval cancelled.".red());
        return Ok(());
    }

    println!("🔗 Connecting to database...");
    let db = connect_database(&config.database_url).await?;
    let service = ApprovalService::new(db.offer_repo(), store.clone());

    let result = service.approve_all().await;
    // Release the pool on every exit path before reporting.
    db.close().await;
    let report = result?;

    for row in &report.outcomes {
        match &row.outcome {
            Outcome::Approved { offer_id } => println!(
                "{}",
                format!("✅ {} ({}) -> offer {}", row.title, row.restaurant_name, offer_id).green()
            ),
            Outcome::Failed { reason } => println!(
                "{}",
                format!("❌ {} ({}): {}", row.title, row.restaurant_name, reason).red()
            ),
        }
    }
    println!("\n🎉 {}", report.summary().bold());
    Ok(())
}

fn prompt(message: &str) -> String {
    print!("{}", message);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return String::new();
    }
    answer.trim().to_string()
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
