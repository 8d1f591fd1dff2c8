use anyhow::Result;
use colored::Colorize;
use delta_analyzer::delta_client::DeltaClient;
use delta_analyzer::{api_server_axum, config, logging, processor, rules};
use std::time::Duration;

/// One fetch-build-evaluate cycle with step-by-step console output
async fn run_analysis(client: &DeltaClient, underlying: &str, selected: Option<&str>) -> Result<()> {
    // Step 1: option contracts for the nearest expiry
    println!("{}", format!("Step 1: Fetching {} option contracts...", underlying).cyan());
    let records = client.fetch_option_contracts(underlying).await?;
    println!("{} Found {} contracts", "✓".green(), records.len());
    println!();

    // Step 2: market snapshot
    println!("{}", "Step 2: Fetching market snapshot...".cyan());
    let snapshot = client.fetch_snapshot().await?;
    println!("{} Spot: {:.2}", "✓".green(), snapshot.current_price);
    match snapshot.reference_price {
        Some(reference) => println!("{} Reference (05:29 IST): {:.2}", "✓".green(), reference),
        None => println!("{} Reference price unavailable", "⚠".yellow()),
    }
    println!();

    // Step 3: build the chain and evaluate
    println!("{}", "Step 3: Evaluating strategies...".cyan());
    let chain = processor::build_chain(&records);
    println!("{} Chain built: {} strikes", "✓".green(), chain.len());
    println!();

    match selected {
        Some(name) => {
            let result =
                rules::run_strategy(&chain, snapshot.current_price, snapshot.reference_price, Some(name));
            print_signal(name, &result);
        }
        None => {
            for name in rules::strategy_names() {
                let result = rules::run_strategy(
                    &chain,
                    snapshot.current_price,
                    snapshot.reference_price,
                    Some(name),
                );
                print_signal(name, &result);
            }
        }
    }

    Ok(())
}

fn print_signal(name: &str, result: &rules::SignalResult) {
    println!("{}", name.yellow().bold());
    println!("  {}", result.message);
    if let Some(details) = &result.details {
        match serde_json::to_string_pretty(details) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("  {} Could not render details: {}", "✗".red(), e),
        }
    }
    println!();
}

/// Re-run the analysis on a fixed interval
async fn run_watch(client: &DeltaClient, underlying: &str, selected: Option<&str>) -> Result<()> {
    let refresh = config::get_refresh_secs();

    loop {
        if let Err(e) = run_analysis(client, underlying, selected).await {
            println!("{} Analysis failed: {}", "✗".red(), e);
        }
        println!("{} Next refresh in {}s", "⏱".yellow(), refresh);
        println!();
        tokio::time::sleep(Duration::from_secs(refresh)).await;
    }
}

/// Run API server mode
async fn run_server(port: u16) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Delta Analyzer API Server".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    api_server_axum::start_server(port).await
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    println!("{}", "=".repeat(60).blue());
    println!("{}", "Delta Options Signal Analyzer".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let mode = config::get_execution_mode();
    let underlying = config::get_underlying();
    let selected = config::get_selected_strategy();
    let port = config::get_port();

    match mode.as_str() {
        "analyze" => {
            let client = DeltaClient::new()?;
            run_analysis(&client, &underlying, selected.as_deref()).await?;
        }
        "watch" => {
            let client = DeltaClient::new()?;
            run_watch(&client, &underlying, selected.as_deref()).await?;
        }
        "server" => run_server(port).await?,
        _ => {
            eprintln!("Invalid mode '{}'. Use 'analyze', 'watch', or 'server'", mode);
            eprintln!("Set DELTA_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  DELTA_MODE=analyze cargo run");
            eprintln!("  DELTA_MODE=watch DELTA_REFRESH_SECS=60 cargo run");
            eprintln!("  DELTA_MODE=server DELTA_PORT=3001 cargo run");
            eprintln!("  DELTA_STRATEGY='OTM Calls & Puts in $100-200 range' cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}
