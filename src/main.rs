use {
    ethflow::{
        aggregator,
        client::{GetBlockClient, LedgerClient},
        config::Config,
        ranker, scanner, ui,
    },
    std::sync::Arc,
};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logger if RUST_LOG is set
    // Write logs to stderr so the result table is the only stdout output
    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_default_env()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    };
    builder.target(env_logger::Target::Stderr).init();

    // NOTE: Workaround for rustls issue
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Can't set crypto provider to aws_lc_rs");

    if let Err(e) = run(config).await {
        log::error!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("🚀 Starting ethflow...");
    log::info!("📊 Configuration:");
    log::info!("   Block window: {}", config.window_size);
    log::info!("   Worker pool:  {}", config.pool_size);

    let client: Arc<dyn LedgerClient> = Arc::new(GetBlockClient::new(&config.api_key));

    // Chain head lookup is one-shot; without it no window can be framed.
    let head = client
        .latest_block_number()
        .await
        .map_err(|e| format!("Cannot resolve latest block number: {}", e))?;
    log::info!("⛓️ Latest block number: {}", head);

    let blocks = scanner::frame_window(&head, config.window_size)?;
    log::info!("📦 Scanning blocks {} to {}", blocks.start(), blocks.end());

    let batches = scanner::scan_window(client, blocks, config.pool_size).await;
    let book = aggregator::drain_batches(batches).await;

    let ranked = ranker::rank_addresses(&book);
    ui::render_table(&ranked, &book);

    Ok(())
}
