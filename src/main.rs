use erp_server::{Config, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load .env before anything reads the environment
    dotenv::dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    erp_server::init_logger(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(port = config.http_port, "ERP server starting...");

    // 4. Run the HTTP server (initializes state, database and schema)
    let server = Server::new(config);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
