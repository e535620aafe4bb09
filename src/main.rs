use dotenv::dotenv;
use tracing::{info, warn};

use toh_backend::app::app::App;
use toh_backend::util::logger::Logger;

#[tokio::main]
async fn main() {
    match dotenv() {
        Ok(_) => {}
        Err(e) => eprintln!("No .env file loaded: {} (using system env vars)", e),
    }

    let _logger = Logger::init().expect("Failed to initialize logging");

    info!("🚀 Starting tire inspection backend");
    match std::env::var("APP_PORT") {
        Ok(_) => {}
        Err(_) => warn!("APP_PORT not set, using default"),
    }

    let app = App::new().await;
    app.start().await;
}
