use content_sync_lib::config::{AppConfig, CONFIG_PATH_ENV};
use env_logger::Env;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map(PathBuf::from);

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("[app] Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = content_sync_lib::run(config).await {
        log::error!("[app] {}", e);
        std::process::exit(1);
    }
}
