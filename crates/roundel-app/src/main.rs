//! Main application entry point.

use roundel_app::{App, AppConfig, ShortcutRegistry};

fn main() {
    env_logger::init();
    log::info!("Starting Roundel");

    // Optional arguments: attributes JSON file, then an image path or URI.
    let config = match AppConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load attributes: {}", e);
            std::process::exit(1);
        }
    };

    ShortcutRegistry::log_all();

    if let Err(e) = App::with_config(config).run() {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
