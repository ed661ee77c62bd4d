//! Main application entry point (native).

#[cfg(feature = "native")]
fn run() -> Result<sketchboard_app::DemoReport, sketchboard_app::AppError> {
    use sketchboard_core::{SessionConfig, SystemClock};
    use std::sync::Arc;

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            SessionConfig::from_path(&path)?
        }
        None => SessionConfig::default(),
    };
    pollster::block_on(sketchboard_app::demo::run(config, Arc::new(SystemClock)))
}

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Sketchboard");

    match run() {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to encode report: {}", e),
        },
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }

    sketchboard_app::ShortcutRegistry::print_all();
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
