//! Photo map desktop application.

use photomap::AppConfig;
use photomap_egui::{init_logger, InitBuilder};

fn main() -> eframe::Result {
    init_logger();

    let config = AppConfig::from_env().map_err(|err| {
        log::error!("Invalid configuration: {err}");
        eframe::Error::AppCreation(Box::new(err))
    })?;

    InitBuilder::new(config).init()
}
