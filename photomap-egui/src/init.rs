use log::{info, warn};
use photomap::event::{InboxSender, Messenger};
use photomap::{AppConfig, DatasetLoader, DatasetSource};
use tokio::runtime::{Handle, Runtime};

use crate::app::{AppMessage, PhotomapApp};

const APP_NAME: &str = "Photo Map";

/// Initializes `env_logger` with `info` as the default level.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Requests an egui repaint when a message arrives from a background task.
struct EguiMessenger(egui::Context);

impl Messenger for EguiMessenger {
    fn request_redraw(&self) {
        self.0.request_repaint();
    }
}

/// Starts the desktop application.
pub struct InitBuilder {
    config: AppConfig,
    native_options: Option<eframe::NativeOptions>,
}

impl InitBuilder {
    /// Creates a builder with default window options.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            native_options: None,
        }
    }

    /// Overrides the window options.
    pub fn with_native_options(mut self, options: eframe::NativeOptions) -> Self {
        self.native_options = Some(options);
        self
    }

    /// Runs the application until its window is closed.
    pub fn init(self) -> eframe::Result {
        let rt = Runtime::new().map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;
        let handle = rt.handle().clone();
        let loader = DatasetLoader::new().map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;

        let native_options = self.native_options.unwrap_or_else(|| eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title(APP_NAME)
                .with_inner_size([1200.0, 800.0]),
            ..Default::default()
        });

        let config = self.config;
        let result = eframe::run_native(
            APP_NAME,
            native_options,
            Box::new(move |cc| {
                let source = config.data_source();
                let app = PhotomapApp::new(config, EguiMessenger(cc.egui_ctx.clone()));
                spawn_dataset_load(&handle, loader, source, app.sender());
                Ok(Box::new(app))
            }),
        );

        rt.shutdown_background();
        result
    }
}

fn spawn_dataset_load(
    handle: &Handle,
    loader: DatasetLoader,
    source: DatasetSource,
    sender: InboxSender<AppMessage>,
) {
    handle.spawn(async move {
        let locations = match loader.load(&source).await {
            Ok(locations) => locations,
            Err(err) => {
                warn!("Failed to load locations from {source}: {err}");
                vec![]
            }
        };

        info!("{} locations are ready", locations.len());
        sender.send(AppMessage::DatasetLoaded(locations));
    });
}
