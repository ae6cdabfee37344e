//! Desktop front-end of the photo map: an egui map widget implementing
//! [`photomap::MapView`] and the application around it.

mod app;
mod egui_map;
mod init;

pub use app::{AppMessage, PhotomapApp};
pub use egui_map::{EguiMapView, MapCamera};
pub use init::{init_logger, InitBuilder};
