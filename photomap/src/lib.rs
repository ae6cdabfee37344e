//! Photomap shows a collection of geotagged photos on a world map and turns it into a small
//! geography guessing game.
//!
//! # Main components
//!
//! * [`dataset`] reads the table of photo locations ([`LocationRecord`]s) from a file or url.
//! * [`GalleryController`] keeps all locations on the map and can fly the camera to a random
//!   one, opening its popup when the camera stops.
//! * [`GameSession`] is the guessing game: it shuffles the locations with a seed, keeps track of
//!   the current round and the player's guess, and scores the guess with the great circle
//!   distance. The progress is saved through a [`ProgressStore`].
//!
//! Neither controller renders anything. They talk to a map widget through the [`MapView`]
//! trait and receive its clicks and camera events as [`MapEvent`]s, so they can be driven by
//! any UI toolkit (see the `photomap-egui` crate) or by tests.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod event;
pub mod gallery;
pub mod game;
pub mod geo;
pub mod link;
pub mod map_view;
pub mod progress;

#[cfg(test)]
mod tests;

pub use config::{AppConfig, AppMode};
pub use dataset::{parse_locations, DatasetLoader, DatasetSource, LocationRecord};
pub use error::PhotomapError;
pub use gallery::{FlyTarget, GalleryController, GalleryEvent, GalleryOptions};
pub use game::{GameEvent, GameSession, Guess, RoundState};
pub use geo::GeoPoint;
pub use map_view::{MapEvent, MapView, Marker, MarkerPopup, MarkerStyle};
pub use progress::{FileProgressStore, GameProgress, MemoryProgressStore, ProgressStore};
