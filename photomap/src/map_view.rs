//! Interface of the map widget the controllers draw on.
//!
//! Controllers never render anything themselves. They describe markers, lines and camera moves
//! through the [`MapView`] trait, and the widget reports user interaction back as [`MapEvent`]s.

use std::time::Duration;

use crate::dataset::LocationRecord;
use crate::geo::GeoPoint;
use crate::link::image_search_url;

/// What a marker stands for. Widgets use it to pick the marker appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// A photo location in the gallery.
    Location,
    /// Position guessed by the player.
    Guess,
    /// Actual location of the photo after the guess is revealed.
    Answer,
}

/// Detail view shown when a marker is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    /// Name of the place.
    pub title: String,
    /// Date of the photo, if known.
    pub date: Option<String>,
    /// Url or path of the photo.
    pub image: String,
    /// Link to more images of the place.
    pub search_url: String,
}

impl From<&LocationRecord> for MarkerPopup {
    fn from(location: &LocationRecord) -> Self {
        Self {
            title: location.title.clone(),
            date: location.date.clone(),
            image: location.image.clone(),
            search_url: image_search_url(&location.title),
        }
    }
}

/// Point marker placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Marker position.
    pub position: GeoPoint,
    /// Marker kind.
    pub style: MarkerStyle,
    /// Detail view bound to the marker.
    pub popup: Option<MarkerPopup>,
}

impl Marker {
    /// Creates a marker without a popup.
    pub fn new(position: GeoPoint, style: MarkerStyle) -> Self {
        Self {
            position,
            style,
            popup: None,
        }
    }

    /// Gallery marker of a location with its popup.
    pub fn location(location: &LocationRecord) -> Self {
        Self {
            position: location.position(),
            style: MarkerStyle::Location,
            popup: Some(location.into()),
        }
    }
}

/// Events emitted by the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// The map was clicked at the given position. Longitude is not normalized, as a widget
    /// showing several world copies can report values outside of `[-180, 180)`.
    Click(GeoPoint),
    /// The camera stopped moving, either after an animation or user panning. May be emitted
    /// any number of times.
    MoveEnd,
}

/// Map widget capabilities used by the controllers.
pub trait MapView {
    /// Replaces all markers on the map.
    fn set_markers(&mut self, markers: Vec<Marker>);
    /// Draws a line between two points, or removes the line if `None` is given.
    fn set_line(&mut self, line: Option<(GeoPoint, GeoPoint)>);
    /// Animates the camera to the given point and zoom level.
    fn fly_to(&mut self, target: GeoPoint, zoom: f64, duration: Duration);
    /// Opens the popup of the marker with the given index in the last [`MapView::set_markers`]
    /// list. Returns `false` if there is no such marker or it has no popup.
    fn open_popup(&mut self, marker: usize) -> bool;
    /// Closes any opened popup.
    fn close_popup(&mut self);
    /// Returns the camera to the initial view.
    fn reset_view(&mut self);
}
