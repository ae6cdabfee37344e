use std::time::Duration;

use crate::dataset::LocationRecord;
use crate::geo::GeoPoint;
use crate::map_view::{MapView, Marker};

pub(crate) fn location(n: usize) -> LocationRecord {
    LocationRecord {
        title: format!("Place {n}"),
        image: format!("https://img.example/{n}.jpg"),
        date: None,
        lat: n as f64,
        lon: n as f64 * 2.0,
    }
}

pub(crate) fn locations(count: usize) -> Vec<LocationRecord> {
    (0..count).map(location).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Flight {
    pub target: GeoPoint,
    pub zoom: f64,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingMapView {
    pub markers: Vec<Marker>,
    pub line: Option<(GeoPoint, GeoPoint)>,
    pub flights: Vec<Flight>,
    pub opened_popups: Vec<usize>,
    pub view_resets: usize,
}

impl MapView for RecordingMapView {
    fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
    }

    fn set_line(&mut self, line: Option<(GeoPoint, GeoPoint)>) {
        self.line = line;
    }

    fn fly_to(&mut self, target: GeoPoint, zoom: f64, duration: Duration) {
        self.flights.push(Flight {
            target,
            zoom,
            duration,
        });
    }

    fn open_popup(&mut self, marker: usize) -> bool {
        let exists = self
            .markers
            .get(marker)
            .is_some_and(|marker| marker.popup.is_some());
        if exists {
            self.opened_popups.push(marker);
        }

        exists
    }

    fn close_popup(&mut self) {}

    fn reset_view(&mut self) {
        self.view_resets += 1;
    }
}
