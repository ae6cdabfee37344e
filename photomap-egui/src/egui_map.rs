use std::time::Duration;

use egui::{
    pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2,
};
use photomap::geo::normalize_longitude;
use photomap::{GeoPoint, MapEvent, MapView, Marker, MarkerStyle};
use web_time::Instant;

/// Width of the whole world in pixels at zoom level 0.
const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 18.0;
const ZOOM_SPEED: f64 = 0.002;
const MARKER_RADIUS: f32 = 6.0;
const MARKER_HIT_RADIUS: f32 = 10.0;

const OCEAN_COLOR: Color32 = Color32::from_rgb(170, 211, 223);
const GRID_COLOR: Color32 = Color32::from_rgb(140, 180, 195);
const LINE_COLOR: Color32 = Color32::from_rgb(220, 50, 47);

/// Position and zoom level of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCamera {
    center: GeoPoint,
    zoom: f64,
}

impl MapCamera {
    /// Creates a camera. The zoom level is clamped to the supported range.
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Point in the middle of the screen.
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    fn pixels_per_degree(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom) / 360.0
    }

    /// Screen position of the point. Of all world copies the one closest to the center is used.
    pub fn geo_to_screen(&self, point: GeoPoint, rect: Rect) -> Pos2 {
        let scale = self.pixels_per_degree();
        let d_lon = normalize_longitude(point.lon() - self.center.lon());
        let d_lat = point.lat() - self.center.lat();

        rect.center() + vec2((d_lon * scale) as f32, (-d_lat * scale) as f32)
    }

    /// Geographic position of the screen point. The longitude is not wrapped.
    pub fn screen_to_geo(&self, position: Pos2, rect: Rect) -> GeoPoint {
        let scale = self.pixels_per_degree();
        let offset = position - rect.center();

        GeoPoint::latlon(
            (self.center.lat() - offset.y as f64 / scale).clamp(-90.0, 90.0),
            self.center.lon() + offset.x as f64 / scale,
        )
    }

    fn pan(&mut self, delta: Vec2) {
        let scale = self.pixels_per_degree();
        self.center = GeoPoint::latlon(
            (self.center.lat() + delta.y as f64 / scale).clamp(-90.0, 90.0),
            normalize_longitude(self.center.lon() - delta.x as f64 / scale),
        );
    }

    fn interpolate(&self, target: &MapCamera, k: f64) -> Self {
        let d_lon = normalize_longitude(target.center.lon() - self.center.lon());
        Self {
            center: GeoPoint::latlon(
                self.center.lat() + (target.center.lat() - self.center.lat()) * k,
                normalize_longitude(self.center.lon() + d_lon * k),
            ),
            zoom: self.zoom + (target.zoom - self.zoom) * k,
        }
    }
}

struct Flight {
    from: MapCamera,
    to: MapCamera,
    start_time: Instant,
    duration: Duration,
}

/// Equirectangular world map drawn with the egui painter.
///
/// Implements [`MapView`] for the controllers. Clicks and camera stops are collected while the
/// map is shown and returned from [`EguiMapView::show`].
pub struct EguiMapView {
    home: MapCamera,
    camera: MapCamera,
    markers: Vec<Marker>,
    line: Option<(GeoPoint, GeoPoint)>,
    popup: Option<usize>,
    flight: Option<Flight>,
    events: Vec<MapEvent>,
}

impl EguiMapView {
    /// Creates an empty map.
    pub fn new(camera: MapCamera) -> Self {
        Self {
            home: camera,
            camera,
            markers: vec![],
            line: None,
            popup: None,
            flight: None,
            events: vec![],
        }
    }

    /// Current camera.
    pub fn camera(&self) -> MapCamera {
        self.camera
    }

    /// Whether a fly-to animation is running.
    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Draws the map into all available space and returns the events produced since the last
    /// call.
    pub fn show(&mut self, ui: &mut Ui) -> Vec<MapEvent> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        self.animate(ui);
        self.process_input(ui, &response, rect);

        self.draw(ui, rect);
        self.show_popup(ui, rect);

        std::mem::take(&mut self.events)
    }

    fn animate(&mut self, ui: &Ui) {
        let Some(flight) = &self.flight else {
            return;
        };

        let k = if flight.duration.is_zero() {
            1.0
        } else {
            flight.start_time.elapsed().as_secs_f64() / flight.duration.as_secs_f64()
        };

        if k >= 1.0 {
            self.camera = flight.to;
            self.flight = None;
            self.events.push(MapEvent::MoveEnd);
        } else {
            self.camera = flight.from.interpolate(&flight.to, ease_in_out(k));
            ui.ctx().request_repaint();
        }
    }

    fn process_input(&mut self, ui: &Ui, response: &Response, rect: Rect) {
        if response.dragged() {
            self.flight = None;
            self.camera.pan(response.drag_delta());
        }

        if response.drag_stopped() {
            self.events.push(MapEvent::MoveEnd);
        }

        if response.hovered() {
            let scroll = ui.input(|input| input.smooth_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                self.flight = None;
                self.camera.zoom =
                    (self.camera.zoom + scroll as f64 * ZOOM_SPEED).clamp(MIN_ZOOM, MAX_ZOOM);
            }
        }

        if response.clicked() {
            let Some(position) = response.interact_pointer_pos() else {
                return;
            };

            match self.marker_at(position, rect) {
                Some(index) => self.popup = Some(index),
                None => {
                    let point = self.camera.screen_to_geo(position, rect);
                    log::debug!("Map clicked at {point:?}");
                    self.events.push(MapEvent::Click(point));
                }
            }
        }
    }

    fn marker_at(&self, position: Pos2, rect: Rect) -> Option<usize> {
        self.markers
            .iter()
            .enumerate()
            .filter(|(_, marker)| marker.popup.is_some())
            .map(|(index, marker)| {
                let screen = self.camera.geo_to_screen(marker.position, rect);
                (index, screen.distance(position))
            })
            .filter(|(_, distance)| *distance <= MARKER_HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    fn draw(&self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, OCEAN_COLOR);

        let step = if self.camera.zoom < 4.0 { 30.0 } else { 5.0 };
        let grid_stroke = Stroke::new(1.0, GRID_COLOR);

        let mut lat = -90.0;
        while lat <= 90.0 {
            let y = self.camera.geo_to_screen(GeoPoint::latlon(lat, 0.0), rect).y;
            let stroke = if lat == 0.0 {
                Stroke::new(2.0, GRID_COLOR)
            } else {
                grid_stroke
            };
            painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
            lat += step;
        }

        let mut lon = -180.0;
        while lon < 180.0 {
            let x = self.camera.geo_to_screen(GeoPoint::latlon(0.0, lon), rect).x;
            painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], grid_stroke);
            lon += step;
        }

        if let Some((from, to)) = self.line {
            painter.line_segment(
                [
                    self.camera.geo_to_screen(from, rect),
                    self.camera.geo_to_screen(to, rect),
                ],
                Stroke::new(2.0, LINE_COLOR),
            );
        }

        for marker in &self.markers {
            let position = self.camera.geo_to_screen(marker.position, rect);
            if !rect.expand(MARKER_RADIUS).contains(position) {
                continue;
            }

            painter.circle(
                position,
                MARKER_RADIUS,
                marker_color(marker.style),
                Stroke::new(1.5, Color32::WHITE),
            );
        }

        painter.text(
            rect.right_bottom() - vec2(6.0, 4.0),
            Align2::RIGHT_BOTTOM,
            format!("zoom {:.1}", self.camera.zoom),
            FontId::proportional(11.0),
            Color32::DARK_GRAY,
        );
    }

    fn show_popup(&mut self, ui: &Ui, rect: Rect) {
        let Some(index) = self.popup else {
            return;
        };
        let Some(popup) = self.markers.get(index).and_then(|m| m.popup.as_ref()) else {
            self.popup = None;
            return;
        };

        let anchor = self.camera.geo_to_screen(self.markers[index].position, rect);
        let mut close = false;

        egui::Area::new(ui.id().with("marker_popup"))
            .fixed_pos(anchor + vec2(MARKER_RADIUS, MARKER_RADIUS))
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(300.0);
                    ui.horizontal(|ui| {
                        ui.strong(&popup.title);
                        if ui.small_button("✕").clicked() {
                            close = true;
                        }
                    });
                    if let Some(date) = &popup.date {
                        ui.weak(date);
                    }
                    ui.hyperlink_to("Photo", &popup.image);
                    ui.hyperlink_to("View images on Google", &popup.search_url);
                });
            });

        if close {
            self.popup = None;
        }
    }
}

impl MapView for EguiMapView {
    fn set_markers(&mut self, markers: Vec<Marker>) {
        if self.popup.is_some_and(|index| index >= markers.len()) {
            self.popup = None;
        }
        self.markers = markers;
    }

    fn set_line(&mut self, line: Option<(GeoPoint, GeoPoint)>) {
        self.line = line;
    }

    fn fly_to(&mut self, target: GeoPoint, zoom: f64, duration: Duration) {
        self.flight = Some(Flight {
            from: self.camera,
            to: MapCamera::new(target, zoom),
            start_time: Instant::now(),
            duration,
        });
    }

    fn open_popup(&mut self, marker: usize) -> bool {
        let exists = self
            .markers
            .get(marker)
            .is_some_and(|marker| marker.popup.is_some());
        if exists {
            self.popup = Some(marker);
        }

        exists
    }

    fn close_popup(&mut self) {
        self.popup = None;
    }

    fn reset_view(&mut self) {
        self.flight = None;
        self.camera = self.home;
    }
}

fn marker_color(style: MarkerStyle) -> Color32 {
    match style {
        MarkerStyle::Location => Color32::from_rgb(38, 139, 210),
        MarkerStyle::Guess => Color32::from_rgb(203, 75, 22),
        MarkerStyle::Answer => Color32::from_rgb(133, 153, 0),
    }
}

fn ease_in_out(k: f64) -> f64 {
    let k = k.clamp(0.0, 1.0);
    k * k * (3.0 - 2.0 * k)
}
