//! Gallery of all photo locations with a "random location" flight.

use std::time::Duration;

use log::{debug, info};
use web_time::Instant;

use crate::dataset::LocationRecord;
use crate::event::Scheduler;
use crate::geo::{random_seed, GeoPoint, Lcg};
use crate::map_view::{MapView, Marker};

const DEFAULT_FLY_TO_ZOOM: f64 = 9.0;
const DEFAULT_FLY_TO_DURATION: Duration = Duration::from_secs(3);
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

/// Parameters of the random location flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryOptions {
    fly_to_zoom: f64,
    fly_to_duration: Duration,
    cooldown: Duration,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            fly_to_zoom: DEFAULT_FLY_TO_ZOOM,
            fly_to_duration: DEFAULT_FLY_TO_DURATION,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl GalleryOptions {
    /// Zoom level the camera flies to.
    pub fn fly_to_zoom(&self) -> f64 {
        self.fly_to_zoom
    }

    /// Sets zoom level the camera flies to.
    pub fn with_fly_to_zoom(mut self, zoom: f64) -> Self {
        self.fly_to_zoom = zoom;
        self
    }

    /// Duration of the camera flight.
    pub fn fly_to_duration(&self) -> Duration {
        self.fly_to_duration
    }

    /// Sets duration of the camera flight.
    pub fn with_fly_to_duration(mut self, duration: Duration) -> Self {
        self.fly_to_duration = duration;
        self
    }

    /// Time after a pick during which new picks are rejected.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Sets time after a pick during which new picks are rejected.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// Where the camera was sent by the last pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyTarget {
    /// Target point.
    pub position: GeoPoint,
    /// Target zoom level.
    pub zoom: f64,
}

/// Events handled by the [`GalleryController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryEvent {
    /// The player asked for a random location.
    PickRandom,
    /// The map camera stopped.
    MoveEnd,
    /// The pick cooldown is over.
    CooldownElapsed,
}

/// Holds the gallery locations and drives the random location flight.
///
/// A pick sends the camera to a random location and remembers that location as the pending
/// focus. When the map reports that the camera stopped, the popup of the pending location is
/// opened once. Picks are rejected while the controller is busy; the busy flag is cleared by a
/// scheduled [`GalleryEvent::CooldownElapsed`].
pub struct GalleryController {
    locations: Vec<LocationRecord>,
    options: GalleryOptions,
    rng: Lcg,
    busy: bool,
    pending_focus: Option<usize>,
    fly_target: Option<FlyTarget>,
    scheduler: Scheduler<GalleryEvent>,
}

impl GalleryController {
    /// Creates an empty gallery picking locations randomly.
    pub fn new(options: GalleryOptions) -> Self {
        Self::with_seed(options, random_seed())
    }

    /// Creates an empty gallery with a reproducible pick sequence.
    pub fn with_seed(options: GalleryOptions, seed: u64) -> Self {
        Self {
            locations: vec![],
            options,
            rng: Lcg::new(seed),
            busy: false,
            pending_focus: None,
            fly_target: None,
            scheduler: Scheduler::new(),
        }
    }

    /// Replaces the locations and shows them on the map.
    pub fn set_locations(&mut self, locations: Vec<LocationRecord>, view: &mut dyn MapView) {
        info!("Gallery shows {} locations", locations.len());
        self.locations = locations;
        self.pending_focus = None;
        self.sync_view(view);
    }

    /// Puts the location markers on the map.
    pub fn sync_view(&self, view: &mut dyn MapView) {
        view.set_markers(self.locations.iter().map(Marker::location).collect());
        view.set_line(None);
    }

    /// All locations of the gallery.
    pub fn locations(&self) -> &[LocationRecord] {
        &self.locations
    }

    /// Whether a pick is in progress and new picks are rejected.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Index of the location whose popup will be opened when the camera stops.
    pub fn pending_focus(&self) -> Option<usize> {
        self.pending_focus
    }

    /// Target of the last flight.
    pub fn fly_target(&self) -> Option<FlyTarget> {
        self.fly_target
    }

    /// Deadline of the next scheduled event.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Sends the camera to a random location. Returns `false` if there are no locations or the
    /// previous pick is still in progress.
    pub fn pick_random(&mut self, now: Instant, view: &mut dyn MapView) -> bool {
        if self.locations.is_empty() || self.busy {
            debug!("Random pick rejected (busy: {})", self.busy);
            return false;
        }

        let index = self.rng.next_index(self.locations.len());
        let location = &self.locations[index];
        let target = FlyTarget {
            position: location.position(),
            zoom: self.options.fly_to_zoom,
        };
        debug!("Flying to {:?} ({index})", location.title);

        self.busy = true;
        self.pending_focus = Some(index);
        self.fly_target = Some(target);

        view.close_popup();
        view.fly_to(target.position, target.zoom, self.options.fly_to_duration);
        self.scheduler
            .schedule(now + self.options.cooldown, GalleryEvent::CooldownElapsed);

        true
    }

    /// Handles an event.
    pub fn handle(&mut self, event: GalleryEvent, now: Instant, view: &mut dyn MapView) {
        match event {
            GalleryEvent::PickRandom => {
                self.pick_random(now, view);
            }
            GalleryEvent::MoveEnd => self.focus_pending(view),
            GalleryEvent::CooldownElapsed => {
                self.busy = false;
            }
        }
    }

    /// Delivers the scheduled events that are due at `now`.
    pub fn tick(&mut self, now: Instant, view: &mut dyn MapView) {
        for event in self.scheduler.take_due(now) {
            self.handle(event, now, view);
        }
    }

    fn focus_pending(&mut self, view: &mut dyn MapView) {
        let Some(index) = self.pending_focus else {
            return;
        };

        if view.open_popup(index) {
            self.pending_focus = None;
        } else {
            debug!("Marker {index} is not on the map yet");
        }
    }
}
