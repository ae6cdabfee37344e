use egui::{Align, Layout, RichText};
use log::{debug, info};
use photomap::event::{Clock, Inbox, InboxSender, Messenger, SystemClock};
use photomap::link::image_search_url;
use photomap::{
    AppConfig, AppMode, FileProgressStore, GalleryController, GalleryEvent, GameEvent,
    GameSession, LocationRecord, MapEvent,
};

use crate::egui_map::{EguiMapView, MapCamera};

const LUCKY_LABEL: &str = "I'm Feeling Lucky";
const SPINNING_LABEL: &str = "Spinning the Globe… 🎲";

/// Messages processed by [`PhotomapApp`] at the start of every frame.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    /// The location table is loaded. Empty if loading failed.
    DatasetLoaded(Vec<LocationRecord>),
    /// Event for the gallery controller.
    Gallery(GalleryEvent),
    /// Event for the game session.
    Game(GameEvent),
    /// Event produced by the map of the given mode.
    Map(AppMode, MapEvent),
}

/// Desktop application with a gallery map and a guessing game map.
pub struct PhotomapApp {
    config: AppConfig,
    mode: AppMode,
    clock: SystemClock,
    inbox: Inbox<AppMessage>,
    dataset_ready: bool,
    locations: Vec<LocationRecord>,
    gallery: GalleryController,
    gallery_map: EguiMapView,
    game: Option<GameSession<FileProgressStore>>,
    game_map: EguiMapView,
    game_start_attempted: bool,
}

impl PhotomapApp {
    /// Creates the application. `messenger` is notified when a message arrives from another
    /// thread.
    pub fn new(config: AppConfig, messenger: impl Messenger + 'static) -> Self {
        let camera = MapCamera::new(config.initial_center(), config.initial_zoom());
        let gallery = match config.seed() {
            Some(seed) => GalleryController::with_seed(config.gallery_options(), seed),
            None => GalleryController::new(config.gallery_options()),
        };

        Self {
            mode: config.start_mode(),
            clock: SystemClock,
            inbox: Inbox::with_messenger(messenger),
            dataset_ready: false,
            locations: vec![],
            gallery,
            gallery_map: EguiMapView::new(camera),
            game: None,
            game_map: EguiMapView::new(camera),
            game_start_attempted: false,
            config,
        }
    }

    /// Sender to deliver messages from background tasks.
    pub fn sender(&self) -> InboxSender<AppMessage> {
        self.inbox.sender()
    }

    /// Current mode.
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Switches between the gallery and the game.
    pub fn set_mode(&mut self, mode: AppMode) {
        if self.mode == mode {
            return;
        }

        info!("Switching to {mode:?} mode");
        self.mode = mode;
        if mode == AppMode::Quiz {
            self.ensure_game();
        }
    }

    /// Handles all queued messages.
    pub fn process_messages(&mut self) {
        let messages: Vec<_> = self.inbox.drain().collect();
        for message in messages {
            self.handle_message(message);
        }

        let now = self.clock.now();
        self.gallery.tick(now, &mut self.gallery_map);
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::DatasetLoaded(locations) => {
                self.dataset_ready = true;
                self.locations = locations;
                self.gallery
                    .set_locations(self.locations.clone(), &mut self.gallery_map);
                if self.mode == AppMode::Quiz {
                    self.ensure_game();
                }
            }
            AppMessage::Gallery(event) => {
                self.gallery
                    .handle(event, self.clock.now(), &mut self.gallery_map);
            }
            AppMessage::Game(event) => {
                if let Some(game) = &mut self.game {
                    game.handle(event, &mut self.game_map);
                }
            }
            AppMessage::Map(AppMode::Gallery, MapEvent::MoveEnd) => {
                self.handle_message(AppMessage::Gallery(GalleryEvent::MoveEnd));
            }
            AppMessage::Map(AppMode::Quiz, MapEvent::Click(position)) => {
                self.handle_message(AppMessage::Game(GameEvent::MapClicked(position)));
            }
            AppMessage::Map(mode, event) => debug!("Ignoring {event:?} of the {mode:?} map"),
        }
    }

    fn ensure_game(&mut self) {
        if !self.dataset_ready || self.game_start_attempted {
            return;
        }
        self.game_start_attempted = true;

        let store = FileProgressStore::new(self.config.storage_dir(), self.config.storage_key());
        let game = match self.config.seed() {
            Some(seed) => GameSession::start_with_seed(&self.locations, store, seed),
            None => GameSession::start(&self.locations, store),
        };

        if let Some(game) = &game {
            game.sync_view(&mut self.game_map);
        }
        self.game = game;
    }

    fn top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut quiz = self.mode == AppMode::Quiz;
                if ui.checkbox(&mut quiz, "Quiz Mode").changed() {
                    self.set_mode(if quiz { AppMode::Quiz } else { AppMode::Gallery });
                }

                if self.mode == AppMode::Gallery {
                    ui.separator();
                    let busy = self.gallery.is_busy();
                    let label = if busy { SPINNING_LABEL } else { LUCKY_LABEL };
                    let enabled = !busy && !self.gallery.locations().is_empty();
                    if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                        self.inbox
                            .push(AppMessage::Gallery(GalleryEvent::PickRandom));
                    }
                }

                if !self.dataset_ready {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.spinner();
                        ui.label("Loading locations…");
                    });
                }
            });
        });
    }

    fn quiz_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("quiz_panel")
            .resizable(false)
            .min_width(220.0)
            .show(ctx, |ui| {
                let Some(game) = &self.game else {
                    if self.dataset_ready {
                        ui.label("No locations to play with.");
                    } else {
                        ui.spinner();
                    }
                    return;
                };

                ui.heading(format!("Round {} of {}", game.index() + 1, game.order().len()));
                let location = game.current();
                ui.hyperlink_to("Open the photo", &location.image);
                ui.add_space(8.0);

                if game.is_revealed() {
                    ui.label(RichText::new(&location.title).strong().size(16.0));
                    if let Some(date) = &location.date {
                        ui.weak(date);
                    }
                    if let Some(distance) = game.distance_label() {
                        ui.label(format!("You were {distance} km away"));
                    }
                    ui.hyperlink_to("View images on Google", image_search_url(&location.title));
                    ui.add_space(8.0);
                    if ui.button("Next").clicked() {
                        self.inbox.push(AppMessage::Game(GameEvent::Next));
                    }
                } else {
                    ui.label("Click on the map to guess");
                    if let Some(guess) = game.guess() {
                        ui.weak(format!("{:.3}, {:.3}", guess.lat, guess.lng));
                    }
                    let submit = egui::Button::new("Submit Guess");
                    if ui.add_enabled(game.guess().is_some(), submit).clicked() {
                        self.inbox.push(AppMessage::Game(GameEvent::Submit));
                    }
                }
            });
    }
}

impl eframe::App for PhotomapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        self.top_panel(ctx);
        if self.mode == AppMode::Quiz {
            self.quiz_panel(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let map = match self.mode {
                    AppMode::Gallery => &mut self.gallery_map,
                    AppMode::Quiz => &mut self.game_map,
                };
                for event in map.show(ui) {
                    self.inbox.push(AppMessage::Map(self.mode, event));
                }
            });

        if let Some(deadline) = self.gallery.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(self.clock.now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use photomap::event::DummyMessenger;
    use photomap::{GeoPoint, MapView, ProgressStore, RoundState};

    use super::*;

    fn location(n: u32) -> LocationRecord {
        LocationRecord {
            title: format!("Place {n}"),
            image: format!("https://img.example/{n}.jpg"),
            date: None,
            lat: n as f64,
            lon: 2.0 * n as f64,
        }
    }

    fn app(name: &str) -> (PhotomapApp, PathBuf) {
        let dir = std::env::temp_dir().join(format!("photomap-app-{name}-{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        let config = AppConfig::default()
            .with_storage_dir(dir.clone())
            .with_seed(3);
        (PhotomapApp::new(config, DummyMessenger), dir)
    }

    #[test]
    fn game_starts_when_quiz_mode_is_entered() {
        let (mut app, dir) = app("enter");
        app.inbox
            .push(AppMessage::DatasetLoaded((0..3).map(location).collect()));
        app.process_messages();
        assert!(app.game.is_none());
        assert_eq!(app.gallery.locations().len(), 3);

        app.set_mode(AppMode::Quiz);
        let game = app.game.as_ref().expect("game not started");
        assert_eq!(game.seed(), 3);
        assert!(game.store().load().is_some());
        assert!(dir.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn quiz_map_clicks_reach_the_game() {
        let (mut app, dir) = app("clicks");
        let home = app.game_map.camera();
        app.set_mode(AppMode::Quiz);
        assert!(app.game.is_none());

        let sender = app.sender();
        sender.send(AppMessage::DatasetLoaded((0..3).map(location).collect()));
        sender.send(AppMessage::Map(
            AppMode::Quiz,
            MapEvent::Click(GeoPoint::latlon(1.0, 362.0)),
        ));
        sender.send(AppMessage::Map(
            AppMode::Gallery,
            MapEvent::Click(GeoPoint::latlon(5.0, 5.0)),
        ));
        app.process_messages();

        let game = app.game.as_ref().expect("game not started");
        let guess = game.guess().expect("no guess");
        assert_eq!(guess.lat, 1.0);
        assert!((guess.lng - 2.0).abs() < 1e-9);

        app.handle_message(AppMessage::Game(GameEvent::Submit));
        let game = app.game.as_ref().expect("game not started");
        assert!(matches!(game.state(), RoundState::Revealed(_)));

        app.game_map
            .fly_to(GeoPoint::latlon(40.0, 40.0), 6.0, Duration::ZERO);
        app.handle_message(AppMessage::Game(GameEvent::Next));
        assert!(!app.game_map.is_flying());
        assert_eq!(app.game_map.camera(), home);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn lucky_pick_makes_gallery_busy() {
        let (mut app, dir) = app("lucky");
        app.handle_message(AppMessage::DatasetLoaded((0..3).map(location).collect()));
        app.handle_message(AppMessage::Gallery(GalleryEvent::PickRandom));

        assert!(app.gallery.is_busy());
        assert!(app.gallery_map.is_flying());
        assert!(app.gallery.next_deadline().is_some());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_dataset_gives_no_game() {
        let (mut app, dir) = app("empty");
        app.set_mode(AppMode::Quiz);
        app.handle_message(AppMessage::DatasetLoaded(vec![]));
        assert!(app.game.is_none());
        assert!(app.dataset_ready);
        assert!(!dir.exists());
    }
}
