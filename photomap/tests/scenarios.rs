use std::time::Duration;

use approx::assert_relative_eq;
use photomap::event::{Clock, Inbox, ManualClock};
use photomap::geo::seeded_shuffle;
use photomap::{
    parse_locations, GalleryController, GalleryEvent, GalleryOptions, GameEvent, GameSession,
    GeoPoint, MapEvent, MapView, Marker, MemoryProgressStore, ProgressStore,
};

const TABLE: &str = "\
title,image,date,latitude,longitude
Machu Picchu,https://img.example/machu.jpg,2018-07-12,-13.1631,-72.5450
Broken row,https://img.example/broken.jpg,2018-07-13,abc,-72.5
Great Wall,https://img.example/wall.jpg,2019-10-01,40.4319,116.5704
Null Island,https://img.example/null.jpg,,0,180
";

#[derive(Default)]
struct TestMapView {
    markers: Vec<Marker>,
    line: Option<(GeoPoint, GeoPoint)>,
    flights: Vec<GeoPoint>,
    opened: Vec<usize>,
    resets: usize,
}

impl MapView for TestMapView {
    fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
    }

    fn set_line(&mut self, line: Option<(GeoPoint, GeoPoint)>) {
        self.line = line;
    }

    fn fly_to(&mut self, target: GeoPoint, _zoom: f64, _duration: Duration) {
        self.flights.push(target);
    }

    fn open_popup(&mut self, marker: usize) -> bool {
        if marker < self.markers.len() {
            self.opened.push(marker);
            true
        } else {
            false
        }
    }

    fn close_popup(&mut self) {}

    fn reset_view(&mut self) {
        self.resets += 1;
    }
}

#[test]
fn invalid_rows_are_dropped() {
    let locations = parse_locations(TABLE);
    assert_eq!(locations.len(), 3);
    assert!(locations.iter().all(|l| l.title != "Broken row"));
}

#[test]
fn fresh_game_persists_seed_order_and_index() {
    let dataset = parse_locations(TABLE);
    let seed = 123_456;

    let session = GameSession::start_with_seed(&dataset, MemoryProgressStore::new(), seed)
        .expect("game not started");
    let expected_order = seeded_shuffle(&dataset, seed);
    assert_eq!(session.order(), expected_order.as_slice());

    let stored: serde_json::Value = serde_json::from_str(
        session.store().raw().expect("progress was not saved"),
    )
    .expect("stored progress is not json");
    assert_eq!(
        stored,
        serde_json::json!({
            "seed": seed,
            "order": serde_json::to_value(&expected_order).expect("failed to encode order"),
            "index": 0,
        })
    );
}

#[test]
fn game_continues_from_stored_progress() {
    let dataset = parse_locations(TABLE);
    let mut session = GameSession::start_with_seed(&dataset, MemoryProgressStore::new(), 5)
        .expect("game not started");
    session.advance();

    let store = session.store().clone();
    let order = session.order().to_vec();
    drop(session);

    let restored = GameSession::start_with_seed(&dataset, store, 6).expect("game not restored");
    assert_eq!(restored.seed(), 5);
    assert_eq!(restored.order(), order.as_slice());
    assert_eq!(restored.index(), 1);
}

#[test]
fn exact_guess_scores_zero() {
    let dataset = parse_locations("title,image,date,latitude,longitude\nSpot,s.jpg,,10,20\n");
    let mut session = GameSession::start_with_seed(&dataset, MemoryProgressStore::new(), 1)
        .expect("game not started");

    session.register_guess(10.0, 20.0);
    assert!(session.submit_guess());
    assert_eq!(session.distance_label().as_deref(), Some("0.0"));
}

#[test]
fn half_way_around_the_equator() {
    let dataset = parse_locations("title,image,date,latitude,longitude\nFar,f.jpg,,0,180\n");
    let mut session = GameSession::start_with_seed(&dataset, MemoryProgressStore::new(), 1)
        .expect("game not started");

    session.register_guess(0.0, 0.0);
    session.submit_guess();

    assert_relative_eq!(
        session.distance_km().expect("not revealed"),
        20015.1,
        epsilon = 0.05
    );
    assert_eq!(session.distance_label().as_deref(), Some("20015.1"));
}

#[test]
fn full_round_through_the_inbox() {
    let dataset = parse_locations(TABLE);
    let mut view = TestMapView::default();
    let mut session = GameSession::start_with_seed(&dataset, MemoryProgressStore::new(), 77)
        .expect("game not started");
    let inbox = Inbox::new();

    inbox.push(MapEvent::Click(GeoPoint::latlon(12.0, 400.0)));
    inbox.push(MapEvent::Click(GeoPoint::latlon(13.0, 14.0)));
    for event in inbox.drain() {
        if let MapEvent::Click(position) = event {
            session.handle(GameEvent::MapClicked(position), &mut view);
        }
    }

    let guess = session.guess().expect("no guess");
    assert_eq!((guess.lat, guess.lng), (13.0, 14.0));
    assert_eq!(view.markers.len(), 1);

    session.handle(GameEvent::Submit, &mut view);
    session.handle(GameEvent::MapClicked(GeoPoint::latlon(-5.0, -5.0)), &mut view);
    assert_eq!(session.guess().map(|g| g.lat), Some(13.0));
    assert_eq!(
        view.line,
        Some((GeoPoint::latlon(13.0, 14.0), session.current().position()))
    );

    assert_eq!(view.resets, 0);
    session.handle(GameEvent::Next, &mut view);
    assert_eq!(view.resets, 1);
    assert_eq!(session.index(), 1);
    assert_eq!(session.store().load().map(|p| p.index), Some(1));
}

#[test]
fn gallery_lucky_flight() {
    let clock = ManualClock::new();
    let mut view = TestMapView::default();
    let mut gallery = GalleryController::with_seed(GalleryOptions::default(), 2024);
    gallery.set_locations(parse_locations(TABLE), &mut view);

    gallery.handle(GalleryEvent::PickRandom, clock.now(), &mut view);
    gallery.handle(GalleryEvent::PickRandom, clock.now(), &mut view);
    assert_eq!(view.flights.len(), 1);

    let focus = gallery.pending_focus().expect("no pending focus");
    assert_eq!(view.flights[0], gallery.locations()[focus].position());

    gallery.handle(GalleryEvent::MoveEnd, clock.now(), &mut view);
    gallery.handle(GalleryEvent::MoveEnd, clock.now(), &mut view);
    assert_eq!(view.opened, vec![focus]);

    clock.advance(Duration::from_secs(3));
    gallery.tick(clock.now(), &mut view);
    assert!(!gallery.is_busy());

    gallery.handle(GalleryEvent::PickRandom, clock.now(), &mut view);
    assert_eq!(view.flights.len(), 2);
}
