//! Guessing game session.
//!
//! A session walks through a shuffled list of locations. Every round goes through
//! [`RoundState::Ready`] → [`RoundState::Guessed`] → [`RoundState::Revealed`], and
//! [`GameSession::advance`] starts the next round. The shuffled order and the current round
//! index are persisted through a [`ProgressStore`], so the game continues where it was left.

use log::{debug, info, warn};

use crate::dataset::LocationRecord;
use crate::geo::{distance_km, normalize_longitude, random_seed, seeded_shuffle, GeoPoint};
use crate::map_view::{MapView, Marker, MarkerStyle};
use crate::progress::{GameProgress, ProgressStore};

/// Position guessed by the player. Longitude is always in `[-180, 180)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guess {
    /// Latitude in degrees.
    pub lat: f64,
    /// Normalized longitude in degrees.
    pub lng: f64,
}

impl Guess {
    fn position(&self) -> GeoPoint {
        GeoPoint::latlon(self.lat, self.lng)
    }
}

/// State of the current round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundState {
    /// Waiting for the player to click the map.
    Ready,
    /// A guess is placed but not submitted. It can still be moved.
    Guessed(Guess),
    /// The guess is submitted and the answer is shown.
    Revealed(Guess),
}

/// Player actions delivered to a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// The map was clicked.
    MapClicked(GeoPoint),
    /// Submit the current guess.
    Submit,
    /// Go to the next round.
    Next,
}

/// Guessing game state with persisted progress.
pub struct GameSession<S: ProgressStore> {
    store: S,
    progress: GameProgress,
    round: RoundState,
}

impl<S: ProgressStore> GameSession<S> {
    /// Restores the stored game, or starts a new one with a random seed.
    ///
    /// Returns `None` if nothing is stored and the dataset is empty.
    pub fn start(dataset: &[LocationRecord], store: S) -> Option<Self> {
        Self::start_with(dataset, store, random_seed)
    }

    /// Restores the stored game, or starts a new one shuffled with the given seed.
    ///
    /// Returns `None` if nothing is stored and the dataset is empty.
    pub fn start_with_seed(dataset: &[LocationRecord], store: S, seed: u64) -> Option<Self> {
        Self::start_with(dataset, store, || seed)
    }

    fn start_with(
        dataset: &[LocationRecord],
        store: S,
        seed: impl FnOnce() -> u64,
    ) -> Option<Self> {
        if let Some(progress) = store.load().filter(|p| !p.order.is_empty()) {
            return Some(Self::restore(progress, store));
        }

        if dataset.is_empty() {
            debug!("No stored game and no locations yet, game is not started");
            return None;
        }

        let seed = seed();
        let progress = GameProgress {
            seed,
            order: seeded_shuffle(dataset, seed),
            index: 0,
        };
        info!(
            "Starting a new game of {} rounds with seed {seed}",
            progress.order.len()
        );

        let mut session = Self {
            store,
            progress,
            round: RoundState::Ready,
        };
        session.persist(&session.progress.clone());

        Some(session)
    }

    fn restore(mut progress: GameProgress, store: S) -> Self {
        let round_count = progress.order.len();
        let out_of_range = progress.index >= round_count;
        progress.index %= round_count;

        info!(
            "Continuing the game with seed {} at round {} of {round_count}",
            progress.seed,
            progress.index + 1
        );

        let mut session = Self {
            store,
            progress,
            round: RoundState::Ready,
        };
        if out_of_range {
            session.persist(&session.progress.clone());
        }

        session
    }

    fn persist(&mut self, progress: &GameProgress) {
        if let Err(err) = self.store.save(progress) {
            warn!("Failed to save game progress: {err}");
        }
    }

    /// Location of the current round.
    pub fn current(&self) -> &LocationRecord {
        &self.progress.order[self.progress.index]
    }

    /// Index of the current round in [`GameSession::order`].
    pub fn index(&self) -> usize {
        self.progress.index
    }

    /// Shuffled locations of the game.
    pub fn order(&self) -> &[LocationRecord] {
        &self.progress.order
    }

    /// Seed the game was shuffled with.
    pub fn seed(&self) -> u64 {
        self.progress.seed
    }

    /// State of the current round.
    pub fn state(&self) -> RoundState {
        self.round
    }

    /// Current guess, if any.
    pub fn guess(&self) -> Option<Guess> {
        match self.round {
            RoundState::Ready => None,
            RoundState::Guessed(guess) | RoundState::Revealed(guess) => Some(guess),
        }
    }

    /// Whether the answer of the current round is shown.
    pub fn is_revealed(&self) -> bool {
        matches!(self.round, RoundState::Revealed(_))
    }

    /// The underlying progress store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places or moves the guess. Ignored after the round is revealed.
    pub fn register_guess(&mut self, lat: f64, lng: f64) {
        if self.is_revealed() {
            debug!("Round is already revealed, guess ignored");
            return;
        }

        self.round = RoundState::Guessed(Guess {
            lat,
            lng: normalize_longitude(lng),
        });
    }

    /// Reveals the answer. Does nothing and returns `false` unless a guess is placed and not
    /// yet revealed.
    pub fn submit_guess(&mut self) -> bool {
        match self.round {
            RoundState::Guessed(guess) => {
                self.round = RoundState::Revealed(guess);
                true
            }
            RoundState::Ready | RoundState::Revealed(_) => false,
        }
    }

    /// Starts the next round, wrapping to the first one after the last.
    ///
    /// Only the round index is written to the store; the stored seed and order are kept.
    pub fn advance(&mut self) {
        self.progress.index = (self.progress.index + 1) % self.progress.order.len();
        self.round = RoundState::Ready;

        let mut stored = self
            .store
            .load()
            .unwrap_or_else(|| self.progress.clone());
        stored.index = self.progress.index;
        self.persist(&stored);
    }

    /// Distance between the guess and the answer in km, once revealed.
    pub fn distance_km(&self) -> Option<f64> {
        let RoundState::Revealed(guess) = self.round else {
            return None;
        };

        let current = self.current();
        Some(distance_km(
            guess.lat,
            guess.lng,
            current.lat,
            normalize_longitude(current.lon),
        ))
    }

    /// Distance to show to the player, with one decimal place.
    pub fn distance_label(&self) -> Option<String> {
        self.distance_km().map(format_tenths)
    }

    /// Applies a player action and updates the map.
    pub fn handle(&mut self, event: GameEvent, view: &mut dyn MapView) {
        match event {
            GameEvent::MapClicked(position) => self.register_guess(position.lat(), position.lon()),
            GameEvent::Submit => {
                if !self.submit_guess() {
                    debug!("Nothing to submit");
                }
            }
            GameEvent::Next => {
                self.advance();
                view.close_popup();
                view.reset_view();
            }
        }

        self.sync_view(view);
    }

    /// Draws the guess, and after the reveal the answer and a line between them.
    pub fn sync_view(&self, view: &mut dyn MapView) {
        let mut markers = vec![];
        let mut line = None;

        if let Some(guess) = self.guess() {
            markers.push(Marker::new(guess.position(), MarkerStyle::Guess));
        }

        if let RoundState::Revealed(guess) = self.round {
            let actual = self.current().position();
            markers.push(Marker::new(actual, MarkerStyle::Answer));
            line = Some((guess.position(), actual));
        }

        view.set_markers(markers);
        view.set_line(line);
    }
}

/// Formats with one decimal place, rounding exact ties away from zero.
fn format_tenths(value: f64) -> String {
    // Only odd multiples of 0.25 sit exactly between two tenths.
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return format!("{:.1}", (value * 10.0).round() / 10.0);
    }

    format!("{value:.1}")
}
