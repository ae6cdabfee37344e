//! Geodesic helpers and the deterministic shuffle used by the guessing game.

use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

/// Mean Earth radius in kilometers used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Upper bound (exclusive) of freshly generated shuffle seeds.
const MAX_SEED: u64 = 1_000_000_000;

/// Point on the Earth surface, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude in degrees.
    pub fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Returns the same point with the longitude wrapped into `[-180, 180)`.
    pub fn normalized(&self) -> Self {
        Self {
            lat: self.lat,
            lon: normalize_longitude(self.lon),
        }
    }

    /// Great circle distance to the other point in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Great circle distance between two points given in degrees, computed with the haversine formula.
pub fn distance_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let d_lat = (lat_b - lat_a).to_radians();
    let d_lon = (lon_b - lon_a).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` slightly above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Wraps any longitude value into the `[-180, 180)` range.
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0);
    if wrapped >= 360.0 {
        -180.0
    } else {
        wrapped - 180.0
    }
}

/// Linear congruential generator producing values in `[0, 1)`.
///
/// The constants are small enough that the sequence is identical on every platform, which keeps
/// shuffled game orders reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 9301;
    const INCREMENT: u64 = 49297;
    const MODULUS: u64 = 233280;

    /// Creates a generator starting from the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        // Reducing first gives the same residue as `seed * 9301 + 49297` without overflow.
        self.state =
            ((self.state % Self::MODULUS) * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        self.state as f64 / Self::MODULUS as f64
    }

    /// Returns a pseudo-random index in `0..len`. `len` must not be zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "cannot pick an index from an empty range");
        let index = (self.next_f64() * len as f64).floor() as usize;
        index.min(len.saturating_sub(1))
    }
}

/// Returns a permutation of `items` determined only by `seed`.
///
/// Fisher-Yates shuffle walking from the last position down, driven by [`Lcg`].
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut result = items.to_vec();
    let mut rng = Lcg::new(seed);

    let mut remaining = result.len();
    while remaining > 0 {
        let index = rng.next_index(remaining);
        remaining -= 1;
        result.swap(remaining, index);
    }

    result
}

/// Generates a fresh shuffle seed from the OS randomness source.
pub fn random_seed() -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::fill(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes) % MAX_SEED,
        Err(err) => {
            log::warn!("Random source is unavailable ({err}), seeding from the clock");
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64 % MAX_SEED)
                .unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn distance_to_itself_is_zero() {
        for (lat, lon) in [(0.0, 0.0), (10.0, 20.0), (-89.9, 179.9), (51.5, -0.12)] {
            assert_abs_diff_eq!(distance_km(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((48.8584, 2.2945), (40.6892, -74.0445)),
            ((-33.8568, 151.2153), (35.6586, 139.7454)),
            ((0.0, 0.0), (0.0, 180.0)),
        ];

        for ((lat_a, lon_a), (lat_b, lon_b)) in pairs {
            assert_relative_eq!(
                distance_km(lat_a, lon_a, lat_b, lon_b),
                distance_km(lat_b, lon_b, lat_a, lon_a),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn distance_along_equator_to_antimeridian() {
        assert_relative_eq!(distance_km(0.0, 0.0, 0.0, 180.0), 20015.0868, epsilon = 1e-3);
    }

    #[test]
    fn distance_between_cities() {
        let paris = GeoPoint::latlon(48.8584, 2.2945);
        let new_york = GeoPoint::latlon(40.6892, -74.0445);
        assert_relative_eq!(paris.distance_km(&new_york), 5837.4158, epsilon = 1e-3);
    }

    #[test]
    fn distance_ignores_longitude_wraparound() {
        assert_abs_diff_eq!(distance_km(10.0, 180.0, 10.0, -180.0), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(distance_km(10.0, 20.0, 10.0, 380.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn normalize_longitude_wraps_values() {
        assert_abs_diff_eq!(normalize_longitude(190.0), -170.0);
        assert_abs_diff_eq!(normalize_longitude(-190.0), 170.0);
        assert_abs_diff_eq!(normalize_longitude(180.0), -180.0);
        assert_abs_diff_eq!(normalize_longitude(-180.0), -180.0);
        assert_abs_diff_eq!(normalize_longitude(0.0), 0.0);
        assert_abs_diff_eq!(normalize_longitude(540.0), -180.0);
        assert_abs_diff_eq!(normalize_longitude(-725.25), -5.25, epsilon = 1e-9);
    }

    #[test]
    fn normalize_longitude_stays_in_range() {
        let mut value = -2000.0;
        while value < 2000.0 {
            let normalized = normalize_longitude(value);
            assert!(
                (-180.0..180.0).contains(&normalized),
                "{value} -> {normalized}"
            );
            value += 7.3;
        }
    }

    #[test]
    fn normalize_longitude_is_idempotent() {
        for value in [370.0, -725.25, 179.5, -179.5, 45.0, 1e6] {
            let once = normalize_longitude(value);
            assert_abs_diff_eq!(normalize_longitude(once), once, epsilon = 1e-9);
        }
    }

    #[test]
    fn lcg_matches_reference_sequence() {
        let mut rng = Lcg::new(1);
        assert_relative_eq!(rng.next_f64(), 58598.0 / 233280.0);
        assert_relative_eq!(rng.next_f64(), 127215.0 / 233280.0);
    }

    #[test]
    fn lcg_large_seed_does_not_overflow() {
        let mut rng = Lcg::new(u64::MAX);
        let value = rng.next_f64();
        assert!((0.0..1.0).contains(&value));
    }

    #[test]
    fn shuffle_reference_orders() {
        assert_eq!(seeded_shuffle(&[1, 2, 3], 1), vec![3, 2, 1]);
        assert_eq!(seeded_shuffle(&[1, 2, 3, 4, 5], 7), vec![2, 4, 1, 5, 3]);
        assert_eq!(seeded_shuffle(&[1, 2, 3, 4, 5], 99), vec![4, 3, 5, 2, 1]);
        assert_eq!(
            seeded_shuffle(&[1, 2, 3, 4, 5], 123_456_789),
            vec![1, 4, 3, 5, 2]
        );
    }

    #[test]
    fn shuffle_is_deterministic_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let first = seeded_shuffle(&items, 2024);
        let second = seeded_shuffle(&items, 2024);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, items);
    }

    #[test]
    fn shuffle_empty_and_single() {
        assert!(seeded_shuffle::<u8>(&[], 5).is_empty());
        assert_eq!(seeded_shuffle(&["only"], 5), vec!["only"]);
    }

    #[test]
    fn random_seed_is_bounded() {
        for _ in 0..16 {
            assert!(random_seed() < MAX_SEED);
        }
    }
}
