//! Loading of the photo location table.

use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::PhotomapError;
use crate::geo::GeoPoint;

const USER_AGENT: &str = "photomap/0.1";

/// A photo with its location.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationRecord {
    /// Human readable name of the place.
    pub title: String,
    /// Url or path of the photo.
    pub image: String,
    /// Date the photo was taken, as written in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LocationRecord {
    /// Location of the photo.
    pub fn position(&self) -> GeoPoint {
        GeoPoint::latlon(self.lat, self.lon)
    }
}

/// Raw row of the source table. Coordinates are kept as text until validated.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    latitude: String,
    #[serde(default)]
    longitude: String,
}

impl RawRow {
    fn into_record(self) -> Option<LocationRecord> {
        let lat = parse_coordinate(&self.latitude)?;
        let lon = parse_coordinate(&self.longitude)?;

        Some(LocationRecord {
            title: self.title,
            image: self.image,
            date: self.date.filter(|date| !date.is_empty()),
            lat,
            lon,
        })
    }
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the location table.
///
/// The first row must contain column names. Rows with missing or non-numeric coordinates are
/// skipped, as are rows that can't be read at all.
pub fn parse_locations(text: &str) -> Vec<LocationRecord> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            debug!("Location table has no readable header: {err}");
            return vec![];
        }
    };

    let mut locations = vec![];
    for (line, row) in reader.records().enumerate() {
        let Some(location) = row_to_record(&headers, row) else {
            debug!("Skipping location row {}", line + 2);
            continue;
        };

        locations.push(location);
    }

    locations
}

fn row_to_record(
    headers: &StringRecord,
    row: Result<StringRecord, csv::Error>,
) -> Option<LocationRecord> {
    let row = row.ok()?;
    if row.iter().all(str::is_empty) {
        return None;
    }

    row.deserialize::<RawRow>(Some(headers))
        .ok()?
        .into_record()
}

/// Where the location table is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Local file.
    File(PathBuf),
    /// Remote resource loaded over HTTP.
    Url(String),
}

impl DatasetSource {
    /// Interprets the string as a url if it has an http(s) scheme, and as a file path otherwise.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Url(source.to_owned())
        } else {
            Self::File(source.into())
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Reads the location table from a [`DatasetSource`].
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    http_client: reqwest::Client,
}

impl DatasetLoader {
    /// Creates a new loader.
    pub fn new() -> Result<Self, PhotomapError> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http_client })
    }

    /// Loads and parses the table.
    pub async fn load(&self, source: &DatasetSource) -> Result<Vec<LocationRecord>, PhotomapError> {
        let text = match source {
            DatasetSource::File(path) => tokio::fs::read_to_string(path).await?,
            DatasetSource::Url(url) => self.load_from_web(url).await?,
        };

        let locations = parse_locations(&text);
        info!("Loaded {} locations from {source}", locations.len());

        Ok(locations)
    }

    async fn load_from_web(&self, url: &str) -> Result<String, PhotomapError> {
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PhotomapError::IO(format!(
                "{url} responded with {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}
