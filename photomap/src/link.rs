//! Outbound links.

use log::warn;
use reqwest::Url;

const IMAGE_SEARCH_URL: &str = "https://www.google.com/search";

/// Url of an image search for the given place name.
pub fn image_search_url(title: &str) -> String {
    match Url::parse_with_params(IMAGE_SEARCH_URL, [("tbm", "isch"), ("q", title)]) {
        Ok(url) => url.to_string(),
        Err(err) => {
            warn!("Failed to build image search url for {title:?}: {err}");
            IMAGE_SEARCH_URL.to_owned()
        }
    }
}
