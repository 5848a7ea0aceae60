//! Client configuration.

use std::time::Duration;

use serde::Serialize;

use crate::error::{KegError, KegResult};
use crate::types::Keg;

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default cooldown before the sync control re-arms.
pub const DEFAULT_SYNC_COOLDOWN: Duration = Duration::from_millis(2000);

/// Stations used when none are configured. The first is the default station.
pub const DEFAULT_STATIONS: [&str; 5] = ["At Brewery", "Conditioning Fridge", "Michael", "Troy", "Brent"];

/// Ordered list of stations a keg can sit at.
///
/// The first station doubles as the default: a keg with no location belongs
/// to it, and moving a keg there clears its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stations(Vec<String>);

impl Stations {
    /// Build a station list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, has a blank entry or repeats a
    /// name.
    pub fn new<I, S>(names: I) -> KegResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.into().trim().to_string()).collect();
        if names.is_empty() {
            return Err(KegError::Config("station list is empty".into()));
        }
        if names.iter().any(String::is_empty) {
            return Err(KegError::Config("station names cannot be blank".into()));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(KegError::Config(format!("duplicate station: {name}")));
            }
        }
        Ok(Self(names))
    }

    /// Station names in column order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// The default station.
    #[must_use]
    pub fn default_station(&self) -> &str {
        &self.0[0]
    }

    /// Number of stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a station list has at least one entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column a keg belongs in: its location, or the default station when
    /// unset.
    #[must_use]
    pub fn column_for<'a>(&'a self, keg: &'a Keg) -> &'a str {
        keg.location().unwrap_or_else(|| self.default_station())
    }

    /// Position of a station by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|s| s == name)
    }

    /// Location value to send when a keg is moved to `station`.
    ///
    /// The default station maps back to the empty (unset) location.
    #[must_use]
    pub fn target_location(&self, station: &str) -> String {
        if station == self.default_station() {
            String::new()
        } else {
            station.to_string()
        }
    }
}

impl Default for Stations {
    fn default() -> Self {
        Self(DEFAULT_STATIONS.iter().map(ToString::to_string).collect())
    }
}

/// Configuration for talking to a keg tracker server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address, without a trailing slash.
    pub base_url: String,
    /// Board columns.
    pub stations: Stations,
    /// Time the sync control stays disabled after a sync settles.
    pub sync_cooldown: Duration,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stations: Stations::default(),
            sync_cooldown: DEFAULT_SYNC_COOLDOWN,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given server.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not `http://` or `https://`.
    pub fn new(base_url: &str) -> KegResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Replace the station list.
    #[must_use]
    pub fn with_stations(mut self, stations: Stations) -> Self {
        self.stations = stations;
        self
    }

    /// Set the sync cooldown.
    #[must_use]
    pub const fn with_sync_cooldown(mut self, cooldown: Duration) -> Self {
        self.sync_cooldown = cooldown;
        self
    }

    /// Set a per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn normalize_base_url(url: &str) -> KegResult<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(KegError::Config(format!(
            "invalid server URL: {url}, must start with http:// or https://"
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}
