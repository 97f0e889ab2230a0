//! Parser for shared map links
//!
//! Map-sharing URLs come in several shapes depending on where they were copied
//! from: a pin view (`/@lat,lng,zoom`), a list-style query (`?ll=lat,lng`) or an
//! embedded place-data segment (`!3dlat!4dlng`). This crate pulls coordinates and
//! a place title out of any of them without the caller knowing which one it has.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static AT_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").unwrap());
static LL_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]ll=(-?\d+\.\d+),(-?\d+\.\d+)").unwrap());
static DATA_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").unwrap());
static PLACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/place/([^/?]+)").unwrap());

/// Which URL shape the coordinates were taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    /// `/@51.92,4.47,17z`
    AtSegment,
    /// `?ll=51.92,4.47`
    LlParam,
    /// `!3d51.92!4d4.47`
    DataSegment,
}

impl CoordinateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtSegment => "at-segment",
            Self::LlParam => "ll-param",
            Self::DataSegment => "data-segment",
        }
    }
}

/// Latitude/longitude pair, kept as the decimal strings found in the URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lng: String,
}

impl Coordinates {
    /// Numeric form of the pair, `None` when either value is out of range
    pub fn as_f64(&self) -> Option<(f64, f64)> {
        let lat: f64 = self.lat.parse().ok()?;
        let lng: f64 = self.lng.parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some((lat, lng))
    }
}

/// Location data extracted from a map link
///
/// `lat` and `lng` are always both present or both absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    lat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lng: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl ResolvedLocation {
    pub fn new(coordinates: Option<Coordinates>, title: Option<String>) -> Self {
        let (lat, lng) = match coordinates {
            Some(c) => (Some(c.lat), Some(c.lng)),
            None => (None, None),
        };
        Self { lat, lng, title }
    }

    pub fn lat(&self) -> Option<&str> {
        self.lat.as_deref()
    }

    pub fn lng(&self) -> Option<&str> {
        self.lng.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (&self.lat, &self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates {
                lat: lat.clone(),
                lng: lng.clone(),
            }),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_none() && self.title.is_none()
    }
}

/// Parse a (final, expanded) map URL into coordinates and a place title
pub fn parse_map_url(url: &str) -> ResolvedLocation {
    let coordinates = match_coordinates(url).map(|(coords, _)| coords);
    ResolvedLocation::new(coordinates, extract_place_title(url))
}

/// Find the first coordinate pair, trying `@`, then `ll=`, then `!3d!4d`
pub fn match_coordinates(url: &str) -> Option<(Coordinates, CoordinateSource)> {
    [
        (&*AT_SEGMENT_RE, CoordinateSource::AtSegment),
        (&*LL_PARAM_RE, CoordinateSource::LlParam),
        (&*DATA_SEGMENT_RE, CoordinateSource::DataSegment),
    ]
    .into_iter()
    .find_map(|(re, source)| {
        let caps = re.captures(url)?;
        let coords = Coordinates {
            lat: caps[1].to_string(),
            lng: caps[2].to_string(),
        };
        Some((coords, source))
    })
}

/// Extract the `/place/<name>` segment as a readable title
///
/// `+` becomes a space before percent-decoding. If the segment holds a
/// malformed escape or the decoded bytes are not valid UTF-8, the raw segment
/// is returned unchanged.
pub fn extract_place_title(url: &str) -> Option<String> {
    let caps = PLACE_RE.captures(url)?;
    let raw = &caps[1];
    if has_malformed_escape(raw) {
        return Some(raw.to_string());
    }
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(raw.to_string()),
    }
}

/// A `%` not followed by two hex digits
fn has_malformed_escape(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !matches!(
                (bytes.get(i + 1), bytes.get(i + 2)),
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
    })
}
