//! GPS extraction from image metadata

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use exif::{Context, Exif, In, Tag, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::round_to;
use crate::validation::{is_valid_latitude, is_valid_longitude};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Knobs for [`extract_gps`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExtractOptions {
    /// Use the image file's modification time when no capture time is embedded
    pub mtime_fallback: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            mtime_fallback: true,
        }
    }
}

/// Outcome of reading GPS data from an image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GpsExtractionResult {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub has_gps: bool,
    /// Both coordinates present and within range
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GpsExtractionResult {
    pub fn from_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        let verified = matches!(
            (latitude, longitude),
            (Some(lat), Some(lng)) if is_valid_latitude(lat) && is_valid_longitude(lng)
        );
        Self {
            latitude,
            longitude,
            has_gps: latitude.is_some() || longitude.is_some(),
            verified,
            source: Some("EXIF".to_string()),
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Convert degree/minute/second rationals to signed decimal degrees
///
/// Returns `None` when fewer than three components are given or any
/// denominator is zero. `S` and `W` references negate the result.
pub fn dms_to_decimal(components: &[(u32, u32)], reference: Option<&str>) -> Option<f64> {
    if components.len() < 3 || components[..3].iter().any(|(_, denom)| *denom == 0) {
        return None;
    }
    let part = |i: usize| components[i].0 as f64 / components[i].1 as f64;
    let mut decimal = part(0) + part(1) / 60.0 + part(2) / 3600.0;

    if matches!(reference.map(str::trim), Some("S") | Some("W")) {
        decimal = -decimal;
    }
    Some(round_to(decimal, 8))
}

/// Inverse of [`dms_to_decimal`], seconds at micro-second precision
pub fn decimal_to_dms(value: f64, is_latitude: bool) -> ([(u32, u32); 3], &'static str) {
    let reference = match (is_latitude, value < 0.0) {
        (true, false) => "N",
        (true, true) => "S",
        (false, false) => "E",
        (false, true) => "W",
    };

    let abs = value.abs();
    let degrees = abs.trunc();
    let minutes = ((abs - degrees) * 60.0).trunc();
    let seconds = ((abs - degrees) * 60.0 - minutes) * 60.0;

    (
        [
            (degrees as u32, 1),
            (minutes as u32, 1),
            ((seconds * 1_000_000.0).round() as u32, 1_000_000),
        ],
        reference,
    )
}

#[derive(Debug, Error)]
enum ExtractError {
    #[error("No EXIF data found")]
    NoExif,
    #[error("No GPS data in EXIF")]
    NoGps,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read GPS coordinates, altitude and capture time from an image
///
/// Never fails: problems are reported through `error`, with `has_gps` and
/// `verified` both false.
pub fn extract_gps(path: impl AsRef<Path>, options: &ExtractOptions) -> GpsExtractionResult {
    let path = path.as_ref();
    if !path.exists() {
        return GpsExtractionResult::failure("File not found");
    }

    match read_gps(path, options) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "GPS extraction failed");
            GpsExtractionResult::failure(e.to_string())
        }
    }
}

fn read_gps(path: &Path, options: &ExtractOptions) -> Result<GpsExtractionResult, ExtractError> {
    let file = File::open(path)?;
    let exif = match exif::Reader::new().read_from_container(&mut BufReader::new(file)) {
        Ok(exif) => exif,
        Err(exif::Error::Io(e)) => return Err(ExtractError::Io(e)),
        Err(_) => return Err(ExtractError::NoExif),
    };

    if !exif.fields().any(|field| field.tag.context() == Context::Gps) {
        return Err(ExtractError::NoGps);
    }

    let latitude = rationals(&exif, Tag::GPSLatitude)
        .and_then(|dms| dms_to_decimal(&dms, ascii(&exif, Tag::GPSLatitudeRef).as_deref()));
    let longitude = rationals(&exif, Tag::GPSLongitude)
        .and_then(|dms| dms_to_decimal(&dms, ascii(&exif, Tag::GPSLongitudeRef).as_deref()));

    let mut result = GpsExtractionResult::from_coordinates(latitude, longitude);
    // A GPS block counts even when it carries no usable coordinates
    result.has_gps = true;
    result.altitude = altitude(&exif);
    result.timestamp = capture_time(&exif).or_else(|| {
        if options.mtime_fallback {
            modified_time(path)
        } else {
            None
        }
    });
    Ok(result)
}

fn rationals(exif: &Exif, tag: Tag) -> Option<Vec<(u32, u32)>> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => Some(values.iter().map(|r| (r.num, r.denom)).collect()),
        _ => None,
    }
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

fn altitude(exif: &Exif) -> Option<f64> {
    let (num, denom) = *rationals(exif, Tag::GPSAltitude)?.first()?;
    if denom == 0 {
        return None;
    }
    let below_sea_level = matches!(
        exif.get_field(Tag::GPSAltitudeRef, In::PRIMARY).map(|f| &f.value),
        Some(Value::Byte(bytes)) if bytes.first() == Some(&1)
    );
    let meters = num as f64 / denom as f64;
    Some(if below_sea_level { -meters } else { meters })
}

fn capture_time(exif: &Exif) -> Option<String> {
    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
    let raw = match &field.value {
        Value::Ascii(values) => values.first()?,
        _ => return None,
    };
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    Some(format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
    ))
}

fn modified_time(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified).format(TIMESTAMP_FORMAT).to_string())
}
