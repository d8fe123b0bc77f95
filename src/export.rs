//! JSON export files written by the intake, parts and checkout forms

use chrono::{NaiveDate, Utc};
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// `{prefix}-{plate}-{YYYY-MM-DD}.json`, with `unknown` for a blank plate
pub fn file_name(prefix: &str, plate: &str, date: NaiveDate) -> String {
    let plate = plate.trim();
    let plate = if plate.is_empty() {
        "unknown".to_string()
    } else {
        plate.replace(['/', '\\'], "-")
    };
    format!("{}-{}-{}.json", prefix, plate, date.format("%Y-%m-%d"))
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Pretty-printed JSON with two-space indentation
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write an export into `dir` and return the full path
pub fn write_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, to_pretty_json(value)?)?;
    info!("Exported {}", path.display());
    Ok(path)
}

/// Read an export or draft back
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_name_falls_back_to_unknown() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            file_name("car-checkin", "AB 123", date),
            "car-checkin-AB 123-2024-03-09.json"
        );
        assert_eq!(
            file_name("checkout", "  ", date),
            "checkout-unknown-2024-03-09.json"
        );
        assert_eq!(
            file_name("parts-service", "X/1", date),
            "parts-service-X-1-2024-03-09.json"
        );
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let value = json!({ "a": [1, 2], "b": { "c": null } });
        let path = write_json(dir.path(), "x.json", &value).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"a\""));
        let back: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(back, value);
    }
}
