//! The place list fed to the globe.
//!
//! Places are owned by the application: this module loads them, orders them
//! newest first and names the current (most recent) one. The scene engine
//! takes the result as-is.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// A point of interest on the globe
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub id: String,
    pub title: String,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub fn new(id: &str, title: &str, date: &str, lat: f64, lng: f64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            lat,
            lng,
        }
    }
}

/// Load places from a JSON array file
pub fn load_places(path: &Path) -> Result<Vec<Place>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read places from {}", path.display()))?;
    let places: Vec<Place> = serde_json::from_str(&content)
        .with_context(|| format!("malformed places file {}", path.display()))?;
    Ok(places)
}

/// Sort newest first. ISO dates compare correctly as strings.
pub fn sort_by_date_desc(places: &mut [Place]) {
    places.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The most recent place of a list already sorted newest first
pub fn current_place(places: &[Place]) -> Option<&Place> {
    places.first()
}

pub fn find<'a>(places: &'a [Place], id: &str) -> Option<&'a Place> {
    places.iter().find(|p| p.id == id)
}

/// Built-in route used when no places file is given
pub fn sample_places() -> Vec<Place> {
    vec![
        Place::new("kostroma-1995-12-25", "Kostroma", "1995-12-25", 57.767918, 40.926894),
        Place::new("norilsk-1996-03-01", "Norilsk", "1996-03-01", 69.343985, 88.210393),
        Place::new("krasnoyarsk-2002-06-01", "Krasnoyarsk", "2002-06-01", 56.05873, 92.927707),
        Place::new("chekhov-2011-07-01", "Chekhov", "2011-07-01", 55.149048, 37.458867),
        Place::new("kotelniki-2023-08-01", "Kotelniki", "2023-08-01", 55.672895, 37.857602),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sort_puts_newest_first() {
        let mut places = sample_places();
        sort_by_date_desc(&mut places);
        assert_eq!(places[0].id, "kotelniki-2023-08-01");
        assert_eq!(places[4].id, "kostroma-1995-12-25");
        assert_eq!(current_place(&places).map(|p| p.id.as_str()), Some("kotelniki-2023-08-01"));
    }

    #[test]
    fn test_current_of_empty_list() {
        assert!(current_place(&[]).is_none());
    }

    #[test]
    fn test_load_places_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"a","title":"A","date":"2020-01-01","lat":1.0,"lng":2.0}}]"#
        )
        .unwrap();
        let places = load_places(file.path()).unwrap();
        assert_eq!(places, vec![Place::new("a", "A", "2020-01-01", 1.0, 2.0)]);
    }

    #[test]
    fn test_load_places_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_places(file.path()).is_err());
    }
}
