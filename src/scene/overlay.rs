//! Country boundary overlays.
//!
//! The boundary dataset is a GeoJSON FeatureCollection. Only the polygon
//! geometry and the `name` property are used. Any failure leaves the overlay
//! set empty.

use geojson::{GeoJson, Value};

use crate::config::OverlayConfig;
use crate::data::parse_geojson;
use crate::error::AssetError;

/// A geographic ring of (lon, lat) pairs
pub type Ring = Vec<(f64, f64)>;

/// One outlined region with its hover label
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryOverlay {
    pub name: String,
    /// Polygons as rings, exterior first then holes
    pub polygons: Vec<Vec<Ring>>,
}

impl BoundaryOverlay {
    /// Even-odd test against every polygon (holes excluded)
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons
            .iter()
            .any(|rings| rings.iter().filter(|ring| ring_contains(ring, lon, lat)).count() % 2 == 1)
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.polygons.iter().flatten()
    }
}

/// Stroke-only, non-interactive outline style
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub cap_color: Option<String>,
    pub side_color: Option<String>,
    pub stroke_color: String,
    /// Globe radii above the surface
    pub altitude: f64,
    pub interactive: bool,
}

impl OverlayStyle {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            cap_color: None,
            side_color: None,
            stroke_color: config.stroke_color.clone(),
            altitude: config.altitude,
            interactive: false,
        }
    }
}

/// Decode a boundary FeatureCollection
pub fn parse_boundaries(bytes: &mut [u8]) -> Result<Vec<BoundaryOverlay>, AssetError> {
    let GeoJson::FeatureCollection(fc) = parse_geojson(bytes)? else {
        return Err(AssetError::NotFeatureCollection);
    };

    let overlays = fc
        .features
        .into_iter()
        .filter_map(|feature| {
            let name = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let polygons = match feature.geometry?.value {
                Value::Polygon(rings) => vec![convert_rings(&rings)],
                Value::MultiPolygon(polygons) => polygons.iter().map(|rings| convert_rings(rings)).collect(),
                _ => return None,
            };
            Some(BoundaryOverlay { name, polygons })
        })
        .collect();
    Ok(overlays)
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| ring.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect())
        .collect()
}

/// Ray-casting point in ring test in lon/lat space
fn ring_contains(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTRIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Squareland"},
                "geometry": {"type": "Polygon", "coordinates": [
                    [[0,0],[10,0],[10,10],[0,10],[0,0]],
                    [[4,4],[6,4],[6,6],[4,6],[4,4]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Islands"},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[20,20],[22,20],[22,22],[20,20]]],
                    [[[30,30],[32,30],[32,32],[30,30]]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Polygon", "coordinates": [[[50,50],[51,50],[51,51],[50,50]]]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Capital"},
                "geometry": {"type": "Point", "coordinates": [1, 1]}
            }
        ]
    }"#;

    fn parse(text: &str) -> Result<Vec<BoundaryOverlay>, AssetError> {
        let mut bytes = text.as_bytes().to_vec();
        parse_boundaries(&mut bytes)
    }

    #[test]
    fn test_parses_polygons_and_names() {
        let overlays = parse(COUNTRIES).unwrap();
        assert_eq!(overlays.len(), 3);
        assert_eq!(overlays[0].name, "Squareland");
        assert_eq!(overlays[0].polygons[0].len(), 2);
        assert_eq!(overlays[1].polygons.len(), 2);
        assert_eq!(overlays[2].name, "");
    }

    #[test]
    fn test_contains_respects_holes() {
        let overlays = parse(COUNTRIES).unwrap();
        assert!(overlays[0].contains(2.0, 2.0));
        assert!(!overlays[0].contains(5.0, 5.0));
        assert!(!overlays[0].contains(15.0, 5.0));
        assert!(overlays[1].contains(31.5, 30.5));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(parse("{not json"), Err(AssetError::Json(_))));
    }

    #[test]
    fn test_geometry_is_not_collection() {
        let err = parse(r#"{"type":"Point","coordinates":[1,2]}"#).unwrap_err();
        assert!(matches!(err, AssetError::NotFeatureCollection));
    }

    #[test]
    fn test_style_is_stroke_only() {
        let style = OverlayStyle::new(&OverlayConfig::default());
        assert!(style.cap_color.is_none());
        assert!(style.side_color.is_none());
        assert!(!style.interactive);
        assert_eq!(style.altitude, 0.0015);
    }
}
