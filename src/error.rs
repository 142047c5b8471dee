use std::path::PathBuf;

use thiserror::Error;

/// Failure while fetching or decoding an asset.
///
/// None of these abort the scene: the caller logs them and keeps the
/// lower-fidelity state it already has.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("asset {0} is empty")]
    Empty(String),
    #[error("malformed JSON: {0}")]
    Json(#[from] simd_json::Error),
    #[error("malformed GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("expected a FeatureCollection")]
    NotFeatureCollection,
}

/// Failure while loading the scene configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
