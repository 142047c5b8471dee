use std::time::Duration;

use tracing::debug;

use crate::config::CameraConfig;
use crate::places::Place;
use crate::scene::renderer::{CameraKey, CameraTarget};

/// Decides where the camera should look and suppresses repeated motions.
///
/// A selected place wins over the current one. A key that was the last one
/// applied never fires again until another key has fired in between.
#[derive(Debug)]
pub struct CameraDirector {
    default_altitude: f64,
    selected_altitude: f64,
    duration: Duration,
    last_key: Option<CameraKey>,
}

impl CameraDirector {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            default_altitude: config.default_altitude,
            selected_altitude: config.selected_altitude,
            duration: Duration::from_millis(config.transition_ms),
            last_key: None,
        }
    }

    /// Next camera motion, or `None` if there is nothing new to do
    pub fn decide(&mut self, selected: Option<&Place>, current: Option<&Place>, ready: bool) -> Option<CameraTarget> {
        if !ready {
            return None;
        }
        let target = if let Some(place) = selected {
            CameraTarget {
                lat: place.lat,
                lng: place.lng,
                altitude: self.selected_altitude,
                key: CameraKey::Selected(place.id.clone()),
            }
        } else if let Some(place) = current {
            CameraTarget {
                lat: place.lat,
                lng: place.lng,
                altitude: self.default_altitude,
                key: CameraKey::Current(place.id.clone()),
            }
        } else {
            return None;
        };

        if self.last_key.as_ref() == Some(&target.key) {
            return None;
        }
        debug!(key = %target.key, "new camera target");
        self.last_key = Some(target.key.clone());
        Some(target)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn last_key(&self) -> Option<&CameraKey> {
        self.last_key.as_ref()
    }

    /// Forget the last applied key so a fresh scene gets framed again
    pub fn reset(&mut self) {
        self.last_key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str) -> Place {
        Place::new(id, id, "2020-01-01", 10.0, 20.0)
    }

    fn director() -> CameraDirector {
        CameraDirector::new(&CameraConfig::default())
    }

    #[test]
    fn test_repeated_keys_fire_once() {
        let mut director = director();
        let (a, b) = (place("a"), place("b"));
        let sequence = [&a, &a, &b, &b, &a];
        let fired: Vec<_> = sequence
            .iter()
            .filter_map(|p| director.decide(Some(p), None, true))
            .map(|t| t.key.to_string())
            .collect();
        assert_eq!(fired, vec!["selected:a", "selected:b", "selected:a"]);
    }

    #[test]
    fn test_selection_beats_current() {
        let mut director = director();
        let target = director.decide(Some(&place("s")), Some(&place("c")), true).unwrap();
        assert_eq!(target.key, CameraKey::Selected("s".into()));
        assert_eq!(target.altitude, 0.6);
    }

    #[test]
    fn test_current_uses_far_altitude() {
        let mut director = director();
        let target = director.decide(None, Some(&place("c")), true).unwrap();
        assert_eq!(target.key.to_string(), "current:c");
        assert_eq!(target.altitude, 1.5);
        assert_eq!((target.lat, target.lng), (10.0, 20.0));
    }

    #[test]
    fn test_nothing_to_target() {
        let mut director = director();
        assert!(director.decide(None, None, true).is_none());
        assert!(director.last_key().is_none());
    }

    #[test]
    fn test_not_ready_defers_without_consuming_key() {
        let mut director = director();
        let c = place("c");
        assert!(director.decide(None, Some(&c), false).is_none());
        assert!(director.decide(None, Some(&c), true).is_some());
    }

    #[test]
    fn test_clearing_selection_returns_to_current() {
        let mut director = director();
        let (s, c) = (place("s"), place("c"));
        director.decide(None, Some(&c), true).unwrap();
        director.decide(Some(&s), Some(&c), true).unwrap();
        let back = director.decide(None, Some(&c), true).unwrap();
        assert_eq!(back.key.to_string(), "current:c");
    }

    #[test]
    fn test_same_id_selected_and_current_are_distinct_keys() {
        let mut director = director();
        let c = place("c");
        assert!(director.decide(None, Some(&c), true).is_some());
        assert!(director.decide(Some(&c), Some(&c), true).is_some());
    }

    #[test]
    fn test_reset_allows_refire() {
        let mut director = director();
        let c = place("c");
        director.decide(None, Some(&c), true);
        director.reset();
        assert!(director.decide(None, Some(&c), true).is_some());
        assert_eq!(director.duration(), Duration::from_millis(1100));
    }
}
