//! Derives the visual point set from the place list.
//!
//! Pure: `(places, current, selected) -> (points, rings)`. Points keep the input
//! order; rings are all points or only the current one depending on
//! [`RingPolicy`].

use serde::Deserialize;

use crate::config::{PointConfig, RingConfig};
use crate::places::Place;

/// A place annotated with its render state
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPoint {
    pub id: String,
    pub title: String,
    pub date: String,
    pub lat: f64,
    pub lng: f64,
    /// Hover text, `title — date`
    pub label: String,
    pub is_current: bool,
    pub is_selected: bool,
}

/// Which points get a pulsing ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RingPolicy {
    #[default]
    All,
    CurrentOnly,
}

/// Point size, height and color. Radius is in degrees of arc, altitude in
/// globe radii above the surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisualAttributes {
    pub radius: f64,
    pub altitude: f64,
    pub color: String,
}

impl VisualAttributes {
    pub fn new(radius: f64, altitude: f64, color: &str) -> Self {
        Self {
            radius,
            altitude,
            color: color.to_string(),
        }
    }
}

/// Visual state of a point, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    Selected,
    Current,
    Default,
}

impl PointState {
    /// Evaluation order of the priority table
    pub const PRIORITY: [PointState; 3] = [PointState::Selected, PointState::Current, PointState::Default];

    fn applies_to(self, point: &DerivedPoint) -> bool {
        match self {
            PointState::Selected => point.is_selected,
            PointState::Current => point.is_current,
            PointState::Default => true,
        }
    }

    pub fn of(point: &DerivedPoint) -> Self {
        Self::PRIORITY
            .into_iter()
            .find(|state| state.applies_to(point))
            .unwrap_or(PointState::Default)
    }
}

/// Ordered lookup table, selected > current > default. States never stack.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTable {
    selected: VisualAttributes,
    current: VisualAttributes,
    default: VisualAttributes,
}

impl VisualTable {
    pub fn new(config: &PointConfig) -> Self {
        Self {
            selected: config.selected.clone(),
            current: config.current.clone(),
            default: config.default.clone(),
        }
    }

    pub fn get(&self, state: PointState) -> &VisualAttributes {
        match state {
            PointState::Selected => &self.selected,
            PointState::Current => &self.current,
            PointState::Default => &self.default,
        }
    }

    pub fn attributes(&self, point: &DerivedPoint) -> &VisualAttributes {
        self.get(PointState::of(point))
    }
}

/// Ring timing shared by every ring
#[derive(Debug, Clone, PartialEq)]
pub struct RingStyle {
    /// Degrees of arc
    pub max_radius: f64,
    /// Degrees per second
    pub propagation_speed: f64,
    pub repeat_period_ms: u64,
    pub colors: VisualTable,
}

impl RingStyle {
    pub fn new(config: &RingConfig, colors: VisualTable) -> Self {
        Self {
            max_radius: config.max_radius,
            propagation_speed: config.propagation_speed,
            repeat_period_ms: config.repeat_period_ms,
            colors,
        }
    }

    pub fn color<'a>(&'a self, point: &DerivedPoint) -> &'a str {
        &self.colors.attributes(point).color
    }
}

/// Annotate places with current/selected flags.
///
/// An id that matches no place simply marks nothing.
pub fn derive_points(places: &[Place], current_id: Option<&str>, selected_id: Option<&str>) -> Vec<DerivedPoint> {
    places
        .iter()
        .map(|place| DerivedPoint {
            id: place.id.clone(),
            title: place.title.clone(),
            date: place.date.clone(),
            lat: place.lat,
            lng: place.lng,
            label: format!("{} — {}", place.title, place.date),
            is_current: current_id == Some(place.id.as_str()),
            is_selected: selected_id == Some(place.id.as_str()),
        })
        .collect()
}

pub fn derive_rings(points: &[DerivedPoint], policy: RingPolicy) -> Vec<DerivedPoint> {
    match policy {
        RingPolicy::All => points.to_vec(),
        RingPolicy::CurrentOnly => points.iter().filter(|p| p.is_current).cloned().collect(),
    }
}

/// The derived point and ring sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedSet {
    pub points: Vec<DerivedPoint>,
    pub rings: Vec<DerivedPoint>,
}

/// Keeps the last derived set so unchanged inputs do not touch the renderer
pub struct PointSynchronizer {
    policy: RingPolicy,
    current: DerivedSet,
    revision: u64,
}

impl PointSynchronizer {
    pub fn new(policy: RingPolicy) -> Self {
        Self {
            policy,
            current: DerivedSet::default(),
            revision: 0,
        }
    }

    /// Recompute the derived set. Returns `true` when it differs from the
    /// previous one.
    pub fn update(&mut self, places: &[Place], current_id: Option<&str>, selected_id: Option<&str>) -> bool {
        let points = derive_points(places, current_id, selected_id);
        if points == self.current.points && self.revision > 0 {
            return false;
        }
        let rings = derive_rings(&points, self.policy);
        self.current = DerivedSet { points, rings };
        self.revision += 1;
        true
    }

    pub fn derived(&self) -> &DerivedSet {
        &self.current
    }

    /// Bumped on every change of the derived set
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
