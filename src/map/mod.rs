mod camera;
mod geometry;
mod globe;
mod renderer;

pub use camera::{CameraPose, CameraRig};
pub use globe::GlobeViewport;
pub use renderer::{parse_color, GlobeLayers, Layer, LineString, TerminalGlobe, TextLabel, GLOBE_RADIUS};
