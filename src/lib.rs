//! Terminal globe that keeps a list of places, the current selection, an
//! animated camera and an orbiting body in sync.

pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod hash;
pub mod map;
pub mod places;
pub mod scene;
