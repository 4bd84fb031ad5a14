//! Scene composition
//!
//! A sector ties the physics engine together with the other spatial
//! indices a playable area needs.

pub mod sector;

pub use sector::{SectorError, WorldSector};
