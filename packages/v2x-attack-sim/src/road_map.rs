//! road_map.rs — Static road network
//!
//! JSON layout: `{"roads": [{"road": {"id", "start", "end", "junction"}}]}`.
//! Every listed road approaches the junction given for it; vehicles drive
//! from `start` to `end`.

use std::path::Path;

use serde::Deserialize;
use v2x_types::Coord;

use crate::error::{Result, SimError};

/// Map compiled into the binary, used when the config names no map file
pub const BUNDLED_MAP: &str = include_str!("../map.json");

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl From<MapPoint> for Coord {
    fn from(p: MapPoint) -> Self {
        Coord::planar(p.x, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Road {
    pub id: String,
    pub start: MapPoint,
    pub end: MapPoint,
    pub junction: MapPoint,
}

impl Road {
    pub fn start(&self) -> Coord { self.start.into() }
    pub fn end(&self) -> Coord { self.end.into() }
    pub fn junction(&self) -> Coord { self.junction.into() }

    pub fn length(&self) -> f64 {
        self.end().dist(&self.start())
    }

    /// Direction of travel, radians
    pub fn heading(&self) -> f64 {
        let d = self.end().sub(&self.start());
        d.y.atan2(d.x)
    }
}

#[derive(Debug, Deserialize)]
struct RoadEntry {
    road: Road,
}

#[derive(Debug, Deserialize)]
struct MapFile {
    roads: Vec<RoadEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct RoadMap {
    roads: Vec<Road>,
}

impl RoadMap {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: MapFile = serde_json::from_str(s)?;
        let roads: Vec<Road> = file.roads.into_iter().map(|e| e.road).collect();
        if let Some(r) = roads.iter().find(|r| !(r.length() > 0.0)) {
            return Err(SimError::InvalidConfig(format!("road {} has zero length", r.id)));
        }
        Ok(Self { roads })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| SimError::MapRead { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_MAP)
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Junction approached by `road_id`, `None` if the road is not mapped.
    pub fn junction_for(&self, road_id: &str) -> Option<Coord> {
        self.roads.iter().find(|r| r.id == road_id).map(Road::junction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "roads": [
            {"road": {"id": "north_in", "start": {"x": 500, "y": 0}, "end": {"x": 500, "y": 480},
                      "junction": {"x": 500, "y": 500}}},
            {"road": {"id": "east_in", "start": {"x": 0, "y": 500}, "end": {"x": 480, "y": 500},
                      "junction": {"x": 500, "y": 500}}}
        ]
    }"#;

    #[test]
    fn parses_roads_and_junctions() {
        let map = RoadMap::from_json_str(MAP).unwrap();
        assert_eq!(map.roads().len(), 2);
        assert_eq!(map.junction_for("east_in"), Some(Coord::planar(500.0, 500.0)));
        assert_eq!(map.junction_for("nowhere"), None);
    }

    #[test]
    fn road_heading_follows_travel_direction() {
        let map = RoadMap::from_json_str(MAP).unwrap();
        assert!((map.roads()[0].heading() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(map.roads()[1].heading(), 0.0);
    }

    #[test]
    fn malformed_map_is_an_error() {
        assert!(matches!(RoadMap::from_json_str("{\"roads\": 3}"), Err(SimError::MapParse(_))));
    }

    #[test]
    fn missing_map_file_is_an_error() {
        assert!(matches!(RoadMap::load("/nonexistent/map.json"), Err(SimError::MapRead { .. })));
    }

    #[test]
    fn bundled_map_is_valid() {
        assert!(!RoadMap::bundled().unwrap().is_empty());
    }
}
