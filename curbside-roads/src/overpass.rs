//! Overpass QL query building and response normalisation

use std::collections::HashMap;
use std::fmt::Write;

use curbside_core::{BoundingBox, LatLng, Polyline, RoadFeature};
use serde::Deserialize;
use tracing::debug;

use crate::error::AttemptError;

/// Query for all ways of the given highway classes inside `bbox`, with inline
/// geometry
pub fn build_query(bbox: &BoundingBox, highway_classes: &[String], timeout_s: u64) -> String {
    let mut query = format!("[out:json][timeout:{}];", timeout_s.max(1));
    let _ = write!(
        query,
        "way[\"highway\"~\"^({})$\"]({},{},{},{});out geom;",
        highway_classes.join("|"),
        bbox.south,
        bbox.west,
        bbox.north,
        bbox.east
    );
    query
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    #[serde(default)]
    tags: HashMap<String, String>,
    /// Nodes outside the query box come back as `null`
    #[serde(default)]
    geometry: Vec<Option<NodePosition>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct NodePosition {
    lat: f64,
    lon: f64,
}

/// Turns an Overpass JSON body into road features.
///
/// Ways are split where their geometry has gaps. Pieces with fewer than two
/// points are dropped.
pub fn parse_response(body: &str) -> Result<Vec<RoadFeature>, AttemptError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| AttemptError::Parse(e.to_string()))?;

    if response.elements.is_empty()
        && let Some(remark) = response.remark
        && remark.contains("error")
    {
        return Err(AttemptError::Remote(remark));
    }

    let mut roads = Vec::new();
    let mut dropped = 0;
    for element in response.elements.into_iter().filter(|e| e.kind == "way") {
        let pieces: Vec<Polyline> = element
            .geometry
            .split(Option::is_none)
            .map(|run| {
                run.iter()
                    .flatten()
                    .map(|node| LatLng::new(node.lat, node.lon))
                    .collect::<Polyline>()
            })
            .filter(|line| {
                let keep = line.len() >= 2;
                dropped += usize::from(!keep && !line.is_empty());
                keep
            })
            .collect();

        let name = element.tags.get("name").cloned();
        let split = pieces.len() > 1;
        for (idx, geometry) in pieces.into_iter().enumerate() {
            let id = if split {
                format!("way/{}-{}", element.id, idx + 1)
            } else {
                format!("way/{}", element.id)
            };
            let mut road = RoadFeature::new(id, geometry);
            road.name.clone_from(&name);
            roads.push(road);
        }
    }

    debug!(roads = roads.len(), dropped, "Parsed Overpass response");
    Ok(roads)
}
