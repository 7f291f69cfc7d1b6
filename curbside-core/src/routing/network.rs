//! Planar graph over a set of guides.
//!
//! Nodes are the two route ends plus every place where guides meet: proper
//! crossings, collinear overlaps and guide ends lying within tolerance of
//! another guide. Edges run between consecutive nodes along each guide.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line};
use log::trace;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

use super::GuideSnap;
use crate::Millimeters;
use crate::geometry::LocalFrame;
use crate::geometry::planar::{EPSILON_M, dedup, dist, nearest_on, slice_between, stations};
use crate::model::{GuideId, GuideLine, LatLng, Polyline};

/// Junctions of one guide pair closer than this are merged
const MERGE_DISTANCE_M: f64 = 1e-3;

/// Stretch of a single guide between two adjacent nodes
#[derive(Debug, Clone, Copy)]
pub(super) struct Span {
    pub(super) track: usize,
    /// Station at the edge source
    pub(super) low: f64,
    /// Station at the edge target
    pub(super) high: f64,
    pub(super) weight: Millimeters,
}

pub(super) type RouteGraph = UnGraph<Coord<f64>, Span>;

#[derive(Debug)]
struct Track {
    guide: GuideId,
    coords: Vec<Coord<f64>>,
    stations: Vec<f64>,
    min: Coord<f64>,
    max: Coord<f64>,
    stops: Vec<(f64, NodeIndex)>,
}

impl Track {
    fn new(guide: &GuideLine, frame: &LocalFrame) -> Option<Self> {
        let coords = dedup(&frame.project_line(guide.geometry.points()));
        if coords.len() < 2 {
            return None;
        }
        let stations = stations(&coords);
        let (min, max) = coords.iter().fold(
            (coords[0], coords[0]),
            |(min, max), c| {
                (
                    Coord {
                        x: min.x.min(c.x),
                        y: min.y.min(c.y),
                    },
                    Coord {
                        x: max.x.max(c.x),
                        y: max.y.max(c.y),
                    },
                )
            },
        );
        Some(Self {
            guide: guide.id,
            coords,
            stations,
            min,
            max,
            stops: Vec::new(),
        })
    }

    fn length(&self) -> f64 {
        self.stations.last().copied().unwrap_or_default()
    }

    fn near(&self, other: &Self, margin: f64) -> bool {
        self.min.x - margin <= other.max.x
            && other.min.x - margin <= self.max.x
            && self.min.y - margin <= other.max.y
            && other.min.y - margin <= self.max.y
    }

    fn lines(&self) -> impl Iterator<Item = (usize, Line<f64>)> + '_ {
        self.coords
            .windows(2)
            .enumerate()
            .map(|(idx, w)| (idx, Line::new(w[0], w[1])))
    }

    fn station_on(&self, segment: usize, point: Coord<f64>) -> f64 {
        self.stations[segment] + dist(self.coords[segment], point)
    }

    fn station_of(&self, point: Coord<f64>) -> Option<f64> {
        nearest_on(&self.coords, &self.stations, point).map(|hit| hit.along)
    }
}

#[derive(Debug)]
pub(super) struct GuideNetwork {
    frame: LocalFrame,
    tracks: Vec<Track>,
    graph: RouteGraph,
    start: NodeIndex,
    end: NodeIndex,
}

impl GuideNetwork {
    /// Builds the graph in a metre frame centred on the start point.
    ///
    /// Returns `None` if either end refers to a guide that is missing or
    /// degenerate.
    pub(super) fn build(
        guides: &[GuideLine],
        start: &GuideSnap,
        end: &GuideSnap,
        tolerance_m: f64,
    ) -> Option<Self> {
        let frame = LocalFrame::new(start.point);
        let mut tracks: Vec<Track> = guides
            .iter()
            .filter_map(|guide| Track::new(guide, &frame))
            .collect();
        let mut graph = RouteGraph::default();

        let start = Self::add_end(&mut tracks, &mut graph, &frame, start)?;
        let end = Self::add_end(&mut tracks, &mut graph, &frame, end)?;
        Self::add_crossings(&mut tracks, &mut graph);
        Self::add_touches(&mut tracks, &mut graph, tolerance_m);

        let mut network = Self {
            frame,
            tracks,
            graph,
            start,
            end,
        };
        network.link_stops();
        trace!(
            "Guide network: {} nodes, {} edges",
            network.graph.node_count(),
            network.graph.edge_count()
        );
        Some(network)
    }

    pub(super) fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    pub(super) fn start(&self) -> NodeIndex {
        self.start
    }

    pub(super) fn end(&self) -> NodeIndex {
        self.end
    }

    fn add_end(
        tracks: &mut [Track],
        graph: &mut RouteGraph,
        frame: &LocalFrame,
        snap: &GuideSnap,
    ) -> Option<NodeIndex> {
        let track = tracks.iter_mut().find(|t| t.guide == snap.guide)?;
        let point = frame.to_local(snap.point);
        let station = track.station_of(point)?;
        let node = graph.add_node(point);
        track.stops.push((station, node));
        Some(node)
    }

    fn add_crossings(tracks: &mut [Track], graph: &mut RouteGraph) {
        for i in 0..tracks.len() {
            for j in (i + 1)..tracks.len() {
                if !tracks[i].near(&tracks[j], EPSILON_M) {
                    continue;
                }
                let mut found: Vec<(Coord<f64>, f64, f64)> = Vec::new();
                for (si, a) in tracks[i].lines() {
                    for (sj, b) in tracks[j].lines() {
                        let point = match line_intersection(a, b) {
                            Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                            Some(LineIntersection::Collinear { intersection }) => intersection.start,
                            None => continue,
                        };
                        if found.iter().any(|(p, _, _)| dist(*p, point) < MERGE_DISTANCE_M) {
                            continue;
                        }
                        found.push((
                            point,
                            tracks[i].station_on(si, point),
                            tracks[j].station_on(sj, point),
                        ));
                    }
                }
                for (point, station_i, station_j) in found {
                    let node = graph.add_node(point);
                    tracks[i].stops.push((station_i, node));
                    tracks[j].stops.push((station_j, node));
                }
            }
        }
    }

    /// Joins guide ends to any other guide passing within `tolerance_m`
    fn add_touches(tracks: &mut [Track], graph: &mut RouteGraph, tolerance_m: f64) {
        for i in 0..tracks.len() {
            let ends = [
                (0.0, tracks[i].coords[0]),
                (tracks[i].length(), tracks[i].coords[tracks[i].coords.len() - 1]),
            ];
            for j in 0..tracks.len() {
                if i == j || !tracks[i].near(&tracks[j], tolerance_m) {
                    continue;
                }
                for (station_i, point) in ends {
                    let Some(hit) = nearest_on(&tracks[j].coords, &tracks[j].stations, point) else {
                        continue;
                    };
                    if hit.distance > tolerance_m {
                        continue;
                    }
                    let node = graph.add_node(point);
                    tracks[i].stops.push((station_i, node));
                    tracks[j].stops.push((hit.along, node));
                }
            }
        }
    }

    fn link_stops(&mut self) {
        for (idx, track) in self.tracks.iter_mut().enumerate() {
            track.stops.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            for w in track.stops.windows(2) {
                let ((low, from), (high, to)) = (w[0], w[1]);
                if from == to {
                    continue;
                }
                let weight = ((high - low) * 1000.0).round() as Millimeters;
                self.graph.add_edge(
                    from,
                    to,
                    Span {
                        track: idx,
                        low,
                        high,
                        weight,
                    },
                );
            }
        }
    }

    /// Stitches the guide pieces of a path into one line
    pub(super) fn assemble(&self, steps: &[(NodeIndex, EdgeIndex)]) -> Option<Polyline> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for &(from, edge) in steps {
            let span = self.graph.edge_weight(edge)?;
            let (source, _) = self.graph.edge_endpoints(edge)?;
            let track = &self.tracks[span.track];
            let piece = if source == from {
                slice_between(&track.coords, &track.stations, span.low, span.high)
            } else {
                slice_between(&track.coords, &track.stations, span.high, span.low)
            };
            coords.extend(piece);
        }
        let coords = dedup(&coords);
        if coords.len() < 2 {
            return None;
        }
        let points: Vec<LatLng> = self.frame.unproject_line(&coords);
        Some(Polyline::new(points))
    }
}
