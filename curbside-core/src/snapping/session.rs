//! Draw-session state machine
//!
//! One session covers a single freehand line from the first vertex to
//! completion or cancellation. Guide touches live only as long as the session.

use std::mem;

use log::{debug, trace};

use crate::config::SnapConfig;
use crate::geometry::slice_line_between;
use crate::guides::GuideSet;
use crate::model::{GuideId, LatLng, Polyline};
use crate::routing::{GuideSnap, find_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Idle,
    Drawing,
    /// Finished early by two touches on one guide, waiting for `finish`
    Completed,
}

/// Vertex that was moved onto a guide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideTouch {
    pub vertex: usize,
    pub snap: GuideSnap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VertexOutcome {
    /// No session in progress
    Ignored,
    /// Vertex kept where it was placed
    Free(LatLng),
    /// Vertex moved onto a guide
    Snapped { point: LatLng, guide: GuideId },
    /// Second touch on the same guide: the line is the slice between touches
    Completed(Polyline),
}

/// Final geometry of a session
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutcome {
    pub geometry: Polyline,
    /// First guide touched, if any
    pub guide: Option<GuideId>,
    /// Geometry was replaced by a route across guides
    pub routed: bool,
}

#[derive(Debug, Clone)]
pub struct DrawSession {
    state: DrawState,
    snap_tolerance_m: f64,
    coincidence_tolerance_m: f64,
    vertices: Vec<LatLng>,
    touches: Vec<GuideTouch>,
    completed: Option<Polyline>,
}

impl DrawSession {
    pub fn new(config: &SnapConfig) -> Self {
        Self {
            state: DrawState::Idle,
            snap_tolerance_m: config.snap_tolerance_m,
            coincidence_tolerance_m: config.coincidence_tolerance_m,
            vertices: Vec::new(),
            touches: Vec::new(),
            completed: None,
        }
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    pub fn touches(&self) -> &[GuideTouch] {
        &self.touches
    }

    pub fn start(&mut self) {
        self.reset();
        self.state = DrawState::Drawing;
    }

    /// Commits a vertex, snapping it to the nearest guide within tolerance
    pub fn place_vertex(&mut self, raw: LatLng, guides: &GuideSet) -> VertexOutcome {
        if self.state != DrawState::Drawing {
            return VertexOutcome::Ignored;
        }

        let Some(hit) = guides.nearest(raw, self.snap_tolerance_m) else {
            self.vertices.push(raw);
            return VertexOutcome::Free(raw);
        };

        trace!("Vertex snapped to {} ({:.2} m)", hit.guide, hit.distance_m);
        let vertex = self.vertices.len();
        self.vertices.push(hit.point);
        self.touches.push(GuideTouch {
            vertex,
            snap: hit.to_snap(),
        });

        // Returning to any guide touched before closes the line on that guide
        if let Some((latest, earlier)) = self.touches.split_last()
            && let Some(first) = earlier.iter().find(|t| t.snap.guide == latest.snap.guide)
            && let Some(line) = guides
                .get(first.snap.guide)
                .and_then(|g| slice_line_between(&g.geometry, first.snap.point, latest.snap.point))
        {
            debug!("Two touches on {}, finishing early", first.snap.guide);
            self.completed = Some(line.clone());
            self.state = DrawState::Completed;
            return VertexOutcome::Completed(line);
        }

        VertexOutcome::Snapped {
            point: hit.point,
            guide: hit.guide,
        }
    }

    /// Where the open vertex under the pointer would land. Records nothing.
    pub fn preview(&self, raw: LatLng, guides: &GuideSet) -> LatLng {
        if self.state != DrawState::Drawing {
            return raw;
        }
        guides
            .nearest(raw, self.snap_tolerance_m)
            .map_or(raw, |hit| hit.point)
    }

    /// Ends the session and decides the final geometry.
    ///
    /// Two or more touches are routed first to last; without a route
    /// (or without guides) the freehand line passes through unchanged.
    /// Returns `None` if nothing usable was drawn.
    pub fn finish(&mut self, freehand: &Polyline, guides: &GuideSet) -> Option<DrawOutcome> {
        let state = self.state;
        let touches = mem::take(&mut self.touches);
        let completed = self.completed.take();
        self.reset();

        let first_guide = touches.first().map(|t| t.snap.guide);

        if state == DrawState::Completed
            && let Some(geometry) = completed
        {
            return Some(DrawOutcome {
                geometry,
                guide: first_guide,
                routed: false,
            });
        }

        if let [first, .., last] = touches.as_slice() {
            match find_path(
                guides.guides(),
                &first.snap,
                &last.snap,
                self.coincidence_tolerance_m,
            ) {
                Some(path) => {
                    return Some(DrawOutcome {
                        geometry: path,
                        guide: first_guide,
                        routed: true,
                    });
                }
                None => debug!(
                    "No route from {} to {}, keeping freehand line",
                    first.snap.guide, last.snap.guide
                ),
            }
        }

        freehand.is_valid().then(|| DrawOutcome {
            geometry: freehand.clone(),
            guide: first_guide,
            routed: false,
        })
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = DrawState::Idle;
        self.vertices.clear();
        self.touches.clear();
        self.completed = None;
    }
}
