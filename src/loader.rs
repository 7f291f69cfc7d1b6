//! Road-load coordination for the active study area
//!
//! At most one fetch is in flight. Requests made meanwhile replace a single
//! queued box, issued once the in-flight fetch resolves. Results are matched
//! against the active box on arrival and dropped if it changed.

use curbside_core::BoundingBox;
use curbside_roads::RoadSource;
use log::debug;

use crate::events::SurfaceCommand;
use crate::session::AnnotationSession;

/// A fetch the session wants performed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchTicket {
    pub bbox: BoundingBox,
    pub generation: u64,
}

/// What to do with a finished fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Answers the active box
    Current { next: Option<FetchTicket> },
    /// The active box changed while the fetch ran
    Stale { next: Option<FetchTicket> },
    /// Not the in-flight ticket
    Ignored,
}

#[derive(Debug, Default)]
pub struct RoadLoader {
    active: Option<BoundingBox>,
    loaded: Option<BoundingBox>,
    in_flight: Option<FetchTicket>,
    queued: Option<BoundingBox>,
    generation: u64,
}

impl RoadLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<BoundingBox> {
        self.active
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn queued(&self) -> Option<BoundingBox> {
        self.queued
    }

    /// Makes `bbox` the active box. Returns a ticket if a fetch should start now.
    pub fn request(&mut self, bbox: BoundingBox) -> Option<FetchTicket> {
        self.active = Some(bbox);

        if let Some(in_flight) = self.in_flight {
            self.queued = (!in_flight.bbox.same_extent(&bbox)).then_some(bbox);
            debug!("Fetch in flight, queued box: {:?}", self.queued);
            return None;
        }
        if self.loaded.is_some_and(|loaded| loaded.same_extent(&bbox)) {
            return None;
        }
        Some(self.issue(bbox))
    }

    /// Forgets the active box and any loaded roads. An in-flight result will
    /// come back stale.
    pub fn deactivate(&mut self) {
        self.active = None;
        self.loaded = None;
        self.queued = None;
    }

    /// Withdraws a ticket that was issued but never started.
    pub fn abandon(&mut self, ticket: FetchTicket) {
        if self.in_flight == Some(ticket) {
            debug!("Abandoning fetch #{} before it started", ticket.generation);
            self.in_flight = None;
        }
    }

    /// Settles `ticket`. `succeeded` marks whether roads were obtained.
    pub fn resolve(&mut self, ticket: FetchTicket, succeeded: bool) -> Resolution {
        if self.in_flight != Some(ticket) {
            debug!("Ignoring unknown fetch generation {}", ticket.generation);
            return Resolution::Ignored;
        }
        self.in_flight = None;

        let current = self.is_active(&ticket.bbox);
        if current && succeeded {
            self.loaded = Some(ticket.bbox);
        }

        let next = self
            .queued
            .take()
            .filter(|queued| self.is_active(queued))
            .filter(|queued| !(current && queued.same_extent(&ticket.bbox)))
            .map(|queued| self.issue(queued));

        if current {
            Resolution::Current { next }
        } else {
            Resolution::Stale { next }
        }
    }

    fn is_active(&self, bbox: &BoundingBox) -> bool {
        self.active.is_some_and(|active| active.same_extent(bbox))
    }

    fn issue(&mut self, bbox: BoundingBox) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            bbox,
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        ticket
    }
}

/// Performs the session's pending fetches one after another until none remain
pub async fn drive_road_fetches(
    session: &mut AnnotationSession,
    source: &dyn RoadSource,
) -> Vec<SurfaceCommand> {
    let mut commands = Vec::new();
    while let Some(ticket) = session.take_fetch() {
        let result = source.fetch_roads(ticket.bbox, None).await;
        commands.extend(session.finish_fetch(ticket, result));
    }
    commands
}
