//! Typed registry of the layers shown on the drawing surface

use std::fmt;

use curbside_core::SegmentId;
use hashbrown::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Guide,
    Segment(SegmentId),
    Boundary,
}

#[derive(Debug, Default)]
pub struct LayerRegistry {
    next_id: u64,
    layers: HashMap<LayerId, LayerKind>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: LayerKind) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, kind);
        id
    }

    pub fn get(&self, id: LayerId) -> Option<&LayerKind> {
        self.layers.get(&id)
    }

    pub fn remove(&mut self, id: LayerId) -> Option<LayerKind> {
        self.layers.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn segment_layer(&self, segment: &SegmentId) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|(_, kind)| matches!(kind, LayerKind::Segment(id) if id == segment))
            .map(|(&id, _)| id)
    }

    pub fn boundary_layer(&self) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|(_, kind)| **kind == LayerKind::Boundary)
            .map(|(&id, _)| id)
    }

    /// Removes every layer matching `predicate`, returning their ids in order
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&LayerKind) -> bool) -> Vec<LayerId> {
        let mut removed: Vec<LayerId> = self
            .layers
            .iter()
            .filter(|(_, kind)| predicate(kind))
            .map(|(&id, _)| id)
            .collect();
        removed.sort_unstable();
        for id in &removed {
            self.layers.remove(id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_typed() {
        let mut registry = LayerRegistry::new();
        let boundary = registry.insert(LayerKind::Boundary);
        let segment = registry.insert(LayerKind::Segment(SegmentId::new("s1")));
        let guide = registry.insert(LayerKind::Guide);
        assert_ne!(boundary, segment);

        assert_eq!(registry.boundary_layer(), Some(boundary));
        assert_eq!(registry.segment_layer(&SegmentId::new("s1")), Some(segment));
        assert_eq!(registry.get(guide), Some(&LayerKind::Guide));
        assert_eq!(registry.segment_layer(&SegmentId::new("s2")), None);
    }

    #[test]
    fn remove_where_only_touches_matches() {
        let mut registry = LayerRegistry::new();
        let g1 = registry.insert(LayerKind::Guide);
        registry.insert(LayerKind::Boundary);
        let g2 = registry.insert(LayerKind::Guide);

        assert_eq!(registry.remove_where(|k| *k == LayerKind::Guide), vec![g1, g2]);
        assert_eq!(registry.len(), 1);
        assert!(registry.boundary_layer().is_some());
    }
}
