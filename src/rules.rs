use crate::board::overlay::OwnershipOverlay;
use crate::board::{BoardGraph, EdgeId, VertexId, normalize_edge};
use crate::types::{BuildingKind, PlacementPhase};

/// Pure placement predicates over a board and its ownership overlay.
///
/// `false` is the normal answer for most of the board; these never mutate
/// anything and never look at resources (affordability is the candidate
/// generator's concern).
#[derive(Debug, Clone, Copy)]
pub struct PlacementRules<'a> {
    board: &'a BoardGraph,
    overlay: &'a OwnershipOverlay,
}

impl<'a> PlacementRules<'a> {
    pub fn new(board: &'a BoardGraph, overlay: &'a OwnershipOverlay) -> Self {
        Self { board, overlay }
    }

    pub fn can_place_road(&self, player: usize, edge: EdgeId) -> bool {
        let edge = normalize_edge(edge);
        assert!(self.board.contains_edge(edge), "unknown edge id");
        if self.overlay.road_owner(edge).is_some() {
            return false;
        }
        self.endpoint_connects(player, edge.0) || self.endpoint_connects(player, edge.1)
    }

    pub fn can_place_settlement(
        &self,
        player: usize,
        vertex: VertexId,
        phase: PlacementPhase,
    ) -> bool {
        if self.overlay.building_at(vertex).is_some() {
            return false;
        }
        // Distance rule: every neighbor must be empty, whoever would own it.
        let crowded = self
            .board
            .neighbors(vertex)
            .iter()
            .any(|neighbor| self.overlay.building_at(*neighbor).is_some());
        if crowded {
            return false;
        }
        if phase.is_initial() {
            return true;
        }
        self.has_incident_road(player, vertex)
    }

    pub fn can_place_city(&self, player: usize, vertex: VertexId) -> bool {
        assert!(self.board.contains_vertex(vertex), "unknown vertex id");
        matches!(
            self.overlay.building_at(vertex),
            Some(building)
                if building.owner == player && building.kind == BuildingKind::Settlement
        )
    }

    fn endpoint_connects(&self, player: usize, vertex: VertexId) -> bool {
        if self.overlay.owns_building_at(player, vertex) {
            return true;
        }
        self.board
            .edges_of(vertex)
            .iter()
            .any(|edge| self.overlay.road_owner(*edge) == Some(player))
    }

    fn has_incident_road(&self, player: usize, vertex: VertexId) -> bool {
        self.board
            .edges_of(vertex)
            .iter()
            .any(|edge| self.overlay.road_owner(*edge) == Some(player))
    }
}
