use log::debug;
use uuid::Uuid;

use crate::board::overlay::OwnershipOverlay;
use crate::board::{BoardGraph, EdgeId, VertexId};
use crate::rules::PlacementRules;
use crate::types::{BuildingKind, PlacementPhase};

/// One game's worth of board state: the immutable graph plus its ownership
/// overlay. Sessions are independent; running several games concurrently
/// means one session per game.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: Uuid,
    pub board: BoardGraph,
    pub overlay: OwnershipOverlay,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("edge already has a road")]
    EdgeOccupied,
    #[error("road must connect to your road network or a building")]
    RoadNotConnected,
    #[error("vertex already occupied")]
    VertexOccupied,
    #[error("too close to another building")]
    DistanceRuleViolation,
    #[error("settlement must be connected by your road")]
    SettlementNotConnected,
    #[error("no settlement of yours at this vertex")]
    NotYourSettlement,
}

impl GameSession {
    pub fn new(board: BoardGraph, num_players: usize) -> Self {
        let overlay = OwnershipOverlay::new(num_players);
        Self {
            id: Uuid::new_v4(),
            board,
            overlay,
        }
    }

    pub fn rules(&self) -> PlacementRules<'_> {
        PlacementRules::new(&self.board, &self.overlay)
    }

    pub fn place_road(&mut self, player: usize, edge: EdgeId) -> Result<(), PlacementError> {
        if !self.rules().can_place_road(player, edge) {
            if self.overlay.road_owner(edge).is_some() {
                return Err(PlacementError::EdgeOccupied);
            }
            return Err(PlacementError::RoadNotConnected);
        }
        self.overlay.set_edge_owner(edge, player);
        debug!("player {player} built road at {edge:?}");
        Ok(())
    }

    pub fn place_settlement(
        &mut self,
        player: usize,
        vertex: VertexId,
        phase: PlacementPhase,
    ) -> Result<(), PlacementError> {
        if !self.rules().can_place_settlement(player, vertex, phase) {
            if self.overlay.building_at(vertex).is_some() {
                return Err(PlacementError::VertexOccupied);
            }
            let blocked = self
                .board
                .neighbors(vertex)
                .iter()
                .any(|neighbor| self.overlay.building_at(*neighbor).is_some());
            if blocked {
                return Err(PlacementError::DistanceRuleViolation);
            }
            return Err(PlacementError::SettlementNotConnected);
        }
        self.overlay
            .set_vertex_building(vertex, BuildingKind::Settlement, player);
        debug!("player {player} built settlement at {vertex}");
        Ok(())
    }

    pub fn place_city(&mut self, player: usize, vertex: VertexId) -> Result<(), PlacementError> {
        if !self.rules().can_place_city(player, vertex) {
            return Err(PlacementError::NotYourSettlement);
        }
        self.overlay
            .set_vertex_building(vertex, BuildingKind::City, player);
        debug!("player {player} upgraded settlement at {vertex} to a city");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(BoardGraph::standard(), 2)
    }

    #[test]
    fn settlement_placement_round_trip() {
        let mut session = session();
        session
            .place_settlement(0, 0, PlacementPhase::InitialPlacement)
            .unwrap();
        assert_eq!(
            session.place_settlement(1, 0, PlacementPhase::InitialPlacement),
            Err(PlacementError::VertexOccupied)
        );
        let neighbor = session.board.neighbors(0)[0];
        assert_eq!(
            session.place_settlement(1, neighbor, PlacementPhase::InitialPlacement),
            Err(PlacementError::DistanceRuleViolation)
        );
    }

    #[test]
    fn road_placement_requires_network() {
        let mut session = session();
        session
            .place_settlement(0, 0, PlacementPhase::InitialPlacement)
            .unwrap();
        let edge = session.board.edges_of(0)[0];
        session.place_road(0, edge).unwrap();
        assert_eq!(session.place_road(1, edge), Err(PlacementError::EdgeOccupied));

        // player 1 has no network at all yet, so every free edge is rejected
        let free_edge = session
            .board
            .edge_ids()
            .find(|edge| session.overlay.road_owner(*edge).is_none())
            .unwrap();
        assert_eq!(
            session.place_road(1, free_edge),
            Err(PlacementError::RoadNotConnected)
        );
    }

    #[test]
    fn city_requires_own_settlement() {
        let mut session = session();
        session
            .place_settlement(0, 0, PlacementPhase::InitialPlacement)
            .unwrap();
        assert_eq!(
            session.place_city(1, 0),
            Err(PlacementError::NotYourSettlement)
        );
        session.place_city(0, 0).unwrap();
        assert!(session.overlay.holdings(0).cities.contains(&0));
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut a = session();
        let b = session();
        a.place_settlement(0, 0, PlacementPhase::InitialPlacement)
            .unwrap();
        assert!(b.overlay.building_at(0).is_none());
        assert_ne!(a.id, b.id);
    }
}
