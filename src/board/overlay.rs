use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, VertexId, normalize_edge};
use crate::types::BuildingKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub owner: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerHoldings {
    pub settlements: BTreeSet<VertexId>,
    pub cities: BTreeSet<VertexId>,
    pub roads: BTreeSet<EdgeId>,
}

impl PlayerHoldings {
    pub fn building_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.settlements.iter().chain(self.cities.iter()).copied()
    }

    pub fn public_score(&self) -> u8 {
        self.settlements.len() as u8 + 2 * self.cities.len() as u8
    }
}

/// Mutable ownership state layered over an immutable [`BoardGraph`].
///
/// Mutations are unconditional; legality is the caller's concern. One overlay
/// belongs to exactly one game session.
///
/// [`BoardGraph`]: crate::board::BoardGraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipOverlay {
    buildings: HashMap<VertexId, Building>,
    roads: HashMap<EdgeId, usize>,
    holdings: Vec<PlayerHoldings>,
}

impl OwnershipOverlay {
    pub fn new(num_players: usize) -> Self {
        assert!(num_players > 0, "a game needs at least one player");
        Self {
            buildings: HashMap::new(),
            roads: HashMap::new(),
            holdings: vec![PlayerHoldings::default(); num_players],
        }
    }

    pub fn num_players(&self) -> usize {
        self.holdings.len()
    }

    pub fn building_at(&self, vertex: VertexId) -> Option<Building> {
        self.buildings.get(&vertex).copied()
    }

    pub fn road_owner(&self, edge: EdgeId) -> Option<usize> {
        self.roads.get(&normalize_edge(edge)).copied()
    }

    pub fn holdings(&self, player: usize) -> &PlayerHoldings {
        self.holdings.get(player).expect("invalid player index")
    }

    pub fn owns_building_at(&self, player: usize, vertex: VertexId) -> bool {
        matches!(self.building_at(vertex), Some(building) if building.owner == player)
    }

    pub fn set_vertex_building(&mut self, vertex: VertexId, kind: BuildingKind, player: usize) {
        assert!(player < self.holdings.len(), "invalid player index");
        self.buildings.insert(vertex, Building { kind, owner: player });
        let holdings = &mut self.holdings[player];
        match kind {
            BuildingKind::Settlement => {
                holdings.settlements.insert(vertex);
            }
            BuildingKind::City => {
                holdings.settlements.remove(&vertex);
                holdings.cities.insert(vertex);
            }
        }
    }

    pub fn set_edge_owner(&mut self, edge: EdgeId, player: usize) {
        assert!(player < self.holdings.len(), "invalid player index");
        let normalized = normalize_edge(edge);
        self.roads.insert(normalized, player);
        self.holdings[player].roads.insert(normalized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_then_city_moves_between_holdings() {
        let mut overlay = OwnershipOverlay::new(2);
        overlay.set_vertex_building(10, BuildingKind::Settlement, 0);
        assert!(overlay.holdings(0).settlements.contains(&10));
        assert!(overlay.owns_building_at(0, 10));

        overlay.set_vertex_building(10, BuildingKind::City, 0);
        assert!(!overlay.holdings(0).settlements.contains(&10));
        assert!(overlay.holdings(0).cities.contains(&10));
        assert_eq!(
            overlay.building_at(10),
            Some(Building {
                kind: BuildingKind::City,
                owner: 0
            })
        );
    }

    #[test]
    fn road_owner_is_normalized() {
        let mut overlay = OwnershipOverlay::new(2);
        overlay.set_edge_owner((5, 3), 1);
        assert_eq!(overlay.road_owner((3, 5)), Some(1));
        assert_eq!(overlay.road_owner((5, 3)), Some(1));
        assert!(overlay.holdings(1).roads.contains(&(3, 5)));
    }

    #[test]
    fn public_score_counts_cities_double() {
        let mut overlay = OwnershipOverlay::new(1);
        overlay.set_vertex_building(1, BuildingKind::Settlement, 0);
        overlay.set_vertex_building(2, BuildingKind::Settlement, 0);
        overlay.set_vertex_building(2, BuildingKind::City, 0);
        assert_eq!(overlay.holdings(0).public_score(), 3);
    }

    #[test]
    #[should_panic(expected = "invalid player index")]
    fn out_of_range_player_fails_fast() {
        let overlay = OwnershipOverlay::new(2);
        overlay.holdings(2);
    }
}
