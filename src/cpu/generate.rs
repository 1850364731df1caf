use log::trace;

use crate::board::overlay::OwnershipOverlay;
use crate::board::BoardGraph;
use crate::cpu::actions::CandidateAction;
use crate::game::resources::{COST_CITY, COST_ROAD, COST_SETTLEMENT, ResourceBundle};
use crate::rules::PlacementRules;
use crate::types::{PlacementPhase, Resource};

pub const BANK_TRADE_RATE: u8 = 4;

/// Enumerates every legal, affordable action for a player by scanning the
/// whole (small, fixed) board through the placement rules. Iteration order is
/// sorted ids, so output is reproducible.
#[derive(Debug, Clone, Copy)]
pub struct CandidateGenerator<'a> {
    board: &'a BoardGraph,
    overlay: &'a OwnershipOverlay,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(board: &'a BoardGraph, overlay: &'a OwnershipOverlay) -> Self {
        Self { board, overlay }
    }

    pub fn generate(
        &self,
        player: usize,
        phase: PlacementPhase,
        resources: &ResourceBundle,
    ) -> Vec<CandidateAction> {
        let rules = PlacementRules::new(self.board, self.overlay);
        // initial placements are free; afterwards every build must be paid for
        let free = phase.is_initial();
        let mut actions = Vec::new();

        for vertex in self.board.vertex_ids() {
            if (free || resources.can_afford(&COST_SETTLEMENT))
                && rules.can_place_settlement(player, vertex, phase)
            {
                actions.push(CandidateAction::BuildSettlement {
                    vertex,
                    pips: self.board.vertex_pips(vertex),
                    resources: self.board.vertex_resources(vertex),
                });
            }
            if !free
                && resources.can_afford(&COST_CITY)
                && rules.can_place_city(player, vertex)
            {
                actions.push(CandidateAction::BuildCity {
                    vertex,
                    pips: self.board.vertex_pips(vertex),
                });
            }
        }

        for edge in self.board.edge_ids() {
            if (free || resources.can_afford(&COST_ROAD)) && rules.can_place_road(player, edge) {
                actions.push(CandidateAction::BuildRoad { edge });
            }
        }

        if !free {
            for give in Resource::ALL {
                if resources.get(give) < BANK_TRADE_RATE {
                    continue;
                }
                for receive in Resource::ALL {
                    if receive == give {
                        continue;
                    }
                    actions.push(CandidateAction::BankTrade {
                        give,
                        receive,
                        rate: BANK_TRADE_RATE,
                    });
                }
            }
        }

        if actions.is_empty() {
            actions.push(CandidateAction::Pass);
        }
        trace!(
            "generated {} candidate(s) for player {player} in phase {phase}",
            actions.len()
        );
        actions
    }
}
