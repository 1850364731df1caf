use serde::{Deserialize, Serialize};

use crate::board::overlay::OwnershipOverlay;
use crate::board::{BoardGraph, EdgeId, VertexId, normalize_edge};
use crate::cpu::actions::{CandidateAction, ScoreBreakdown, ScoredAction};
use crate::game::resources::{COST_CITY, COST_ROAD, COST_SETTLEMENT, ResourceBundle};
use crate::pathfind::{
    connected_reachability, longest_owned_path, longest_owned_path_including,
    shortest_path_to_resource,
};
use crate::rules::PlacementRules;
use crate::types::{PlacementPhase, Resource};

pub const WIN_POINTS: u8 = 10;

/// Dials for the heuristic. Settlements and cities are meant to outrank
/// roads, roads outrank trades, trades outrank passing; tune with care.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub base_value_settlement: f64,
    pub base_value_road: f64,
    pub base_value_city: f64,
    pub pip_value_per_point: f64,
    pub resource_diversity_bonus: f64,
    pub city_pip_bonus_factor: f64,
    pub longest_road_push: f64,
    pub road_expansion_weight: f64,
    pub trade_enable_opponent_win_penalty: f64,
    pub bank_trade_progress_weight: f64,
    pub bank_trade_scarcity_penalty: f64,
    pub bank_trade_excess_bonus: f64,
    pub pass_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base_value_settlement: 8.0,
            base_value_road: 2.5,
            base_value_city: 10.0,
            pip_value_per_point: 0.6,
            resource_diversity_bonus: 1.5,
            city_pip_bonus_factor: 0.25,
            longest_road_push: 1.6,
            road_expansion_weight: 1.8,
            trade_enable_opponent_win_penalty: 1000.0,
            bank_trade_progress_weight: 3.5,
            bank_trade_scarcity_penalty: 2.0,
            bank_trade_excess_bonus: 1.2,
            pass_penalty: 0.8,
        }
    }
}

/// Everything a score depends on. Opponent hands are the public counts in
/// player-index order with the scoring player's own entry omitted.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    pub board: &'a BoardGraph,
    pub overlay: &'a OwnershipOverlay,
    pub player: usize,
    pub resources: &'a ResourceBundle,
    pub opponents: &'a [ResourceBundle],
    pub phase: PlacementPhase,
}

impl ScoreContext<'_> {
    fn opponent_index(&self, slot: usize) -> usize {
        if slot < self.player { slot } else { slot + 1 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionScorer {
    weights: ScoreWeights,
}

impl ActionScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Pure function of `(action, ctx)`: identical inputs always produce the
    /// identical score.
    pub fn score(&self, action: &CandidateAction, ctx: &ScoreContext<'_>) -> ScoredAction {
        let w = &self.weights;
        let mut breakdown = ScoreBreakdown::default();

        match action {
            CandidateAction::BuildSettlement {
                pips, resources, ..
            } => {
                breakdown.base = w.base_value_settlement;
                breakdown.production = *pips as f64 * w.pip_value_per_point;
                if resources.len() >= 2 {
                    breakdown.diversity = w.resource_diversity_bonus;
                }
            }
            CandidateAction::BuildCity { pips, .. } => {
                breakdown.base = w.base_value_city;
                breakdown.production = *pips as f64 * w.city_pip_bonus_factor;
            }
            CandidateAction::BuildRoad { edge } => {
                breakdown.base = w.base_value_road;
                let current = longest_owned_path(ctx.board, ctx.overlay, ctx.player);
                let extended =
                    longest_owned_path_including(ctx.board, ctx.overlay, ctx.player, *edge);
                breakdown.longest_road =
                    extended.saturating_sub(current) as f64 * w.longest_road_push;
                breakdown.expansion = self.road_expansion(*edge, ctx);
            }
            CandidateAction::BankTrade { give, receive, rate } => {
                if self.trade_enables_opponent_win(ctx) {
                    breakdown.trade_safety = -w.trade_enable_opponent_win_penalty;
                } else {
                    breakdown.trade_progress = trade_progress(ctx.resources, *give, *receive, *rate)
                        * w.bank_trade_progress_weight;
                    let excess = ctx.resources.get(*give).saturating_sub(*rate) as f64;
                    breakdown.trade_balance = excess * w.bank_trade_excess_bonus
                        - ctx.board.scarcity(*give) * w.bank_trade_scarcity_penalty
                        + 1.0
                        + ctx.board.scarcity(*receive);
                }
            }
            CandidateAction::Pass => {
                breakdown.base = -w.pass_penalty;
            }
        }

        ScoredAction {
            action: action.clone(),
            score: breakdown.total(),
            breakdown,
        }
    }

    // How much a road opens up: frontier production it makes reachable, plus
    // a push when it is the next step of the cheapest route to the resource
    // the player's production lacks most.
    fn road_expansion(&self, edge: EdgeId, ctx: &ScoreContext<'_>) -> f64 {
        let w = &self.weights;
        let reached = connected_reachability(ctx.board, ctx.overlay, ctx.player);
        if reached.is_empty() {
            return 0.0;
        }
        let mut value = 0.0;

        let rules = PlacementRules::new(ctx.board, ctx.overlay);
        let edge = normalize_edge(edge);
        for endpoint in [edge.0, edge.1] {
            if reached.contains(&endpoint) {
                continue;
            }
            // a frontier corner we could settle later is worth its production
            if rules.can_place_settlement(ctx.player, endpoint, PlacementPhase::InitialPlacement) {
                value += ctx.board.vertex_pips(endpoint) as f64 * w.pip_value_per_point;
            }
        }

        let sources: Vec<VertexId> = reached.into_iter().collect();
        let wanted = self.wanted_resource(ctx);
        if let Some(plan) =
            shortest_path_to_resource(ctx.board, ctx.overlay, ctx.player, &sources, wanted)
        {
            if plan.edges.first() == Some(&edge) {
                value += w.road_expansion_weight * ctx.board.scarcity(wanted)
                    / plan.cost.max(1) as f64;
            }
        }
        value
    }

    // The resource the player's buildings produce least of; ties resolve in
    // declaration order.
    fn wanted_resource(&self, ctx: &ScoreContext<'_>) -> Resource {
        let mut production = [0.0f64; Resource::ALL.len()];
        for vertex in ctx.overlay.holdings(ctx.player).building_vertices() {
            for (resource, amount) in ctx.board.vertex_production(vertex) {
                let idx = Resource::ALL
                    .iter()
                    .position(|candidate| candidate == resource)
                    .expect("resource missing from declaration order");
                production[idx] += amount;
            }
        }
        let mut wanted = Resource::ALL[0];
        let mut least = f64::INFINITY;
        for (idx, resource) in Resource::ALL.into_iter().enumerate() {
            if production[idx] < least {
                least = production[idx];
                wanted = resource;
            }
        }
        wanted
    }

    // A bank trade is off the table outright when an opponent visibly sits
    // one affordable build away from winning; handing tempo to the bank in
    // that spot never pays.
    fn trade_enables_opponent_win(&self, ctx: &ScoreContext<'_>) -> bool {
        ctx.opponents.iter().enumerate().any(|(slot, hand)| {
            let opponent = ctx.opponent_index(slot);
            let holdings = ctx.overlay.holdings(opponent);
            let score = holdings.public_score();
            let city_win = hand.can_afford(&COST_CITY)
                && !holdings.settlements.is_empty()
                && score + 2 >= WIN_POINTS;
            let settlement_win =
                hand.can_afford(&COST_SETTLEMENT) && score + 1 >= WIN_POINTS;
            city_win || settlement_win
        })
    }
}

// Progress toward affording the three build types, 0.0 (nothing) to 1.0
// (fully covered) each, summed; the trade is worth the delta it causes.
fn trade_progress(hand: &ResourceBundle, give: Resource, receive: Resource, rate: u8) -> f64 {
    let mut after = *hand;
    if after.subtract(give, rate).is_err() {
        return 0.0;
    }
    after.add(receive, 1);
    (build_progress(&after) - build_progress(hand)).max(0.0)
}

fn build_progress(hand: &ResourceBundle) -> f64 {
    [COST_ROAD, COST_SETTLEMENT, COST_CITY]
        .iter()
        .map(|cost| {
            let mut have = 0u32;
            let mut need = 0u32;
            for (resource, amount) in cost.iter() {
                need += amount as u32;
                have += hand.get(resource).min(amount) as u32;
            }
            if need == 0 {
                0.0
            } else {
                have as f64 / need as f64
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BuildingKind;

    fn setup() -> (BoardGraph, OwnershipOverlay) {
        (BoardGraph::standard(), OwnershipOverlay::new(3))
    }

    fn context<'a>(
        board: &'a BoardGraph,
        overlay: &'a OwnershipOverlay,
        resources: &'a ResourceBundle,
        opponents: &'a [ResourceBundle],
    ) -> ScoreContext<'a> {
        ScoreContext {
            board,
            overlay,
            player: 0,
            resources,
            opponents,
            phase: PlacementPhase::Normal,
        }
    }

    fn settlement(pips: u32, resources: Vec<Resource>) -> CandidateAction {
        CandidateAction::BuildSettlement {
            vertex: 1,
            pips,
            resources,
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let (board, mut overlay) = setup();
        overlay.set_vertex_building(0, BuildingKind::Settlement, 0);
        let hand = ResourceBundle::from_counts([2, 2, 1, 1, 4]);
        let opponents = [ResourceBundle::zero(), ResourceBundle::zero()];
        let ctx = context(&board, &overlay, &hand, &opponents);
        let scorer = ActionScorer::default();

        let action = CandidateAction::BuildRoad {
            edge: board.edges_of(0)[0],
        };
        let first = scorer.score(&action, &ctx);
        let second = scorer.score(&action, &ctx);
        assert_eq!(first.score, second.score);
        assert_eq!(first.breakdown, second.breakdown);
    }

    #[test]
    fn higher_production_wins_between_settlements() {
        let (board, overlay) = setup();
        let hand = ResourceBundle::zero();
        let opponents: [ResourceBundle; 0] = [];
        let ctx = context(&board, &overlay, &hand, &opponents);
        let scorer = ActionScorer::default();

        let low = scorer.score(&settlement(4, vec![Resource::Brick]), &ctx);
        let high = scorer.score(&settlement(10, vec![Resource::Brick]), &ctx);
        assert!(high.score > low.score);
    }

    #[test]
    fn diversity_breaks_equal_production() {
        let (board, overlay) = setup();
        let hand = ResourceBundle::zero();
        let opponents: [ResourceBundle; 0] = [];
        let ctx = context(&board, &overlay, &hand, &opponents);
        let scorer = ActionScorer::default();

        let narrow = scorer.score(&settlement(6, vec![Resource::Brick]), &ctx);
        let varied = scorer.score(
            &settlement(6, vec![Resource::Brick, Resource::Lumber]),
            &ctx,
        );
        assert!(varied.score > narrow.score);
        let delta = varied.score - narrow.score;
        assert!((delta - scorer.weights().resource_diversity_bonus).abs() < 1e-9);
    }

    #[test]
    fn settlements_outrank_roads_outrank_trades_outrank_pass() {
        let (board, mut overlay) = setup();
        overlay.set_vertex_building(0, BuildingKind::Settlement, 0);
        let hand = ResourceBundle::from_counts([4, 4, 4, 4, 4]);
        let opponents = [ResourceBundle::zero(), ResourceBundle::zero()];
        let ctx = context(&board, &overlay, &hand, &opponents);
        let scorer = ActionScorer::default();

        let settlement = scorer.score(&settlement(5, vec![Resource::Brick, Resource::Ore]), &ctx);
        let road = scorer.score(
            &CandidateAction::BuildRoad {
                edge: board.edges_of(0)[0],
            },
            &ctx,
        );
        let trade = scorer.score(
            &CandidateAction::BankTrade {
                give: Resource::Lumber,
                receive: Resource::Ore,
                rate: 4,
            },
            &ctx,
        );
        let pass = scorer.score(&CandidateAction::Pass, &ctx);

        assert!(settlement.score > road.score, "settlement must beat road");
        assert!(road.score > trade.score, "road must beat trade");
        assert!(trade.score > pass.score, "trade must beat pass");
        assert!(pass.score < 0.0, "pass is the floor");
    }

    #[test]
    fn trade_vetoed_when_opponent_about_to_win() {
        let (board, mut overlay) = setup();
        // opponent 1 has four cities, one affordable city away from ten points
        for vertex in [0, 8, 16, 24] {
            overlay.set_vertex_building(vertex, BuildingKind::Settlement, 1);
            overlay.set_vertex_building(vertex, BuildingKind::City, 1);
        }
        overlay.set_vertex_building(40, BuildingKind::Settlement, 1);
        let hand = ResourceBundle::from_counts([0, 0, 0, 4, 4]);
        let rich = ResourceBundle::from_counts([0, 0, 0, 2, 3]);
        let opponents = [rich, ResourceBundle::zero()];
        let ctx = context(&board, &overlay, &hand, &opponents);
        let scorer = ActionScorer::default();

        let trade = scorer.score(
            &CandidateAction::BankTrade {
                give: Resource::Grain,
                receive: Resource::Brick,
                rate: 4,
            },
            &ctx,
        );
        assert_eq!(
            trade.score,
            -scorer.weights().trade_enable_opponent_win_penalty
        );
    }

    #[test]
    fn trade_prefers_receiving_the_scarcer_resource() {
        let (board, overlay) = setup();
        let hand = ResourceBundle::from_counts([0, 0, 0, 0, 5]);
        let opponents: [ResourceBundle; 0] = [];
        let ctx = context(&board, &overlay, &hand, &opponents);
        let scorer = ActionScorer::default();

        // Lumber and Brick weigh identically in build costs, so only board
        // scarcity separates these two trades.
        let (scarcer, plentier) =
            if board.scarcity(Resource::Brick) > board.scarcity(Resource::Lumber) {
                (Resource::Brick, Resource::Lumber)
            } else {
                (Resource::Lumber, Resource::Brick)
            };
        let toward_scarce = scorer.score(
            &CandidateAction::BankTrade {
                give: Resource::Ore,
                receive: scarcer,
                rate: 4,
            },
            &ctx,
        );
        let toward_plenty = scorer.score(
            &CandidateAction::BankTrade {
                give: Resource::Ore,
                receive: plentier,
                rate: 4,
            },
            &ctx,
        );
        assert!(toward_scarce.score > toward_plenty.score);
    }

    #[test]
    fn road_toward_scarce_resource_outscores_a_dead_end() {
        let (board, mut overlay) = setup();
        overlay.set_vertex_building(0, BuildingKind::Settlement, 0);
        let hand = ResourceBundle::from_counts([4, 4, 0, 0, 0]);
        let opponents = [ResourceBundle::zero(), ResourceBundle::zero()];
        let ctx = context(&board, &overlay, &hand, &opponents);
        let scorer = ActionScorer::default();

        let scored: Vec<ScoredAction> = board
            .edges_of(0)
            .iter()
            .map(|edge| scorer.score(&CandidateAction::BuildRoad { edge: *edge }, &ctx))
            .collect();
        // all first roads are worth at least base value plus the longest-road
        // gain of a single segment
        let floor = scorer.weights().base_value_road + scorer.weights().longest_road_push;
        for action in &scored {
            assert!(action.score >= floor, "{action:?} under floor");
        }
        // the one on the plan toward the wanted resource carries extra weight
        let best = scored
            .iter()
            .map(|action| action.score)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(best > floor);
    }
}
