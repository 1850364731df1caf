use std::collections::BinaryHeap;

use log::debug;

use crate::board::overlay::OwnershipOverlay;
use crate::board::BoardGraph;
use crate::game::resources::ResourceBundle;
use crate::types::PlacementPhase;

pub mod actions;
pub mod generate;
pub mod score;

pub use actions::{CandidateAction, ScoreBreakdown, ScoredAction};
pub use generate::{BANK_TRADE_RATE, CandidateGenerator};
pub use score::{ActionScorer, ScoreContext, ScoreWeights, WIN_POINTS};

/// The scripted opponent: enumerate, score, pick the maximum. Deterministic
/// throughout; any randomness (dice, discards) lives with the turn engine.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    scorer: ActionScorer,
}

impl DecisionEngine {
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            scorer: ActionScorer::new(weights),
        }
    }

    pub fn choose_action(
        &self,
        board: &BoardGraph,
        overlay: &OwnershipOverlay,
        player: usize,
        phase: PlacementPhase,
        resources: &ResourceBundle,
        opponents: &[ResourceBundle],
    ) -> CandidateAction {
        let candidates = CandidateGenerator::new(board, overlay).generate(player, phase, resources);
        if candidates.is_empty() {
            return CandidateAction::Pass;
        }
        let ctx = ScoreContext {
            board,
            overlay,
            player,
            resources,
            opponents,
            phase,
        };
        let mut heap: BinaryHeap<Ranked> = candidates
            .iter()
            .map(|candidate| Ranked(self.scorer.score(candidate, &ctx)))
            .collect();
        match heap.pop() {
            Some(best) => {
                debug!(
                    "player {player} chose {:?} (score {:.3})",
                    best.0.action, best.0.score
                );
                best.0.action
            }
            None => CandidateAction::Pass,
        }
    }

    /// Every candidate with its score and factor breakdown, best first. The
    /// building service uses this for hints; tests use it to see why a move
    /// won.
    pub fn score_candidates(
        &self,
        board: &BoardGraph,
        overlay: &OwnershipOverlay,
        player: usize,
        phase: PlacementPhase,
        resources: &ResourceBundle,
        opponents: &[ResourceBundle],
    ) -> Vec<ScoredAction> {
        let candidates = CandidateGenerator::new(board, overlay).generate(player, phase, resources);
        let ctx = ScoreContext {
            board,
            overlay,
            player,
            resources,
            opponents,
            phase,
        };
        let mut scored: Vec<ScoredAction> = candidates
            .iter()
            .map(|candidate| self.scorer.score(candidate, &ctx))
            .collect();
        scored.sort_by(|a, b| b.rank(a));
        scored
    }
}

struct Ranked(ScoredAction);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.0.rank(&other.0) == std::cmp::Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.rank(&other.0)
    }
}
