use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, VertexId};
use crate::types::Resource;

/// One legal move a player could make right now. Settlement and city
/// variants carry the board facts scoring needs so the scorer does not have
/// to re-derive them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateAction {
    BuildRoad {
        edge: EdgeId,
    },
    BuildSettlement {
        vertex: VertexId,
        pips: u32,
        resources: Vec<Resource>,
    },
    BuildCity {
        vertex: VertexId,
        pips: u32,
    },
    BankTrade {
        give: Resource,
        receive: Resource,
        rate: u8,
    },
    Pass,
}

impl CandidateAction {
    /// Fixed tie-break order applied when two actions score identically.
    pub fn precedence(&self) -> u8 {
        match self {
            CandidateAction::BuildSettlement { .. } => 4,
            CandidateAction::BuildCity { .. } => 3,
            CandidateAction::BuildRoad { .. } => 2,
            CandidateAction::BankTrade { .. } => 1,
            CandidateAction::Pass => 0,
        }
    }
}

/// Per-factor contributions behind a score, kept for diagnostics. Unused
/// factors stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub production: f64,
    pub diversity: f64,
    pub expansion: f64,
    pub longest_road: f64,
    pub trade_progress: f64,
    pub trade_balance: f64,
    pub trade_safety: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base
            + self.production
            + self.diversity
            + self.expansion
            + self.longest_road
            + self.trade_progress
            + self.trade_balance
            + self.trade_safety
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAction {
    pub action: CandidateAction,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

impl ScoredAction {
    pub fn rank(&self, other: &ScoredAction) -> std::cmp::Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.action.precedence().cmp(&other.action.precedence()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_orders_action_kinds() {
        let settlement = CandidateAction::BuildSettlement {
            vertex: 1,
            pips: 0,
            resources: vec![],
        };
        let city = CandidateAction::BuildCity { vertex: 1, pips: 0 };
        let road = CandidateAction::BuildRoad { edge: (0, 1) };
        let trade = CandidateAction::BankTrade {
            give: Resource::Ore,
            receive: Resource::Brick,
            rate: 4,
        };
        let mut order = [&trade, &settlement, &CandidateAction::Pass, &road, &city];
        order.sort_by_key(|action| std::cmp::Reverse(action.precedence()));
        assert_eq!(
            order.map(CandidateAction::precedence),
            [4, 3, 2, 1, 0]
        );
    }

    #[test]
    fn rank_breaks_score_ties_by_precedence() {
        let settlement = ScoredAction {
            action: CandidateAction::BuildSettlement {
                vertex: 1,
                pips: 0,
                resources: vec![],
            },
            score: 5.0,
            breakdown: ScoreBreakdown::default(),
        };
        let road = ScoredAction {
            action: CandidateAction::BuildRoad { edge: (0, 1) },
            score: 5.0,
            breakdown: ScoreBreakdown::default(),
        };
        assert_eq!(settlement.rank(&road), std::cmp::Ordering::Greater);

        let better_road = ScoredAction {
            score: 6.0,
            ..road.clone()
        };
        assert_eq!(better_road.rank(&settlement), std::cmp::Ordering::Greater);
    }
}
