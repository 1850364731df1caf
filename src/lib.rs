#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod coords;
pub mod cpu;
pub mod game;
pub mod pathfind;
pub mod rules;
pub mod types;

pub use board::overlay::{Building, OwnershipOverlay, PlayerHoldings};
pub use board::{BoardGraph, BoardTemplate, EdgeId, Hex, VertexId};
pub use cpu::{CandidateAction, DecisionEngine, ScoreWeights, ScoredAction};
pub use game::{GameSession, PlacementError, ResourceBundle};
pub use pathfind::PathResult;
pub use rules::PlacementRules;
pub use types::{BuildingKind, PlacementPhase, Resource};
