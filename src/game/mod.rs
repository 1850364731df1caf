pub mod resources;
pub mod session;

pub use resources::{COST_CITY, COST_ROAD, COST_SETTLEMENT, ResourceBundle, ResourceError};
pub use session::{GameSession, PlacementError};
