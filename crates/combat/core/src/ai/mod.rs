//! Monster decision loop.
mod brain;
mod params;

pub use brain::{BrainContext, MonsterBrain, MonsterState};
pub use params::BehaviorParams;
