//! World simulation engine.
//!
//! Cookie eaters wander a toroidal grid, eat the crumbs they land on and
//! starve when their energy runs out. One crumb regrows somewhere every tick.

pub mod agent;
pub mod batch;
pub mod collector;
pub mod grid;
pub mod layer;
pub mod world;

pub use agent::{Agent, AgentState, TurnOutcome};
pub use batch::{batch_run, summarize, BatchRow, SweepSummary};
pub use collector::DataCollector;
pub use grid::Grid;
pub use layer::PropertyLayer;
pub use world::{Environment, World};
