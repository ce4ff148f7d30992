//! Cookie eater state and per-tick behaviour.

use crate::world::Environment;
use crumbs_core::{AgentId, Position};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Energy every eater starts with
pub const INITIAL_ENERGY: i32 = 10;
/// Energy burned at the end of every turn
pub const METABOLIC_COST: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Alive,
    /// Terminal; the agent never acts again
    Removed,
}

/// What happened during one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Survived { ate: bool },
    Starved { ate: bool },
    AlreadyRemoved,
}

impl TurnOutcome {
    pub fn ate(&self) -> bool {
        match self {
            TurnOutcome::Survived { ate } | TurnOutcome::Starved { ate } => *ate,
            TurnOutcome::AlreadyRemoved => false,
        }
    }
}

/// A cookie eater in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: Position,
    pub energy: i32,
    pub age: u64,
    pub crumbs_eaten: u32,
    state: AgentState,
}

impl Agent {
    pub fn new(id: AgentId, position: Position) -> Self {
        Self::with_energy(id, position, INITIAL_ENERGY)
    }

    pub fn with_energy(id: AgentId, position: Position, energy: i32) -> Self {
        Self {
            id,
            position,
            energy,
            age: 0,
            crumbs_eaten: 0,
            state: AgentState::Alive,
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == AgentState::Alive
    }

    /// Move, eat, burn energy, then check for starvation.
    ///
    /// Energy saturates at the bounds of `i32`. Grid and crumb changes are visible to agents acting later in the
    /// same tick.
    pub fn turn(&mut self, env: &mut Environment) -> TurnOutcome {
        if !self.is_alive() {
            warn!(agent_id = %self.id, "Removed agent was asked to take a turn");
            return TurnOutcome::AlreadyRemoved;
        }

        self.age += 1;
        self.move_to_neighbor(env);
        let ate = self.eat(env);
        self.energy = self.energy.saturating_sub(METABOLIC_COST);

        trace!(
            agent_id = %self.id,
            x = self.position.x,
            y = self.position.y,
            energy = self.energy,
            ate,
            "Turn finished"
        );

        if self.energy <= 0 {
            self.state = AgentState::Removed;
            TurnOutcome::Starved { ate }
        } else {
            TurnOutcome::Survived { ate }
        }
    }

    fn move_to_neighbor(&mut self, env: &mut Environment) {
        let neighborhood = env.grid.moore_neighborhood(self.position);
        // A 1x1 world has no neighbours; stay put
        if let Some(&target) = neighborhood.choose(env.rng()) {
            self.position = env.grid.move_agent(self.id, self.position, target);
        }
    }

    fn eat(&mut self, env: &mut Environment) -> bool {
        if env.crumbs.get(self.position) == 0 {
            return false;
        }
        self.energy = self.energy.saturating_add(env.cookie_value);
        env.crumbs.set(self.position, 0);
        self.crumbs_eaten += 1;
        true
    }
}
