//! 2D toroidal grid holding the eaters.

use crumbs_core::{AgentId, Direction, Position};
use rand::Rng;

/// A 2D toroidal grid where any number of agents may share a cell
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Vec<AgentId>>,
}

impl Grid {
    /// Dimensions must already be validated as positive
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width as usize * height as usize],
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Agents currently standing on a cell (with toroidal wrapping)
    pub fn agents_at(&self, pos: Position) -> &[AgentId] {
        let index = self.index_of(pos);
        &self.cells[index]
    }

    /// Place an agent, returning the wrapped cell it landed on
    pub fn place_agent(&mut self, id: AgentId, pos: Position) -> Position {
        let wrapped = pos.wrap(self.width, self.height);
        let index = wrapped.to_index(self.width);
        self.cells[index].push(id);
        wrapped
    }

    pub fn move_agent(&mut self, id: AgentId, from: Position, to: Position) -> Position {
        self.remove_agent(id, from);
        self.place_agent(id, to)
    }

    /// Returns false when the agent was not on that cell
    pub fn remove_agent(&mut self, id: AgentId, pos: Position) -> bool {
        let index = self.index_of(pos);
        let cell = &mut self.cells[index];
        match cell.iter().position(|&occupant| occupant == id) {
            Some(slot) => {
                cell.swap_remove(slot);
                true
            }
            None => false,
        }
    }

    /// Moore neighbourhood of a cell: the 8 surrounding cells, wrapped.
    ///
    /// Cells that wrap onto each other or onto `pos` itself appear once or
    /// not at all, so grids narrower than 3 cells yield fewer than 8.
    pub fn moore_neighborhood(&self, pos: Position) -> Vec<Position> {
        let origin = pos.wrap(self.width, self.height);
        let mut neighborhood = Vec::with_capacity(8);

        for direction in Direction::all() {
            let (dx, dy) = direction.to_delta();
            let cell = origin.add(dx, dy).wrap(self.width, self.height);
            if cell != origin && !neighborhood.contains(&cell) {
                neighborhood.push(cell);
            }
        }

        neighborhood
    }

    /// Uniformly random cell; x is drawn before y
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let x = rng.gen_range(0..self.width);
        let y = rng.gen_range(0..self.height);
        Position::new(x, y)
    }

    /// Total number of placed agents
    pub fn occupant_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    fn index_of(&self, pos: Position) -> usize {
        pos.wrap(self.width, self.height).to_index(self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 10);
        assert_eq!(grid.occupant_count(), 0);
        assert!(grid.agents_at(Position::new(9, 9)).is_empty());
    }

    #[test]
    fn test_neighbors() {
        let grid = Grid::new(10, 10);
        let neighbors = grid.moore_neighborhood(Position::new(5, 5));

        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&Position::new(5, 5)));
        assert!(neighbors.contains(&Position::new(4, 4)));
        assert!(neighbors.contains(&Position::new(6, 6)));
    }

    #[test]
    fn test_neighbors_wrap_at_corner() {
        let grid = Grid::new(10, 10);
        let neighbors = grid.moore_neighborhood(Position::new(0, 0));

        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.contains(&Position::new(9, 9)));
        assert!(neighbors.contains(&Position::new(9, 0)));
        assert!(neighbors.contains(&Position::new(0, 9)));
        assert!(neighbors.contains(&Position::new(1, 9)));
    }

    #[test]
    fn test_neighbors_on_narrow_grids() {
        // 2x2: every other cell is a neighbour exactly once
        let grid = Grid::new(2, 2);
        let neighbors = grid.moore_neighborhood(Position::new(0, 0));
        assert_eq!(neighbors.len(), 3);

        // 1x3: only the two cells in the column remain
        let grid = Grid::new(1, 3);
        let neighbors = grid.moore_neighborhood(Position::new(0, 1));
        assert_eq!(neighbors, vec![Position::new(0, 0), Position::new(0, 2)]);

        // 1x1: nowhere to go
        let grid = Grid::new(1, 1);
        assert!(grid.moore_neighborhood(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn test_multi_occupancy() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(2, 2);
        grid.place_agent(AgentId(0), pos);
        grid.place_agent(AgentId(1), pos);

        assert_eq!(grid.agents_at(pos).len(), 2);

        let landed = grid.move_agent(AgentId(0), pos, Position::new(5, 2));
        assert_eq!(landed, Position::new(0, 2));
        assert_eq!(grid.agents_at(pos), &[AgentId(1)]);
        assert_eq!(grid.agents_at(landed), &[AgentId(0)]);

        assert!(grid.remove_agent(AgentId(1), pos));
        assert!(!grid.remove_agent(AgentId(1), pos));
        assert_eq!(grid.occupant_count(), 1);
    }

    #[test]
    fn test_random_cell_in_bounds() {
        let grid = Grid::new(7, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            assert!(grid.contains(grid.random_cell(&mut rng)));
        }
    }

    proptest! {
        #[test]
        fn neighborhood_stays_in_bounds(
            width in 1i32..12,
            height in 1i32..12,
            x in -20i32..20,
            y in -20i32..20,
        ) {
            let grid = Grid::new(width, height);
            let origin = Position::new(x, y).wrap(width, height);
            let neighbors = grid.moore_neighborhood(Position::new(x, y));

            prop_assert!(neighbors.len() <= 8);
            for cell in &neighbors {
                prop_assert!(grid.contains(*cell));
                prop_assert_ne!(*cell, origin);
            }
            if width >= 3 && height >= 3 {
                prop_assert_eq!(neighbors.len(), 8);
            }
        }
    }
}
