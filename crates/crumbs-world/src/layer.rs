//! Per-cell integer property layers.

use crumbs_core::Position;
use serde::{Deserialize, Serialize};

/// Dense map from grid cell to a non-negative quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyLayer {
    name: String,
    width: i32,
    height: i32,
    values: Vec<u32>,
}

impl PropertyLayer {
    pub fn new(name: impl Into<String>, width: i32, height: i32, default_value: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            values: vec![default_value; width as usize * height as usize],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value at a cell (with toroidal wrapping)
    pub fn get(&self, pos: Position) -> u32 {
        self.values[self.index_of(pos)]
    }

    pub fn set(&mut self, pos: Position, value: u32) {
        let index = self.index_of(pos);
        self.values[index] = value;
    }

    pub fn fill(&mut self, value: u32) {
        self.values.iter_mut().for_each(|v| *v = value);
    }

    pub fn total(&self) -> u64 {
        self.values.iter().map(|&v| v as u64).sum()
    }

    pub fn count_nonzero(&self) -> usize {
        self.values.iter().filter(|&&v| v > 0).count()
    }

    /// Iterator over all cells with their values, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (Position::from_index(i, self.width), v))
    }

    fn index_of(&self, pos: Position) -> usize {
        pos.wrap(self.width, self.height).to_index(self.width)
    }
}
