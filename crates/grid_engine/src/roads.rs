use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::RoadClass;
use crate::grid::GridPos;

/// Road-cell membership plus the connectivity graph over them (nodes = road
/// cells, edges = 4-adjacency between two road cells).
///
/// Batching: inside a `begin_batch`/`end_batch` pair, membership updates
/// apply immediately but edge wiring is deferred until the batch closes, so
/// placing a multi-cell road reconciles the affected region once instead of
/// per cell. Batching is an internal optimization; there is no externally
/// visible pending state, only present/absent cells.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadNetwork {
    edges: HashMap<GridPos, HashSet<GridPos>>,
    class: HashMap<GridPos, RoadClass>,
    #[serde(skip)]
    batch_depth: u32,
    #[serde(skip)]
    pending: Vec<GridPos>,
}

impl RoadNetwork {
    /// Adds a road cell. Returns false if the cell is already a road.
    pub fn add_road(&mut self, pos: GridPos, class: RoadClass) -> bool {
        if self.class.contains_key(&pos) {
            return false;
        }
        self.class.insert(pos, class);
        self.edges.entry(pos).or_default();
        if self.batch_depth > 0 {
            self.pending.push(pos);
        } else {
            self.wire(pos);
        }
        true
    }

    /// Removes a road cell, its graph node, and all incident edges. Returns
    /// false if no road exists there.
    pub fn remove_road(&mut self, pos: GridPos) -> bool {
        if self.class.remove(&pos).is_none() {
            return false;
        }
        if let Some(neighbors) = self.edges.remove(&pos) {
            for neighbor in neighbors {
                if let Some(set) = self.edges.get_mut(&neighbor) {
                    set.remove(&pos);
                }
            }
        }
        self.pending.retain(|&p| p != pos);
        true
    }

    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            let pending = std::mem::take(&mut self.pending);
            for pos in pending {
                if self.class.contains_key(&pos) {
                    self.wire(pos);
                }
            }
        }
    }

    /// Connects `pos` to any 4-neighbor that is also a road cell.
    fn wire(&mut self, pos: GridPos) {
        for neighbor in cardinal_neighbors(pos) {
            if self.class.contains_key(&neighbor) {
                self.edges.entry(pos).or_default().insert(neighbor);
                self.edges.entry(neighbor).or_default().insert(pos);
            }
        }
    }

    pub fn has_road_at(&self, pos: GridPos) -> bool {
        self.class.contains_key(&pos)
    }

    pub fn class_at(&self, pos: GridPos) -> Option<RoadClass> {
        self.class.get(&pos).copied()
    }

    pub fn neighbors(&self, pos: GridPos) -> Vec<GridPos> {
        self.edges
            .get(&pos)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn road_cell_count(&self) -> usize {
        self.class.len()
    }

    /// Graph reachability between two road cells. Consumed by traffic and
    /// commute collaborators; the engine only owns the graph.
    pub fn is_connected(&self, a: GridPos, b: GridPos) -> bool {
        if !self.has_road_at(a) || !self.has_road_at(b) {
            return false;
        }
        if a == b {
            return true;
        }
        pathfinding::prelude::bfs(
            &a,
            |p| self.neighbors(*p),
            |p| *p == b,
        )
        .is_some()
    }
}

/// 4-neighbors without grid bounds: a coordinate past the map edge is never a
/// road cell, so it simply fails the membership lookup.
fn cardinal_neighbors(pos: GridPos) -> impl Iterator<Item = GridPos> {
    let mut result = [GridPos::new(0, 0); 4];
    let mut count = 0;
    if pos.x > 0 {
        result[count] = GridPos::new(pos.x - 1, pos.y);
        count += 1;
    }
    if pos.y > 0 {
        result[count] = GridPos::new(pos.x, pos.y - 1);
        count += 1;
    }
    result[count] = GridPos::new(pos.x + 1, pos.y);
    count += 1;
    result[count] = GridPos::new(pos.x, pos.y + 1);
    count += 1;
    result.into_iter().take(count)
}
