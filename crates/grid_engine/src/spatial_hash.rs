use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::buildings::BuildingId;
use crate::config::{BUCKET_CELLS, GRID_HEIGHT, GRID_WIDTH};
use crate::grid::GridPos;

/// Bucketed spatial index over occupied cells. Insertion is keyed by building
/// identity so a multi-cell building can be removed from every bucket it ever
/// touched, and range queries deduplicate buildings that straddle buckets.
///
/// Overlay-only occupants are never inserted; indexing them would double-count
/// density at shared cells.
#[derive(Resource, Debug, Clone)]
pub struct SpatialHash {
    buckets_x: usize,
    buckets_y: usize,
    buckets: Vec<Vec<(BuildingId, GridPos)>>,
    /// Which buckets each building currently has entries in.
    tracked: HashMap<BuildingId, Vec<usize>>,
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl SpatialHash {
    pub fn new(width: usize, height: usize) -> Self {
        let buckets_x = width.div_ceil(BUCKET_CELLS).max(1);
        let buckets_y = height.div_ceil(BUCKET_CELLS).max(1);
        Self {
            buckets_x,
            buckets_y,
            buckets: (0..buckets_x * buckets_y).map(|_| Vec::new()).collect(),
            tracked: HashMap::new(),
        }
    }

    #[inline]
    fn bucket_index(&self, pos: GridPos) -> usize {
        let bx = (pos.x / BUCKET_CELLS).min(self.buckets_x - 1);
        let by = (pos.y / BUCKET_CELLS).min(self.buckets_y - 1);
        by * self.buckets_x + bx
    }

    /// Inserts every cell of a building in one call so per-bucket storage can
    /// be grown once.
    pub fn insert_multi(&mut self, id: BuildingId, cells: &[GridPos]) {
        if cells.is_empty() {
            return;
        }
        let touched = self.tracked.entry(id).or_default();
        for &cell in cells {
            let bx = (cell.x / BUCKET_CELLS).min(self.buckets_x - 1);
            let by = (cell.y / BUCKET_CELLS).min(self.buckets_y - 1);
            let idx = by * self.buckets_x + bx;
            self.buckets[idx].push((id, cell));
            if !touched.contains(&idx) {
                touched.push(idx);
            }
        }
    }

    /// Removes the building from every bucket it was inserted into.
    pub fn remove(&mut self, id: BuildingId) {
        if let Some(touched) = self.tracked.remove(&id) {
            for idx in touched {
                self.buckets[idx].retain(|&(e, _)| e != id);
            }
        }
    }

    /// Removes a single cell entry, keeping the building's other cells
    /// indexed. Used when one cell of a footprint is demoted to overlay
    /// status.
    pub fn remove_cell(&mut self, id: BuildingId, pos: GridPos) {
        let idx = self.bucket_index(pos);
        self.buckets[idx].retain(|&(e, c)| !(e == id && c == pos));

        let still_present = self.buckets[idx].iter().any(|&(e, _)| e == id);
        if !still_present {
            if let Some(touched) = self.tracked.get_mut(&id) {
                touched.retain(|&i| i != idx);
                if touched.is_empty() {
                    self.tracked.remove(&id);
                }
            }
        }
    }

    /// All buildings with at least one indexed cell inside the inclusive
    /// rectangle `[min, max]`, each returned once.
    pub fn query_rect(&self, min: GridPos, max: GridPos) -> Vec<BuildingId> {
        let min_bx = min.x / BUCKET_CELLS;
        let min_by = min.y / BUCKET_CELLS;
        let max_bx = (max.x / BUCKET_CELLS).min(self.buckets_x - 1);
        let max_by = (max.y / BUCKET_CELLS).min(self.buckets_y - 1);

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for by in min_by..=max_by {
            for bx in min_bx..=max_bx {
                for &(id, cell) in &self.buckets[by * self.buckets_x + bx] {
                    if cell.x >= min.x
                        && cell.x <= max.x
                        && cell.y >= min.y
                        && cell.y <= max.y
                        && seen.insert(id)
                    {
                        result.push(id);
                    }
                }
            }
        }
        result
    }

    /// All buildings with at least one indexed cell within euclidean
    /// `radius` of `center`, each returned once even when the building spans
    /// several matching buckets.
    pub fn query_radius(&self, center: GridPos, radius: f32) -> Vec<BuildingId> {
        let radius = radius.max(0.0);
        let reach = radius.ceil() as usize;
        let min = GridPos::new(
            center.x.saturating_sub(reach),
            center.y.saturating_sub(reach),
        );
        let max = GridPos::new(center.x + reach, center.y + reach);

        let min_bx = min.x / BUCKET_CELLS;
        let min_by = min.y / BUCKET_CELLS;
        let max_bx = (max.x / BUCKET_CELLS).min(self.buckets_x - 1);
        let max_by = (max.y / BUCKET_CELLS).min(self.buckets_y - 1);

        let r2 = radius * radius;
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for by in min_by..=max_by {
            for bx in min_bx..=max_bx {
                for &(id, cell) in &self.buckets[by * self.buckets_x + bx] {
                    let dx = cell.x as f32 - center.x as f32;
                    let dy = cell.y as f32 - center.y as f32;
                    if dx * dx + dy * dy <= r2 && seen.insert(id) {
                        result.push(id);
                    }
                }
            }
        }
        result
    }

    /// Total indexed cell entries (not unique buildings).
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }
}

/// One cell of a coverage mask: an offset from the effect center and the
/// effect strength at that offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageCell {
    pub dx: i32,
    pub dy: i32,
    pub strength: f32,
}

/// Per-radius cache of `(offset, strength)` tables. The mask for a given
/// radius is deterministic, so it is computed once and shared by every
/// building using that radius.
#[derive(Resource, Debug, Clone, Default)]
pub struct CoverageMasks {
    cache: HashMap<u32, Vec<CoverageCell>>,
}

impl CoverageMasks {
    /// Strength falls off linearly with euclidean distance: 1.0 at the
    /// center, approaching 0 at the mask edge.
    pub fn mask(&mut self, radius: u32) -> &[CoverageCell] {
        self.cache.entry(radius).or_insert_with(|| build_mask(radius))
    }

    pub fn cached_radii(&self) -> usize {
        self.cache.len()
    }
}

fn build_mask(radius: u32) -> Vec<CoverageCell> {
    let r = radius as i32;
    let rf = radius as f32;
    let mut cells = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist <= rf {
                cells.push(CoverageCell {
                    dx,
                    dy,
                    strength: 1.0 - dist / (rf + 1.0),
                });
            }
        }
    }
    cells
}
