//! Placement lattice tracking legal and occupied emplacement slots.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use path_defence_core::{CellCoord, EmplacementId, Lattice, PlacementError, SlotSnapshot};

/// Legal emplacement slots and their current occupants.
///
/// The legal set is computed once from the lattice configuration and never
/// changes; only occupancy is mutated.
#[derive(Clone, Debug)]
pub(crate) struct PlacementGrid {
    cell_size: f32,
    legal: BTreeSet<CellCoord>,
    occupied: BTreeMap<CellCoord, EmplacementId>,
}

impl PlacementGrid {
    pub(crate) fn new(lattice: &Lattice) -> Self {
        Self {
            cell_size: lattice.cell_size,
            legal: lattice.slots.cells().collect(),
            occupied: BTreeMap::new(),
        }
    }

    /// Snaps a screen point to the centre of the lattice cell containing it.
    pub(crate) fn grid_position_for(&self, point: Vec2) -> Vec2 {
        let half = self.cell_size * 0.5;
        Vec2::new(
            (point.x / self.cell_size).floor() * self.cell_size + half,
            (point.y / self.cell_size).floor() * self.cell_size + half,
        )
    }

    /// Lattice cell containing the point, if it lies in the positive quadrant.
    pub(crate) fn cell_for(&self, point: Vec2) -> Option<CellCoord> {
        let column = (point.x / self.cell_size).floor();
        let row = (point.y / self.cell_size).floor();
        if !(column >= 0.0 && row >= 0.0 && column <= u32::MAX as f32 && row <= u32::MAX as f32) {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Centre of the provided cell in playfield units.
    pub(crate) fn center_of(&self, cell: CellCoord) -> Vec2 {
        let half = self.cell_size * 0.5;
        Vec2::new(
            cell.column() as f32 * self.cell_size + half,
            cell.row() as f32 * self.cell_size + half,
        )
    }

    /// Reports whether `center` is a free legal slot.
    pub(crate) fn is_slot_available(&self, center: Vec2) -> bool {
        self.check(center).is_ok()
    }

    /// Validates that `center` names a legal, unoccupied slot.
    pub(crate) fn check(&self, center: Vec2) -> Result<CellCoord, PlacementError> {
        let cell = self
            .cell_for(center)
            .filter(|cell| self.legal.contains(cell) && self.center_of(*cell) == center)
            .ok_or(PlacementError::IllegalSlot)?;

        if self.occupied.contains_key(&cell) {
            return Err(PlacementError::Occupied);
        }

        Ok(cell)
    }

    /// Marks the slot at `center` as occupied by `emplacement`.
    ///
    /// Nothing is recorded when the slot is illegal or already taken.
    pub(crate) fn place(
        &mut self,
        emplacement: EmplacementId,
        center: Vec2,
    ) -> Result<CellCoord, PlacementError> {
        let cell = self.check(center)?;
        let _ = self.occupied.insert(cell, emplacement);
        Ok(cell)
    }

    /// Frees the slot held by `emplacement`; unknown identifiers are ignored.
    pub(crate) fn remove(&mut self, emplacement: EmplacementId) {
        self.occupied.retain(|_, occupant| *occupant != emplacement);
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<EmplacementId> {
        self.occupied.get(&cell).copied()
    }

    /// Every legal slot in column-major order.
    pub(crate) fn slots(&self) -> Vec<SlotSnapshot> {
        self.legal
            .iter()
            .map(|&cell| SlotSnapshot {
                cell,
                center: self.center_of(cell),
                occupant: self.occupant(cell),
            })
            .collect()
    }
}
