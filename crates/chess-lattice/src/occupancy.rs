use crate::lattice::{CellIndex, CellLookup, Lattice, BOARD_CELLS};
use nalgebra::Point2;
use serde::Serialize;

const N: usize = BOARD_CELLS as usize;

/// Anchor point of a detection box: bottom-center, where a piece touches
/// its square.
pub fn anchor_from_box(xmin: f32, _ymin: f32, xmax: f32, ymax: f32) -> Point2<f32> {
    Point2::new((xmin + xmax) / 2.0, ymax)
}

/// 8×8 board of optional labels addressed by [`CellIndex`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardOccupancy<T> {
    cells: [[Option<T>; N]; N],
}

impl<T> Default for BoardOccupancy<T> {
    fn default() -> Self {
        Self {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| None)),
        }
    }
}

impl<T> BoardOccupancy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `anchor` on `lattice` and store `label` in the resulting cell,
    /// replacing any previous occupant. Returns the lookup so callers can
    /// check [`CellLookup::is_fallback`].
    pub fn place(&mut self, lattice: &Lattice, anchor: Point2<f32>, label: T) -> CellLookup {
        let lookup = lattice.lookup(anchor);
        self.set(lookup.cell, label);
        lookup
    }

    pub fn set(&mut self, cell: CellIndex, label: T) -> Option<T> {
        self.slot_mut(cell)?.replace(label)
    }

    pub fn get(&self, cell: CellIndex) -> Option<&T> {
        let (f, r) = Self::offsets(cell)?;
        self.cells[f][r].as_ref()
    }

    pub fn clear(&mut self, cell: CellIndex) -> Option<T> {
        self.slot_mut(cell)?.take()
    }

    /// Occupied cells in file-major order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (CellIndex, &T)> + '_ {
        self.cells.iter().enumerate().flat_map(|(f, row)| {
            row.iter().enumerate().filter_map(move |(r, slot)| {
                slot.as_ref().map(|label| {
                    (
                        CellIndex {
                            file: f as u8 + 1,
                            rank: r as u8 + 1,
                        },
                        label,
                    )
                })
            })
        })
    }

    pub fn occupied(&self) -> usize {
        self.iter_occupied().count()
    }

    fn offsets(cell: CellIndex) -> Option<(usize, usize)> {
        let valid = CellIndex::new(cell.file, cell.rank)?;
        Some((valid.file as usize - 1, valid.rank as usize - 1))
    }

    fn slot_mut(&mut self, cell: CellIndex) -> Option<&mut Option<T>> {
        let (f, r) = Self::offsets(cell)?;
        Some(&mut self.cells[f][r])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LatticeParams;

    fn unit_lattice() -> Lattice {
        let pts: Vec<_> = (0..81)
            .map(|i| Point2::new((i % 9) as f32 * 10.0, (i / 9) as f32 * 10.0))
            .collect();
        Lattice::build(&pts, &LatticeParams::default())
    }

    #[test]
    fn anchor_is_bottom_center() {
        assert_eq!(Point2::new(15.0, 40.0), anchor_from_box(10.0, 5.0, 20.0, 40.0));
    }

    #[test]
    fn place_maps_detection_to_cell() {
        let lattice = unit_lattice();
        let mut board = BoardOccupancy::new();

        let anchor = anchor_from_box(30.0, 0.0, 40.0, 25.0);
        let hit = board.place(&lattice, anchor, "knight");
        assert!(!hit.is_fallback());
        assert_eq!(CellIndex { file: 3, rank: 4 }, hit.cell);
        assert_eq!(Some(&"knight"), board.get(hit.cell));

        board.place(&lattice, anchor, "bishop");
        assert_eq!(Some(&"bishop"), board.get(hit.cell));
        assert_eq!(1, board.occupied());
    }

    #[test]
    fn iterates_in_file_major_order() {
        let mut board = BoardOccupancy::new();
        board.set(CellIndex { file: 2, rank: 1 }, 'b');
        board.set(CellIndex { file: 1, rank: 8 }, 'a');
        let cells: Vec<_> = board.iter_occupied().map(|(c, &l)| (c.file, c.rank, l)).collect();
        assert_eq!(vec![(1, 8, 'a'), (2, 1, 'b')], cells);

        assert_eq!(None, board.set(CellIndex { file: 9, rank: 1 }, 'x'));
        assert_eq!(Some('a'), board.clear(CellIndex { file: 1, rank: 8 }));
    }
}
