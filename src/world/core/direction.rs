use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One of the six block faces.
///
/// The declaration order is the face numbering used on the wire:
/// `+X, -X, +Y, -Y, +Z, -Z`, so a face and its opposite differ only in the
/// lowest bit of their index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn opposite(self) -> Self {
        Self::ALL[self.index() ^ 1]
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::PosX | Direction::NegX => Axis::X,
            Direction::PosY | Direction::NegY => Axis::Y,
            Direction::PosZ | Direction::NegZ => Axis::Z,
        }
    }

    pub fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }

    pub fn from_axis(axis: Axis, positive: bool) -> Self {
        let base = axis.index() * 2;
        Self::ALL[if positive { base } else { base + 1 }]
    }

    pub fn offset(self) -> Vector3<i32> {
        match self {
            Direction::PosX => Vector3::new(1, 0, 0),
            Direction::NegX => Vector3::new(-1, 0, 0),
            Direction::PosY => Vector3::new(0, 1, 0),
            Direction::NegY => Vector3::new(0, -1, 0),
            Direction::PosZ => Vector3::new(0, 0, 1),
            Direction::NegZ => Vector3::new(0, 0, -1),
        }
    }

    pub fn normal(self) -> Vector3<f32> {
        let offset = self.offset();
        Vector3::new(offset.x as f32, offset.y as f32, offset.z as f32)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::PosX => "+x",
            Direction::NegX => "-x",
            Direction::PosY => "+y",
            Direction::NegY => "-y",
            Direction::PosZ => "+z",
            Direction::NegZ => "-z",
        };
        f.write_str(name)
    }
}

/// Set of faces, one bit per `Direction` index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Directions(u8);

impl Directions {
    pub const NONE: Directions = Directions(0);
    pub const ALL: Directions = Directions(0b11_1111);

    pub fn only(direction: Direction) -> Self {
        Directions(1 << direction.index())
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.index();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !(1 << direction.index());
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    pub fn intersection(self, other: Directions) -> Directions {
        Directions(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Faces in index order
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for Directions {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Directions::NONE;
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

/// Offsets of the 26 cells around a cell: faces, then edges, then corners.
pub const HALO_OFFSETS: [[i32; 3]; 26] = [
    // faces
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    // edges
    [1, 1, 0],
    [1, -1, 0],
    [-1, 1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [1, 0, -1],
    [-1, 0, 1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, 1, -1],
    [0, -1, 1],
    [0, -1, -1],
    // corners
    [1, 1, 1],
    [1, 1, -1],
    [1, -1, 1],
    [1, -1, -1],
    [-1, 1, 1],
    [-1, 1, -1],
    [-1, -1, 1],
    [-1, -1, -1],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_flips_low_bit() {
        for direction in Direction::ALL {
            let opposite = direction.opposite();
            assert_ne!(direction, opposite);
            assert_eq!(opposite.opposite(), direction);
            assert_eq!(direction.offset() + opposite.offset(), Vector3::new(0, 0, 0));
        }
        assert_eq!(Direction::PosY.opposite(), Direction::NegY);
    }

    #[test]
    fn test_from_axis() {
        assert_eq!(Direction::from_axis(Axis::Y, false), Direction::NegY);
        assert_eq!(Direction::from_axis(Axis::Z, true), Direction::PosZ);
        for direction in Direction::ALL {
            assert_eq!(
                Direction::from_axis(direction.axis(), direction.is_positive()),
                direction
            );
        }
    }

    #[test]
    fn test_direction_set() {
        let mut set = Directions::NONE;
        assert!(set.is_empty());
        set.insert(Direction::NegZ);
        set.insert(Direction::PosX);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Direction::PosX, Direction::NegZ]
        );
        set.remove(Direction::PosX);
        assert_eq!(set, Directions::only(Direction::NegZ));
        assert_eq!(Directions::ALL.len(), 6);
        assert_eq!(
            Directions::ALL.intersection(Directions::only(Direction::PosY)),
            Directions::only(Direction::PosY)
        );
    }

    #[test]
    fn test_halo_offsets_unique_and_exclude_center() {
        let mut seen = std::collections::HashSet::new();
        for offset in HALO_OFFSETS {
            assert_ne!(offset, [0, 0, 0]);
            assert!(seen.insert(offset));
        }
        assert_eq!(seen.len(), 26);
    }
}
