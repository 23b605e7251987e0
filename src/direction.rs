//! The six cardinal/vertical directions shared by lighting and meshing.

/// One of the six face/BFS-step directions. Order matches face emission
/// order in the mesher (`+Y,-Y,+X,-X,+Z,-Z`), top first since most culling
/// decisions resolve there (sky exposure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    East,
    West,
    South,
    North,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Unit offset `(dx, dy, dz)` for a single step in this direction.
    #[inline]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::South => (0, 0, 1),
            Direction::North => (0, 0, -1),
        }
    }

    #[inline]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }
}
