//! Compass directions of travel on the city map

/// All possible directions a car can travel on a city map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Northbound,
    Eastbound,
    Southbound,
    Westbound,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Northbound,
        Direction::Eastbound,
        Direction::Southbound,
        Direction::Westbound,
    ];

    /// The direction after a quarter turn to the left.
    pub fn turn_left(self) -> Direction {
        match self {
            Direction::Northbound => Direction::Westbound,
            Direction::Westbound => Direction::Southbound,
            Direction::Southbound => Direction::Eastbound,
            Direction::Eastbound => Direction::Northbound,
        }
    }

    pub fn turn_right(self) -> Direction {
        self.opposite().turn_left()
    }

    pub fn opposite(self) -> Direction {
        self.turn_left().turn_left()
    }

    /// Stable slot of this direction in per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Northbound => 0,
            Direction::Eastbound => 1,
            Direction::Southbound => 2,
            Direction::Westbound => 3,
        }
    }
}

/// A set of directions, e.g. the directions a car blocks for other cars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self(0b1111)
    }

    pub fn single(direction: Direction) -> Self {
        let mut set = Self::empty();
        set.insert(direction);
        set
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.index();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !(1 << direction.index());
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: DirectionSet) -> DirectionSet {
        DirectionSet(self.0 | other.0)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}
