//! Core types for the signal simulation
//!
//! Identifiers, compass directions and movements. These are plain values with no
//! behaviour beyond the direction algebra and turn classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::SimError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// A wrapper type for vehicle IDs
    VehicleId
);
string_id!(
    /// A wrapper type for lane IDs
    LaneId
);
string_id!(
    /// A wrapper type for signal group IDs
    SignalGroupId
);

/// Number of ticks a vehicle spends on the intersection once admitted
pub const CROSSING_TIME: u32 = 1;

/// One of the four approaches of the intersection
///
/// Serialized as its lowercase name; parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn counter_clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
        }
    }

    /// Lowercase name, as used in lane and signal group naming
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnknownDirection(s.to_string()))
    }
}

impl TryFrom<String> for Direction {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for &'static str {
    fn from(direction: Direction) -> Self {
        direction.name()
    }
}

/// Classification of a movement relative to its approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnType {
    Straight,
    Left,
    Right,
    UTurn,
}

impl TurnType {
    /// Rank used to order admission candidates within a tick; lower goes first.
    ///
    /// Straight traffic is admitted before right turns, right turns before left
    /// turns, and U-turns last.
    pub fn admission_priority(self) -> u8 {
        match self {
            TurnType::Straight => 0,
            TurnType::Right => 1,
            TurnType::Left => 2,
            TurnType::UTurn => 3,
        }
    }
}

/// Turn produced by heading to the direction clockwise of the approach.
/// Traffic drives on the right, so entering from the south and leaving west is a left.
pub const CLOCKWISE_TURN: TurnType = TurnType::Left;
/// Turn produced by heading to the direction counter-clockwise of the approach
pub const COUNTER_CLOCKWISE_TURN: TurnType = TurnType::Right;

/// A directed maneuver from an approach to a destination direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Movement {
    pub from: Direction,
    pub to: Direction,
}

impl Movement {
    pub fn new(from: Direction, to: Direction) -> Self {
        Self { from, to }
    }

    pub fn turn_type(&self) -> TurnType {
        if self.to == self.from {
            TurnType::UTurn
        } else if self.to == self.from.opposite() {
            TurnType::Straight
        } else if self.to == self.from.clockwise() {
            CLOCKWISE_TURN
        } else {
            COUNTER_CLOCKWISE_TURN
        }
    }

    /// Every movement out of one approach, including the U-turn
    pub fn all_from(from: Direction) -> impl Iterator<Item = Movement> {
        Direction::ALL.into_iter().map(move |to| Movement::new(from, to))
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_functions_partition_other_directions() {
        for d in Direction::ALL {
            let mut others = vec![d.opposite(), d.clockwise(), d.counter_clockwise()];
            others.sort();
            let mut expected: Vec<Direction> =
                Direction::ALL.into_iter().filter(|o| *o != d).collect();
            expected.sort();
            assert_eq!(others, expected, "direction {d}");
        }
    }

    #[test]
    fn test_turn_types() {
        for from in Direction::ALL {
            assert_eq!(Movement::new(from, from).turn_type(), TurnType::UTurn);
            assert_eq!(
                Movement::new(from, from.opposite()).turn_type(),
                TurnType::Straight
            );
            assert_eq!(
                Movement::new(from, from.clockwise()).turn_type(),
                TurnType::Left
            );
            assert_eq!(
                Movement::new(from, from.counter_clockwise()).turn_type(),
                TurnType::Right
            );
        }
        // Coming from the south, heading east is a right turn
        assert_eq!(
            Movement::new(Direction::South, Direction::East).turn_type(),
            TurnType::Right
        );
    }

    #[test]
    fn test_direction_parsing_is_case_insensitive() {
        assert_eq!("south".parse::<Direction>().unwrap(), Direction::South);
        assert_eq!("NORTH".parse::<Direction>().unwrap(), Direction::North);
        assert!(matches!(
            "diagonal".parse::<Direction>(),
            Err(SimError::UnknownDirection(_))
        ));
    }

    #[test]
    fn test_admission_priority_is_total() {
        let mut ranks: Vec<u8> = [
            TurnType::Straight,
            TurnType::Left,
            TurnType::Right,
            TurnType::UTurn,
        ]
        .into_iter()
        .map(TurnType::admission_priority)
        .collect();
        ranks.sort();
        ranks.dedup();
        assert_eq!(ranks.len(), 4);
    }
}
