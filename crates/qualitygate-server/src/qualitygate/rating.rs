use std::fmt;

/// Rating grid shared by every `RATING` metric.
///
/// Stored values are the rating index, so `A` is persisted as `"1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    A = 1,
    B = 2,
    C = 3,
    D = 4,
    E = 5,
}

impl Rating {
    /// Worst rating; a "greater than" condition on it can never fail.
    pub const WORST: Rating = Rating::E;

    #[must_use]
    pub const fn index(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(Self::A),
            2 => Some(Self::B),
            3 => Some(Self::C),
            4 => Some(Self::D),
            5 => Some(Self::E),
            _ => None,
        }
    }

    /// Parses a stored threshold value such as `"1"`.
    #[must_use]
    pub fn from_threshold(value: &str) -> Option<Self> {
        value.trim().parse::<i64>().ok().and_then(Self::from_index)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        };
        f.write_str(letter)
    }
}
