use std::fmt;

/// Registry age bracket (`StdAge` field values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Child,
    Adult,
    OlderAdult,
}

impl AgeGroup {
    /// Maps an age in years to its bracket: up to 17 is a child, 18 to 64 an
    /// adult, 65 and over an older adult.
    pub fn classify(age: u32) -> Self {
        match age {
            0..=17 => Self::Child,
            18..=64 => Self::Adult,
            _ => Self::OlderAdult,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "CHILD",
            Self::Adult => "ADULT",
            Self::OlderAdult => "OLDER_ADULT",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
