use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Workload size selected by the positional command line argument.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Variant {
    /// Only compile and instantiate, nothing is run.
    CompileOnly,
    Smallest,
    Smaller,
    #[default]
    Default,
    Larger,
    Largest,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::CompileOnly,
        Variant::Smallest,
        Variant::Smaller,
        Variant::Default,
        Variant::Larger,
        Variant::Largest,
    ];

    /// Offset applied to a workload's base size, in multiples of its step.
    pub fn delta(self) -> Option<i32> {
        match self {
            Variant::CompileOnly => None,
            Variant::Smallest => Some(-5),
            Variant::Smaller => Some(-3),
            Variant::Default => Some(0),
            Variant::Larger => Some(3),
            Variant::Largest => Some(5),
        }
    }

    /// The argument size for a workload, or `None` if nothing should run.
    pub fn size(self, base: i32, step: i32) -> Option<i32> {
        self.delta().map(|d| base + d * step)
    }

    pub fn index(self) -> u8 {
        match self {
            Variant::CompileOnly => 0,
            Variant::Smallest => 1,
            Variant::Smaller => 2,
            Variant::Default => 3,
            Variant::Larger => 4,
            Variant::Largest => 5,
        }
    }
}

impl TryFrom<u8> for Variant {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Variant::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("unknown variant {value}, expected 0-5"))
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s
            .parse::<u8>()
            .map_err(|_| format!("variant must be a number between 0 and 5: '{s}'"))?;
        Variant::try_from(index)
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}
