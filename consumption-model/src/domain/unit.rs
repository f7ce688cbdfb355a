use std::fmt;

/// Energy unit of a rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    #[default]
    WattHour,
    KilowattHour,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::WattHour => f.write_str("Watt-hour"),
            Unit::KilowattHour => f.write_str("Kilowatt-hour"),
        }
    }
}
