use std::{
    fmt,
    ops::{Add, AddAssign},
};

/// One of the four sub-metered channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Zone {
    One,
    Two,
    Three,
    Four,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::One, Zone::Two, Zone::Three, Zone::Four];

    /// 1-based zone number as printed in tables.
    pub const fn number(self) -> u8 {
        match self {
            Zone::One => 1,
            Zone::Two => 2,
            Zone::Three => 3,
            Zone::Four => 4,
        }
    }

    const fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Power readings for the four zones of one sample (or one aggregated bin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub zone1: f64,
    pub zone2: f64,
    pub zone3: f64,
    pub zone4: f64,
}

impl Measurement {
    pub const fn new(zone1: f64, zone2: f64, zone3: f64, zone4: f64) -> Self {
        Self {
            zone1,
            zone2,
            zone3,
            zone4,
        }
    }

    pub const fn from_zones(zones: [f64; 4]) -> Self {
        Self::new(zones[0], zones[1], zones[2], zones[3])
    }

    pub const fn zones(&self) -> [f64; 4] {
        [self.zone1, self.zone2, self.zone3, self.zone4]
    }

    pub const fn get(&self, zone: Zone) -> f64 {
        self.zones()[zone.index()]
    }

    /// Sum over all zones ("All zones" series).
    pub fn total(&self) -> f64 {
        self.zones().iter().sum()
    }

    /// Largest single zone value.
    pub fn peak(&self) -> f64 {
        self.zones().into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_zones(self.zones().map(f))
    }
}

impl Add for Measurement {
    type Output = Measurement;

    fn add(self, rhs: Measurement) -> Measurement {
        Measurement::new(
            self.zone1 + rhs.zone1,
            self.zone2 + rhs.zone2,
            self.zone3 + rhs.zone3,
            self.zone4 + rhs.zone4,
        )
    }
}

impl AddAssign for Measurement {
    fn add_assign(&mut self, rhs: Measurement) {
        *self = *self + rhs;
    }
}
