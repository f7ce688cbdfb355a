use std::fmt;

use time::{Date, Month, PrimitiveDateTime, Time};

/// Calendar position of one sample, exactly as it appears in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeVector {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeVector {
    pub const fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Timestamp for chart axes.
    ///
    /// Fails when the fields do not name a real calendar instant (e.g. month 13).
    pub fn to_datetime(&self) -> Result<PrimitiveDateTime, time::error::ComponentRange> {
        let month = Month::try_from(self.month)?;
        let date = Date::from_calendar_date(self.year, month, self.day)?;
        let time = Time::from_hms(self.hour, self.minute, self.second)?;
        Ok(PrimitiveDateTime::new(date, time))
    }
}

impl fmt::Display for TimeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn converts_to_calendar_timestamp() {
        let tv = TimeVector::new(2008, 12, 31, 23, 59, 0);
        assert_eq!(tv.to_datetime().ok(), Some(datetime!(2008-12-31 23:59:00)));
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(TimeVector::new(2008, 13, 1, 0, 0, 0).to_datetime().is_err());
        assert!(TimeVector::new(2009, 2, 29, 0, 0, 0).to_datetime().is_err());
        assert!(TimeVector::new(2008, 1, 1, 24, 0, 0).to_datetime().is_err());
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(TimeVector::new(2008, 1, 2, 3, 4, 5).to_string(), "2008-01-02 03:04:05");
    }
}
