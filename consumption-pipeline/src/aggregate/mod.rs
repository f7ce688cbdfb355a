use std::{
    collections::{hash_map::Entry, BTreeMap, HashMap},
    fmt,
    str::FromStr,
};

use consumption_model::{Measurement, RawDataset, TimeVector};
use time::{Date, Month, PrimitiveDateTime, Time};

use crate::pipeline::PipelineError;

pub mod rescale;

pub use rescale::UnitPolicy;

/// Temporal granularity of an aggregated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(into = "&'static str")]
pub enum Period {
    #[default]
    Minute,
    Hour,
    Day,
    Month,
    HourOfDay,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Minute,
        Period::Hour,
        Period::Day,
        Period::Month,
        Period::HourOfDay,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Period::Minute => "minute",
            Period::Hour => "hour",
            Period::Day => "day",
            Period::Month => "month",
            Period::HourOfDay => "hour of the day",
        }
    }

    /// Button-style label, e.g. "Hourly".
    pub const fn label(self) -> &'static str {
        match self {
            Period::Minute => "Minutely",
            Period::Hour => "Hourly",
            Period::Day => "Daily",
            Period::Month => "Monthly",
            Period::HourOfDay => "Hour-of-day",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Period> for &'static str {
    fn from(period: Period) -> Self {
        period.as_str()
    }
}

impl FromStr for Period {
    type Err = PipelineError;

    /// Accepts the period name or its label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| s.eq_ignore_ascii_case(p.as_str()) || s.eq_ignore_ascii_case(p.label()))
            .ok_or_else(|| PipelineError::InvalidPeriod(s.to_string()))
    }
}

/// Representative time of one view row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMarker {
    Calendar(TimeVector),
    Hour(u8),
}

impl TimeMarker {
    /// Chart axis position. Hour-of-day markers sit on 1900-01-01.
    pub fn to_datetime(&self) -> Result<PrimitiveDateTime, time::error::ComponentRange> {
        match self {
            TimeMarker::Calendar(tv) => tv.to_datetime(),
            TimeMarker::Hour(hour) => {
                let date = Date::from_calendar_date(1900, Month::January, 1)?;
                Ok(PrimitiveDateTime::new(date, Time::from_hms(*hour, 0, 0)?))
            }
        }
    }
}

impl fmt::Display for TimeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeMarker::Calendar(tv) => write!(f, "{tv}"),
            TimeMarker::Hour(hour) => write!(f, "{hour:02}:00"),
        }
    }
}

/// Time column of a view: full time vectors, or bare hours for hour-of-day.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeColumn {
    Calendar(Vec<TimeVector>),
    HourOfDay(Vec<u8>),
}

impl TimeColumn {
    pub fn len(&self) -> usize {
        match self {
            TimeColumn::Calendar(v) => v.len(),
            TimeColumn::HourOfDay(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn marker(&self, idx: usize) -> Option<TimeMarker> {
        match self {
            TimeColumn::Calendar(v) => v.get(idx).copied().map(TimeMarker::Calendar),
            TimeColumn::HourOfDay(v) => v.get(idx).copied().map(TimeMarker::Hour),
        }
    }
}

/// Re-binned time column and measurement table, row-aligned.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AggregatedView {
    pub period: Period,
    pub time: TimeColumn,
    pub measurements: Vec<Measurement>,
}

impl AggregatedView {
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (TimeMarker, &Measurement)> + '_ {
        self.measurements
            .iter()
            .enumerate()
            .filter_map(|(idx, m)| self.time.marker(idx).map(|t| (t, m)))
    }

    /// Per-row sum of all zones.
    pub fn zone_totals(&self) -> Vec<f64> {
        self.measurements.iter().map(Measurement::total).collect()
    }
}

/// Derive a view from the raw (minute) dataset.
///
/// Calendar periods sum each zone per bin and keep the first time vector seen
/// in the bin; bins appear in the order they are first met. Hour-of-day
/// averages each zone per hour and is ordered by hour.
pub fn aggregate(raw: &RawDataset, period: Period) -> AggregatedView {
    let view = match period {
        Period::Minute => AggregatedView {
            period,
            time: TimeColumn::Calendar(raw.time_vectors().to_vec()),
            measurements: raw.measurements().to_vec(),
        },
        Period::Hour | Period::Day | Period::Month => sum_by_calendar(raw, period),
        Period::HourOfDay => mean_by_hour(raw),
    };
    tracing::debug!(period = %period, raw_rows = raw.len(), rows = view.len(), "aggregated measurements");
    view
}

type CalendarKey = (i32, u8, u8, u8);

fn calendar_key(period: Period, tv: &TimeVector) -> CalendarKey {
    match period {
        Period::Hour => (tv.year, tv.month, tv.day, tv.hour),
        Period::Day => (tv.year, tv.month, tv.day, 0),
        _ => (tv.year, tv.month, 0, 0),
    }
}

fn sum_by_calendar(raw: &RawDataset, period: Period) -> AggregatedView {
    let mut bins: HashMap<CalendarKey, usize> = HashMap::new();
    let mut time = Vec::new();
    let mut sums: Vec<Measurement> = Vec::new();

    for (tv, m) in raw.rows() {
        match bins.entry(calendar_key(period, tv)) {
            Entry::Occupied(bin) => sums[*bin.get()] += *m,
            Entry::Vacant(bin) => {
                bin.insert(sums.len());
                time.push(*tv);
                sums.push(*m);
            }
        }
    }

    AggregatedView {
        period,
        time: TimeColumn::Calendar(time),
        measurements: sums,
    }
}

fn mean_by_hour(raw: &RawDataset) -> AggregatedView {
    let mut hours: BTreeMap<u8, (Measurement, usize)> = BTreeMap::new();
    for (tv, m) in raw.rows() {
        let (sum, count) = hours.entry(tv.hour).or_default();
        *sum += *m;
        *count += 1;
    }

    let (time, measurements) = hours
        .into_iter()
        .map(|(hour, (sum, count))| (hour, sum.map(|v| v / count as f64)))
        .unzip();

    AggregatedView {
        period: Period::HourOfDay,
        time: TimeColumn::HourOfDay(time),
        measurements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(y: i32, mo: u8, d: u8, h: u8, mi: u8, z: [f64; 4]) -> (TimeVector, Measurement) {
        (TimeVector::new(y, mo, d, h, mi, 0), Measurement::from_zones(z))
    }

    /// Two days of hourly-sampled data across a month boundary.
    fn two_months() -> RawDataset {
        let mut rows = Vec::new();
        for (mo, d) in [(1u8, 31u8), (2, 1)] {
            for h in 0..24u8 {
                for mi in [0u8, 30] {
                    let v = f64::from(h) + f64::from(mi) / 30.0;
                    rows.push(row(2008, mo, d, h, mi, [v, 2.0 * v, 1.0, f64::from(mo)]));
                }
            }
        }
        rows.into_iter().collect()
    }

    #[test]
    fn parses_period_names_and_labels() {
        assert_eq!("Hour of the day".parse::<Period>().ok(), Some(Period::HourOfDay));
        assert_eq!("MONTH".parse::<Period>().ok(), Some(Period::Month));
        assert_eq!("Hourly".parse::<Period>().ok(), Some(Period::Hour));
        assert!(matches!("week".parse::<Period>(), Err(PipelineError::InvalidPeriod(_))));
    }

    #[test]
    fn minute_is_identity() {
        let raw = two_months();
        let view = aggregate(&raw, Period::Minute);
        assert_eq!(view.len(), raw.len());
        assert_eq!(view.measurements, raw.measurements());
        assert_eq!(view.time, TimeColumn::Calendar(raw.time_vectors().to_vec()));
    }

    #[test]
    fn sixty_minutes_sum_into_one_hour() {
        let raw: RawDataset = (0..60u8).map(|mi| row(2008, 1, 1, 0, mi, [10.0, 20.0, 30.0, 40.0])).collect();

        let hourly = aggregate(&raw, Period::Hour);
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly.measurements[0], Measurement::new(600.0, 1200.0, 1800.0, 2400.0));
        assert_eq!(hourly.time.marker(0), Some(TimeMarker::Calendar(TimeVector::new(2008, 1, 1, 0, 0, 0))));

        let profile = aggregate(&raw, Period::HourOfDay);
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.measurements[0], Measurement::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(profile.time, TimeColumn::HourOfDay(vec![0]));
    }

    #[test]
    fn calendar_bins_keep_first_time_vector_and_first_seen_order() {
        let raw: RawDataset = vec![
            row(2008, 2, 1, 5, 10, [1.0; 4]),
            row(2008, 1, 31, 7, 0, [2.0; 4]),
            row(2008, 2, 1, 6, 0, [3.0; 4]),
        ]
        .into_iter()
        .collect();

        let daily = aggregate(&raw, Period::Day);
        assert_eq!(
            daily.time,
            TimeColumn::Calendar(vec![
                TimeVector::new(2008, 2, 1, 5, 10, 0),
                TimeVector::new(2008, 1, 31, 7, 0, 0),
            ])
        );
        assert_eq!(daily.measurements[0].zone1, 4.0);
        assert_eq!(daily.measurements[1].zone1, 2.0);
    }

    #[test]
    fn month_totals_match_raw_rows_in_that_month() {
        let raw = two_months();
        let monthly = aggregate(&raw, Period::Month);
        assert_eq!(monthly.len(), 2);

        for (marker, m) in monthly.rows() {
            let TimeMarker::Calendar(tv) = marker else {
                panic!("calendar marker expected");
            };
            let expected: f64 = raw
                .rows()
                .filter(|(t, _)| t.year == tv.year && t.month == tv.month)
                .map(|(_, m)| m.total())
                .sum();
            assert!((m.total() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn day_and_month_bins_do_not_overlap() {
        let raw = two_months();
        let daily = aggregate(&raw, Period::Day);
        let hourly = aggregate(&raw, Period::Hour);
        assert_eq!(daily.len(), 2);
        assert_eq!(hourly.len(), 48);
        let raw_total: f64 = raw.measurements().iter().map(Measurement::total).sum();
        let hourly_total: f64 = hourly.zone_totals().iter().sum();
        assert!((raw_total - hourly_total).abs() < 1e-9);
    }

    #[test]
    fn hour_of_day_averages_into_24_sorted_buckets() {
        let raw = two_months();
        let profile = aggregate(&raw, Period::HourOfDay);
        assert_eq!(profile.len(), 24);
        assert_eq!(profile.time, TimeColumn::HourOfDay((0..24).collect()));
        // hour 3: samples 3.0 and 4.0 on both days; zone4 is 1 in January and 2 in February
        assert_eq!(profile.measurements[3], Measurement::new(3.5, 7.0, 1.0, 1.5));
    }

    #[test]
    fn aggregating_from_raw_is_path_independent() {
        let raw = two_months();
        let direct = aggregate(&raw, Period::Month);
        let _ = aggregate(&raw, Period::Day);
        let _ = aggregate(&raw, Period::HourOfDay);
        assert_eq!(aggregate(&raw, Period::Month), direct);
    }

    #[test]
    fn empty_dataset_aggregates_to_empty_view() {
        let raw = RawDataset::default();
        for period in Period::ALL {
            let view = aggregate(&raw, period);
            assert!(view.is_empty());
            assert_eq!(view.time.len(), 0);
        }
    }

    #[test]
    fn markers_format_for_axes() {
        assert_eq!(TimeMarker::Hour(7).to_string(), "07:00");
        let axis = TimeMarker::Hour(7).to_datetime().expect("valid hour");
        assert_eq!(axis.hour(), 7);
    }
}
