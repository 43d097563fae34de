use serde::{Deserialize, Serialize};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Simulated seconds since midnight of day 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SimTimestamp(pub u64);

impl SimTimestamp {
    /// Timestamp of `tick` for a session that starts at `start_hour` and
    /// advances `tick_interval_secs` per tick.
    pub fn for_tick(start_hour: f32, tick_interval_secs: u32, tick: u64) -> Self {
        let start = (start_hour.clamp(0.0, 23.999) * 3600.0) as u64;
        Self(start + tick * u64::from(tick_interval_secs))
    }

    pub fn day(&self) -> u64 {
        self.0 / SECS_PER_DAY + 1
    }

    pub fn hour_of_day(&self) -> u32 {
        ((self.0 % SECS_PER_DAY) / 3600) as u32
    }

    /// Seconds elapsed since `earlier`, zero if `earlier` is later.
    pub fn secs_since(&self, earlier: SimTimestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn time_bucket(&self) -> TimeBucket {
        TimeBucket::from_hour(self.hour_of_day())
    }

    pub fn formatted(&self) -> String {
        let secs = self.0 % SECS_PER_DAY;
        format!(
            "Day {} {:02}:{:02}:{:02}",
            self.day(),
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

/// Coarse time-of-day band used as a classifier feature and as the demand
/// multiplier for synthetic streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    Night,
    MorningPeak,
    Midday,
    EveningPeak,
    Evening,
}

impl TimeBucket {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            7..=9 => TimeBucket::MorningPeak,
            10..=15 => TimeBucket::Midday,
            16..=18 => TimeBucket::EveningPeak,
            19..=22 => TimeBucket::Evening,
            _ => TimeBucket::Night,
        }
    }

    pub fn is_peak(&self) -> bool {
        matches!(self, TimeBucket::MorningPeak | TimeBucket::EveningPeak)
    }

    /// Scale applied to synthetic base flows.
    pub fn demand_multiplier(&self) -> f32 {
        match self {
            TimeBucket::Night => 0.4,
            TimeBucket::MorningPeak => 1.25,
            TimeBucket::Midday => 0.9,
            TimeBucket::EveningPeak => 1.2,
            TimeBucket::Evening => 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_advances_by_interval() {
        let t0 = SimTimestamp::for_tick(7.0, 5, 0);
        let t3 = SimTimestamp::for_tick(7.0, 5, 3);
        assert_eq!(t0.0, 7 * 3600);
        assert_eq!(t3.secs_since(t0), 15);
        assert_eq!(t0.secs_since(t3), 0);
    }

    #[test]
    fn test_timestamp_wraps_to_next_day() {
        let t = SimTimestamp::for_tick(23.5, 60, 45);
        assert_eq!(t.day(), 2);
        assert_eq!(t.hour_of_day(), 0);
    }

    #[test]
    fn test_formatted() {
        let t = SimTimestamp(7 * 3600 + 5 * 60 + 9);
        assert_eq!(t.formatted(), "Day 1 07:05:09");
    }

    #[test]
    fn test_buckets() {
        assert_eq!(TimeBucket::from_hour(3), TimeBucket::Night);
        assert_eq!(TimeBucket::from_hour(8), TimeBucket::MorningPeak);
        assert_eq!(TimeBucket::from_hour(12), TimeBucket::Midday);
        assert_eq!(TimeBucket::from_hour(17), TimeBucket::EveningPeak);
        assert_eq!(TimeBucket::from_hour(21), TimeBucket::Evening);
        assert_eq!(TimeBucket::from_hour(23), TimeBucket::Night);
        assert!(TimeBucket::MorningPeak.is_peak());
        assert!(!TimeBucket::Midday.is_peak());
    }

    #[test]
    fn test_peak_multipliers_exceed_offpeak() {
        assert!(TimeBucket::MorningPeak.demand_multiplier() > TimeBucket::Midday.demand_multiplier());
        assert!(TimeBucket::EveningPeak.demand_multiplier() > TimeBucket::Night.demand_multiplier());
    }
}
