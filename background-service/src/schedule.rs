use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A fixed wall-clock time in a fixed timezone, once per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySchedule {
    pub time: NaiveTime,
    pub timezone: Tz,
}

impl DailySchedule {
    pub fn new(time: NaiveTime, timezone: Tz) -> Self {
        Self { time, timezone }
    }

    /// The first trigger strictly after `now`.
    pub fn next_trigger_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut date = now.with_timezone(&self.timezone).date_naive();
        loop {
            if let Some(at) = self.trigger_on(date) {
                if at > now {
                    return at;
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => return now,
            }
        }
    }

    fn trigger_on(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let local = date.and_time(self.time);
        match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(at) => Some(at.with_timezone(&Utc)),
            // Repeated hour: fire on the first pass only.
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            // Skipped hour: fire once the clocks have jumped.
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
                .map(|at| at.with_timezone(&Utc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn nine_am(tz: Tz) -> DailySchedule {
        DailySchedule::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), tz)
    }

    #[test]
    fn test_later_today() {
        let schedule = nine_am(chrono_tz::UTC);
        assert_eq!(
            schedule.next_trigger_after(utc(2024, 5, 1, 7, 30)),
            utc(2024, 5, 1, 9, 0)
        );
    }

    #[test]
    fn test_exactly_on_trigger_moves_to_tomorrow() {
        let schedule = nine_am(chrono_tz::UTC);
        assert_eq!(
            schedule.next_trigger_after(utc(2024, 5, 1, 9, 0)),
            utc(2024, 5, 2, 9, 0)
        );
    }

    #[test]
    fn test_non_utc_zone() {
        let schedule = nine_am(chrono_tz::Asia::Kolkata);
        // 07:30 IST
        assert_eq!(
            schedule.next_trigger_after(utc(2024, 5, 1, 2, 0)),
            utc(2024, 5, 1, 3, 30)
        );
        // 09:30 IST
        assert_eq!(
            schedule.next_trigger_after(utc(2024, 5, 1, 4, 0)),
            utc(2024, 5, 2, 3, 30)
        );
    }

    #[test]
    fn test_local_date_differs_from_utc_date() {
        let schedule = nine_am(chrono_tz::Asia::Kolkata);
        // 2024-05-01 20:00 UTC is already 2024-05-02 01:30 IST
        assert_eq!(
            schedule.next_trigger_after(utc(2024, 5, 1, 20, 0)),
            utc(2024, 5, 2, 3, 30)
        );
    }

    #[test]
    fn test_skipped_hour_fires_after_jump() {
        let schedule = DailySchedule::new(
            NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
            chrono_tz::Europe::London,
        );
        // 01:30 does not exist in London on 2024-03-31; 02:30 BST is 01:30 UTC.
        assert_eq!(
            schedule.next_trigger_after(utc(2024, 3, 30, 12, 0)),
            utc(2024, 3, 31, 1, 30)
        );
    }

    #[test]
    fn test_repeated_hour_fires_once() {
        let schedule = DailySchedule::new(
            NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
            chrono_tz::Europe::London,
        );
        // 01:30 happens twice on 2024-10-27; the BST pass is 00:30 UTC.
        let first = schedule.next_trigger_after(utc(2024, 10, 26, 12, 0));
        assert_eq!(first, utc(2024, 10, 27, 0, 30));
        assert_eq!(
            schedule.next_trigger_after(first),
            utc(2024, 10, 28, 1, 30)
        );
    }
}
