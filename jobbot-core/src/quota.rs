use crate::UserRecord;
use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;

/// Searches a free user may run per calendar day.
pub const FREE_DAILY_SEARCHES: u32 = 3;

/// Whether `record` may run another search on `today`.
///
/// Pure: the caller bumps the counter only once the search actually runs.
pub fn may_search(record: &UserRecord, today: NaiveDate) -> bool {
    if record.premium {
        return true;
    }
    !(record.last_search_date == Some(today) && record.searches_today >= FREE_DAILY_SEARCHES)
}

/// Where the quota's calendar day boundary lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaClock {
    /// The host machine's local date.
    HostLocal,
    Zone(Tz),
}

impl QuotaClock {
    pub fn today(&self) -> NaiveDate {
        match self {
            QuotaClock::HostLocal => Local::now().date_naive(),
            QuotaClock::Zone(tz) => Utc::now().with_timezone(tz).date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn free_user(searches_today: u32, last: Option<NaiveDate>) -> UserRecord {
        let mut record = UserRecord::new(1);
        record.searches_today = searches_today;
        record.last_search_date = last;
        record
    }

    #[test]
    fn test_new_user_may_search() {
        assert!(may_search(&UserRecord::new(1), day(10)));
    }

    #[test]
    fn test_free_user_blocked_at_limit_same_day() {
        assert!(may_search(&free_user(2, Some(day(10))), day(10)));
        assert!(!may_search(&free_user(3, Some(day(10))), day(10)));
        assert!(!may_search(&free_user(7, Some(day(10))), day(10)));
    }

    #[test]
    fn test_counter_from_previous_day_does_not_block() {
        assert!(may_search(&free_user(3, Some(day(9))), day(10)));
        assert!(may_search(&free_user(50, Some(day(9))), day(10)));
    }

    #[test]
    fn test_premium_always_allowed() {
        let mut record = free_user(99, Some(day(10)));
        record.premium = true;
        assert!(may_search(&record, day(10)));
    }

    #[test]
    fn test_zone_clock_reports_a_date() {
        let clock = QuotaClock::Zone(chrono_tz::Asia::Kolkata);
        let today = clock.today();
        let utc_today = Utc::now().date_naive();
        let diff = (today - utc_today).num_days().abs();
        assert!(diff <= 1);
    }
}
