use time::OffsetDateTime;

pub(crate) fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Absolute gap between two instants in whole minutes.
pub(crate) fn minutes_between(a: OffsetDateTime, b: OffsetDateTime) -> i64 {
    (a - b).whole_minutes().abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, PrimitiveDateTime, Time};

    fn at(hour: u8, minute: u8) -> OffsetDateTime {
        let date = Date::from_calendar_date(2025, time::Month::January, 2).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, 0).unwrap()).assume_utc()
    }

    #[test]
    fn minutes_between_is_symmetric() {
        let earlier = at(10, 0);
        let later = at(10, 4);
        assert_eq!(minutes_between(earlier, later), 4);
        assert_eq!(minutes_between(later, earlier), 4);
    }

    #[test]
    fn minutes_between_truncates_seconds() {
        let earlier = at(10, 0);
        let later = at(10, 4) + Duration::seconds(59);
        assert_eq!(minutes_between(earlier, later), 4);
    }
}
