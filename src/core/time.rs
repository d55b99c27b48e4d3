use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

pub(crate) const DATE_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

pub(crate) fn format_date(value: Date) -> String {
    value.format(&DATE_FORMAT).unwrap_or_else(|_| value.to_string())
}

pub(crate) fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Whole minutes between two instants, clamped at zero.
pub(crate) fn minutes_between(start: PrimitiveDateTime, end: PrimitiveDateTime) -> i32 {
    let seconds = (end.assume_utc() - start.assume_utc()).whole_seconds();
    (seconds.max(0) / 60) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Time};

    fn at(hour: u8, minute: u8, second: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2026, time::Month::March, 5).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(at(10, 20, 30)), "2026-03-05T10:20:30Z");
    }

    #[test]
    fn format_date_is_iso() {
        let date = Date::from_calendar_date(2026, time::Month::March, 5).unwrap();
        assert_eq!(format_date(date), "2026-03-05");
    }

    #[test]
    fn minutes_between_truncates_to_whole_minutes() {
        assert_eq!(minutes_between(at(10, 0, 0), at(10, 0, 59)), 0);
        assert_eq!(minutes_between(at(10, 0, 0), at(10, 17, 59)), 17);
        assert_eq!(minutes_between(at(10, 0, 0), at(11, 30, 0)), 90);
    }

    #[test]
    fn minutes_between_never_negative() {
        let later = at(12, 0, 0);
        let earlier = later - Duration::minutes(5);
        assert_eq!(minutes_between(later, earlier), 0);
    }
}
