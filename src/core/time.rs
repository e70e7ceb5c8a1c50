use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Elapsed minutes between two UTC timestamps, fractional. Negative spans
/// (clock skew between writers) count as zero.
pub(crate) fn minutes_between(start: PrimitiveDateTime, end: PrimitiveDateTime) -> f64 {
    let seconds = (end - start).as_seconds_f64();
    if seconds <= 0.0 {
        0.0
    } else {
        seconds / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Time};

    fn at(hour: u8, minute: u8, second: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, time::Month::January, 2).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        assert_eq!(format_primitive(at(10, 20, 30)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn minutes_between_is_fractional() {
        assert_eq!(minutes_between(at(10, 0, 0), at(10, 15, 30)), 15.5);
        assert_eq!(minutes_between(at(10, 0, 0), at(10, 0, 0) + Duration::hours(2)), 120.0);
    }

    #[test]
    fn minutes_between_clamps_negative_spans() {
        assert_eq!(minutes_between(at(10, 5, 0), at(10, 0, 0)), 0.0);
    }
}
