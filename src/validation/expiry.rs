use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Why a `YYMMDD` string is not an MRZ date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateDefect {
    #[error("expected exactly 6 digits")]
    NotSixDigits,

    #[error("month {0} is outside 1-12")]
    Month(u32),

    #[error("day {0} is outside 1-31")]
    Day(u32),
}

/// A printed MRZ date. Only the month and day ranges are checked, so
/// `740231` is a valid MRZ date that has no calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MrzDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl MrzDate {
    pub fn parse(value: &str) -> Result<MrzDate, DateDefect> {
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateDefect::NotSixDigits);
        }

        let part = |range: std::ops::Range<usize>| {
            value[range].parse::<u32>().map_err(|_| DateDefect::NotSixDigits)
        };
        let year = part(0..2)?;
        let month = part(2..4)?;
        let day = part(4..6)?;

        if !(1..=12).contains(&month) {
            return Err(DateDefect::Month(month));
        }
        if !(1..=31).contains(&day) {
            return Err(DateDefect::Day(day));
        }

        Ok(MrzDate { year, month, day })
    }

    /// Expand the two-digit year around `today`: years up to ten past the
    /// current one belong to this century, the rest to the previous one.
    pub fn full_year(&self, today: NaiveDate) -> i32 {
        let century = today.year() / 100 * 100;
        let current = (today.year() % 100) as u32;

        if self.year <= current + 10 {
            century + self.year as i32
        } else {
            century - 100 + self.year as i32
        }
    }

    /// `None` when the day does not exist in that month.
    pub fn to_naive_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.full_year(today), self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            MrzDate::parse("900101"),
            Ok(MrzDate { year: 90, month: 1, day: 1 })
        );
        assert!(MrzDate::parse("991231").is_ok());
        // No per-month day count
        assert!(MrzDate::parse("990231").is_ok());
    }

    #[test]
    fn test_parse_defects() {
        assert_eq!(MrzDate::parse("991301"), Err(DateDefect::Month(13)));
        assert_eq!(MrzDate::parse("990001"), Err(DateDefect::Month(0)));
        assert_eq!(MrzDate::parse("990100"), Err(DateDefect::Day(0)));
        assert_eq!(MrzDate::parse("990132"), Err(DateDefect::Day(32)));
        assert_eq!(MrzDate::parse("99010"), Err(DateDefect::NotSixDigits));
        assert_eq!(MrzDate::parse("9901011"), Err(DateDefect::NotSixDigits));
        assert_eq!(MrzDate::parse("99O101"), Err(DateDefect::NotSixDigits));
        assert_eq!(MrzDate::parse("+90101"), Err(DateDefect::NotSixDigits));
    }

    #[test]
    fn test_century_pivot() {
        let date = |s: &str| MrzDate::parse(s).unwrap().full_year(today());
        assert_eq!(date("360101"), 2036);
        assert_eq!(date("370101"), 1937);
        assert_eq!(date("000101"), 2000);
        assert_eq!(date("991231"), 1999);
    }

    #[test]
    fn test_calendar_conversion() {
        let date = MrzDate::parse("300101").unwrap();
        assert_eq!(date.to_naive_date(today()), NaiveDate::from_ymd_opt(2030, 1, 1));

        let no_such_day = MrzDate::parse("250231").unwrap();
        assert_eq!(no_such_day.to_naive_date(today()), None);
    }
}
