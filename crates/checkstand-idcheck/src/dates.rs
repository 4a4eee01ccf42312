//! Card date handling.
//!
//! Identity records store dates as eight digits, but issuers have used two
//! orderings over the years:
//!
//! ```text
//! MMDDYYYY   01151990   (current standard)
//! YYYYMMDD   19900115   (older cards, some Canadian issuers)
//! ```
//!
//! Neither carries a marker, so [`parse_card_date`] tries month-first and
//! falls back to year-first only if the first reading is not a real
//! calendar date.

use checkstand_core::{Error, Result};
use chrono::{Datelike, NaiveDate};

/// Number of digits in a card date.
const CARD_DATE_DIGITS: usize = 8;

/// Parse a card date field.
///
/// Non-digit characters are stripped first, so `01/15/1990` and `01151990`
/// are equivalent.
///
/// # Errors
///
/// Returns `Error::InvalidDate` if the value does not reduce to eight digits
/// or neither ordering forms a valid date.
///
/// # Examples
///
/// ```
/// use checkstand_idcheck::parse_card_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(1990, 1, 15).unwrap();
/// assert_eq!(parse_card_date("01151990").unwrap(), expected);
/// assert_eq!(parse_card_date("19900115").unwrap(), expected);
/// assert!(parse_card_date("99999999").is_err());
/// ```
pub fn parse_card_date(value: &str) -> Result<NaiveDate> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != CARD_DATE_DIGITS {
        return Err(Error::InvalidDate(format!(
            "{value:?} does not contain {CARD_DATE_DIGITS} digits"
        )));
    }

    month_first(&digits)
        .or_else(|| year_first(&digits))
        .ok_or_else(|| Error::InvalidDate(format!("{value:?} is not a calendar date")))
}

fn month_first(digits: &str) -> Option<NaiveDate> {
    let month = digits[0..2].parse().ok()?;
    let day = digits[2..4].parse().ok()?;
    let year = digits[4..8].parse().ok()?;
    calendar_date(year, month, day)
}

fn year_first(digits: &str) -> Option<NaiveDate> {
    let year = digits[0..4].parse().ok()?;
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..8].parse().ok()?;
    calendar_date(year, month, day)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    // Year zero is not a date any issuer writes
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole years between `dob` and `today`.
///
/// A birthday falling on `today` already counts. Birth dates in the future
/// produce a negative age.
///
/// ```
/// use checkstand_idcheck::compute_age;
/// use chrono::NaiveDate;
///
/// let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
/// let today = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
/// assert_eq!(compute_age(dob, today), 21);
/// assert_eq!(compute_age(dob, today.pred_opt().unwrap()), 20);
/// ```
pub fn compute_age(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    #[case("01151990", date(1990, 1, 15))]
    #[case("19900115", date(1990, 1, 15))]
    #[case("12312030", date(2030, 12, 31))]
    #[case("20301231", date(2030, 12, 31))]
    #[case("02292000", date(2000, 2, 29))]
    #[case("01-15-1990", date(1990, 1, 15))]
    #[case(" 01151990 ", date(1990, 1, 15))]
    fn test_parse_card_date_valid(#[case] input: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_card_date(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("0115199")]
    #[case("011519900")]
    #[case("13451990")]
    #[case("02292001")]
    #[case("00000000")]
    #[case("NONE")]
    fn test_parse_card_date_invalid(#[case] input: &str) {
        let err = parse_card_date(input).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
    }

    #[test]
    fn test_month_first_wins_when_both_readings_valid() {
        // Also reads as 0101-10-01
        assert_eq!(parse_card_date("01011001").unwrap(), date(1001, 1, 1));
    }

    #[rstest]
    #[case(date(2000, 6, 15), date(2021, 6, 15), 21)]
    #[case(date(2000, 6, 15), date(2021, 6, 14), 20)]
    #[case(date(2000, 6, 15), date(2021, 6, 16), 21)]
    #[case(date(2000, 12, 31), date(2021, 1, 1), 20)]
    #[case(date(2000, 1, 1), date(2000, 1, 1), 0)]
    #[case(date(2030, 1, 1), date(2026, 1, 1), -4)]
    fn test_compute_age(#[case] dob: NaiveDate, #[case] today: NaiveDate, #[case] expected: i32) {
        assert_eq!(compute_age(dob, today), expected);
    }

    #[test]
    fn test_compute_age_leap_day_birthday() {
        let dob = date(2000, 2, 29);
        assert_eq!(compute_age(dob, date(2021, 2, 28)), 20);
        assert_eq!(compute_age(dob, date(2021, 3, 1)), 21);
        assert_eq!(compute_age(dob, date(2024, 2, 29)), 24);
    }

    #[test]
    fn test_birthday_today_and_tomorrow() {
        let today = date(2026, 10, 18);
        let birthday_today = date(2005, 10, 18);
        let birthday_tomorrow = date(2005, 10, 19);

        assert_eq!(compute_age(birthday_today, today), 21);
        assert_eq!(compute_age(birthday_tomorrow, today), 20);
    }
}
