//! Age boundary tests evaluated against several reference days.

use checkstand_idcheck::{DecisionEngine, Severity, compute_age};
use chrono::{Datelike, Duration, NaiveDate};
use rstest::rstest;

fn mmddyyyy(date: NaiveDate) -> String {
    date.format("%m%d%Y").to_string()
}

/// California record with an address in California.
fn california_record(dob: NaiveDate, expires: NaiveDate) -> Vec<u8> {
    format!(
        "@\n\u{1e}\rANSI 636014100001DL00310080DLDAQD7654321\nDCSRIVERA\nDACALEX\n\
         DBB{}\nDBA{}\nDAJCA\nDAK94103\r",
        mmddyyyy(dob),
        mmddyyyy(expires)
    )
    .into_bytes()
}

fn years_before(today: NaiveDate, years: i32) -> NaiveDate {
    today.with_year(today.year() - years).unwrap()
}

#[rstest]
#[case(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())]
#[case(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())]
#[case(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())]
#[case(NaiveDate::from_ymd_opt(2030, 3, 1).unwrap())]
fn exactly_twenty_one_is_approved(#[case] today: NaiveDate) {
    let dob = years_before(today, 21);
    let raw = california_record(dob, today + Duration::days(365));

    let decision = DecisionEngine::new().check_bytes(&raw, today);

    assert_eq!(decision.severity(), Severity::Approved);
    assert_eq!(decision.age_years(), Some(21));
    assert!(decision.inconsistencies().is_empty());
}

#[rstest]
#[case(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())]
#[case(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())]
#[case(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())]
#[case(NaiveDate::from_ymd_opt(2030, 3, 1).unwrap())]
fn one_day_short_of_twenty_one_is_hard_fail(#[case] today: NaiveDate) {
    let dob = years_before(today, 21) + Duration::days(1);
    let raw = california_record(dob, today + Duration::days(365));

    let decision = DecisionEngine::new().check_bytes(&raw, today);

    assert_eq!(decision.severity(), Severity::HardFail);
    assert_eq!(decision.age_years(), Some(20));
    assert_eq!(decision.inconsistencies(), ["Under 21"]);
}

#[rstest]
#[case(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())]
#[case(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())]
fn expired_card_needs_review(#[case] today: NaiveDate) {
    let dob = years_before(today, 21);
    let raw = california_record(dob, today - Duration::days(1));

    let decision = DecisionEngine::new().check_bytes(&raw, today);

    assert_eq!(decision.severity(), Severity::NeedsReview);
    assert!(decision.inconsistencies().iter().any(|i| i == "Card expired"));
}

#[test]
fn birthday_today_counts_birthday_tomorrow_does_not() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    for years in [1, 18, 21, 65] {
        let birthday_today = years_before(today, years);
        let birthday_tomorrow = birthday_today + Duration::days(1);

        assert_eq!(compute_age(birthday_today, today), years);
        assert_eq!(compute_age(birthday_tomorrow, today), years - 1);
    }
}

#[test]
fn hard_fail_never_approves_any_minor() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let engine = DecisionEngine::new();

    let mut dob = years_before(today, 21) + Duration::days(1);
    while dob <= today {
        let raw = california_record(dob, today + Duration::days(30));
        let decision = engine.check_bytes(&raw, today);
        assert_eq!(decision.severity(), Severity::HardFail, "dob {dob}");
        dob += Duration::days(97);
    }
}
