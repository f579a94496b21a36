//! MRZ date parsing: `YYMMDD` -> ISO `YYYY-MM-DD`, with century pivots.

use crate::types::UNKNOWN_DATE;
use time::{Date, Month};

/// Which century-pivot bias to apply when expanding a 2-digit year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateBias {
    /// Expiry dates bias toward the future.
    Future,
    /// Birth dates bias toward the past.
    Past,
}

fn month_from_u8(month: u32) -> Option<Month> {
    Month::try_from(u8::try_from(month).ok()?).ok()
}

/// Expands a 2-digit year under `bias`, given the current 2-digit year.
fn expand_year(yy: u32, bias: DateBias, current_yy: u32) -> u32 {
    match bias {
        DateBias::Future => {
            if yy <= (current_yy + 30) % 100 {
                2000 + yy
            } else {
                1900 + yy
            }
        }
        DateBias::Past => {
            if yy > current_yy {
                1900 + yy
            } else {
                2000 + yy
            }
        }
    }
}

/// Parses a raw `YYMMDD` MRZ date field into ISO `YYYY-MM-DD`, or
/// `"UNKNOWN"` if the digits don't form a valid calendar date. `current_yy`
/// is the current 2-digit year, threaded in by the caller so parsing stays
/// deterministic and testable rather than reading the system clock.
#[must_use]
pub fn parse_mrz_date(field: &str, bias: DateBias, current_yy: u32) -> String {
    if field.len() != 6 || !field.chars().all(|c| c.is_ascii_digit()) {
        return UNKNOWN_DATE.to_owned();
    }
    let yy: u32 = field[0..2].parse().unwrap();
    let mm: u32 = field[2..4].parse().unwrap();
    let dd: u32 = field[4..6].parse().unwrap();

    if !(1..=12).contains(&mm) || !(1..=31).contains(&dd) {
        return UNKNOWN_DATE.to_owned();
    }
    let Some(month) = month_from_u8(mm) else {
        return UNKNOWN_DATE.to_owned();
    };
    let year = expand_year(yy, bias, current_yy);
    let Ok(day) = u8::try_from(dd) else {
        return UNKNOWN_DATE.to_owned();
    };
    match Date::from_calendar_date(year.try_into().unwrap_or(0), month, day) {
        Ok(date) => format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day()),
        Err(_) => UNKNOWN_DATE.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_biases_past() {
        // current_yy = 24: 74 > 24 -> 1974.
        assert_eq!(parse_mrz_date("740812", DateBias::Past, 24), "1974-08-12");
    }

    #[test]
    fn expiry_date_biases_future() {
        // current_yy = 24: 12 <= (24+30)%100=54 -> 2012.
        assert_eq!(parse_mrz_date("120415", DateBias::Future, 24), "2012-04-15");
    }

    #[test]
    fn invalid_month_is_unknown() {
        assert_eq!(parse_mrz_date("741312", DateBias::Past, 24), UNKNOWN_DATE);
    }

    #[test]
    fn invalid_day_is_unknown() {
        assert_eq!(parse_mrz_date("740231", DateBias::Past, 24), UNKNOWN_DATE);
    }

    #[test]
    fn non_digit_field_is_unknown() {
        assert_eq!(parse_mrz_date("74O812", DateBias::Past, 24), UNKNOWN_DATE);
    }

    #[test]
    fn expiry_near_pivot_boundary_prefers_2000s() {
        // current_yy = 24, pivot = 54: yy=54 <= 54 -> 2054.
        assert_eq!(parse_mrz_date("540101", DateBias::Future, 24), "2054-01-01");
        // yy=55 > 54 -> 1955.
        assert_eq!(parse_mrz_date("550101", DateBias::Future, 24), "1955-01-01");
    }
}
