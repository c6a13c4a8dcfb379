//! Proleptic Gregorian calendar calculations.
//!
//! Conversions between epoch days (days since 1970-01-01) and civil dates
//! using Euclidean affine functions over the 400 year Gregorian cycle. The
//! functions are `const` and total over the full `i64` day range used by
//! the fixture generator.

pub const SECONDS_PER_DAY: i64 = 86_400;

const DAYS_IN_A_400Y_CYCLE: i64 = 146_097;
const EPOCH_RATA_DIE: i64 = 719_468;

/// Whether the provided Gregorian year is a leap year.
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// The number of days in the provided month.
pub const fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

/// Calculate epoch days from a civil date.
pub const fn epoch_days_from_ymd(year: i32, month: u8, day: u8) -> i64 {
    let j = (month <= 2) as i64;
    let computational_year = year as i64 - j;
    let era = computational_year.div_euclid(400);
    let year_of_era = computational_year.rem_euclid(400);
    // March-based month index, so the leap day lands at the end of the year.
    let month_prime = (month as i64 + 9) % 12;
    let day_of_year = (153 * month_prime + 2) / 5 + day as i64 - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_IN_A_400Y_CYCLE + day_of_era - EPOCH_RATA_DIE
}

/// Calculate the civil date for the provided epoch days.
pub const fn ymd_from_epoch_days(epoch_days: i64) -> (i32, u8, u8) {
    let rata_die = epoch_days + EPOCH_RATA_DIE;
    let era = rata_die.div_euclid(DAYS_IN_A_400Y_CYCLE);
    let day_of_era = rata_die.rem_euclid(DAYS_IN_A_400Y_CYCLE);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_prime = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * month_prime + 2) / 5 + 1) as u8;
    let month = (if month_prime < 10 {
        month_prime + 3
    } else {
        month_prime - 9
    }) as u8;
    let year = (year_of_era + era * 400) as i32 + (month <= 2) as i32;
    (year, month, day)
}

/// Day of the week for the provided epoch days, where `0` is Sunday.
pub const fn weekday_from_epoch_days(epoch_days: i64) -> u8 {
    // 1970-01-01 was a Thursday.
    (epoch_days + 4).rem_euclid(7) as u8
}
