//! Text formats for the controller clock and site records.

use chrono::{Datelike, NaiveDateTime, Timelike};

use atcs_core::angle::degrees_to_sexagesimal;
use atcs_core::types::{DateOrder, TimeFormat};

/// `TSst` argument: `hh:mm:ss.ssAM`/`PM` or `HH:MM:SS.ss`.
///
/// The 12-hour clock shows 12 for both noon and midnight. Hundredths are
/// truncated.
pub fn format_time(dt: NaiveDateTime, format: TimeFormat) -> String {
    let centis = dt.nanosecond().min(999_999_999) / 10_000_000;
    let (h, m, s) = (dt.hour(), dt.minute(), dt.second().min(59));

    match format {
        TimeFormat::TwentyFourHour => format!("{h:02}:{m:02}:{s:02}.{centis:02}"),
        TimeFormat::TwelveHour => {
            let h12 = match h % 12 {
                0 => 12,
                n => n,
            };
            let meridiem = if h < 12 { "AM" } else { "PM" };
            format!("{h12:02}:{m:02}:{s:02}.{centis:02}{meridiem}")
        }
    }
}

/// `TSsd` argument: `mm/dd/yy` or `dd/mm/yy`.
pub fn format_date(dt: NaiveDateTime, order: DateOrder) -> String {
    let yy = dt.year().rem_euclid(100);
    match order {
        DateOrder::MonthFirst => format!("{:02}/{:02}/{yy:02}", dt.month(), dt.day()),
        DateOrder::DayFirst => format!("{:02}/{:02}/{yy:02}", dt.day(), dt.month()),
    }
}

pub fn parse_time_format(reply: &str) -> TimeFormat {
    if reply.trim() == "24hr" {
        TimeFormat::TwentyFourHour
    } else {
        TimeFormat::TwelveHour
    }
}

pub fn parse_date_order(reply: &str) -> DateOrder {
    if reply.trim() == "dd/mm/yy" {
        DateOrder::DayFirst
    } else {
        DateOrder::MonthFirst
    }
}

/// `DD:MM:SS` followed by `E` or `W` (negative is west).
pub fn format_longitude(degrees: f64) -> String {
    let (text, _) = degrees_to_sexagesimal(degrees);
    let hemisphere = if degrees < 0.0 { 'W' } else { 'E' };
    format!("{text}{hemisphere}")
}

/// `DD:MM:SS` followed by `N` or `S` (negative is south).
pub fn format_latitude(degrees: f64) -> String {
    let (text, _) = degrees_to_sexagesimal(degrees);
    let hemisphere = if degrees >= 0.0 { 'N' } else { 'S' };
    format!("{text}{hemisphere}")
}

/// `HH:MM` followed by `E` or `W`; UTC is a bare `00:00`.
pub fn format_timezone(hours: f64) -> String {
    if hours == 0.0 {
        return "00:00".to_string();
    }
    let total_minutes = (hours.abs() * 60.0).round() as u32;
    let (hh, mm) = (total_minutes / 60, total_minutes % 60);
    let side = if hours < 0.0 { 'W' } else { 'E' };
    format!("{hh:02}:{mm:02}{side}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    #[test]
    fn time_24h() {
        let dt = at(2024, 3, 9, 21, 5, 7, 250);
        assert_eq!(format_time(dt, TimeFormat::TwentyFourHour), "21:05:07.25");
    }

    #[test]
    fn time_12h_pm() {
        let dt = at(2024, 3, 9, 21, 5, 7, 250);
        assert_eq!(format_time(dt, TimeFormat::TwelveHour), "09:05:07.25PM");
    }

    #[test]
    fn time_12h_noon_and_midnight() {
        assert_eq!(
            format_time(at(2024, 1, 1, 12, 0, 0, 0), TimeFormat::TwelveHour),
            "12:00:00.00PM"
        );
        assert_eq!(
            format_time(at(2024, 1, 1, 0, 30, 0, 0), TimeFormat::TwelveHour),
            "12:30:00.00AM"
        );
    }

    #[test]
    fn time_truncates_hundredths() {
        let dt = at(2024, 1, 1, 8, 0, 59, 999);
        assert_eq!(format_time(dt, TimeFormat::TwentyFourHour), "08:00:59.99");
    }

    #[test]
    fn date_orders() {
        let dt = at(2017, 11, 4, 0, 0, 0, 0);
        assert_eq!(format_date(dt, DateOrder::MonthFirst), "11/04/17");
        assert_eq!(format_date(dt, DateOrder::DayFirst), "04/11/17");
    }

    #[test]
    fn date_two_digit_year() {
        let dt = at(2100, 2, 3, 0, 0, 0, 0);
        assert_eq!(format_date(dt, DateOrder::MonthFirst), "02/03/00");
    }

    #[test]
    fn format_replies() {
        assert_eq!(parse_time_format("24hr"), TimeFormat::TwentyFourHour);
        assert_eq!(parse_time_format("12hr"), TimeFormat::TwelveHour);
        assert_eq!(parse_date_order("dd/mm/yy"), DateOrder::DayFirst);
        assert_eq!(parse_date_order("mm/dd/yy"), DateOrder::MonthFirst);
    }

    #[test]
    fn site_coordinates() {
        assert_eq!(format_longitude(-122.25), "122:15:00W");
        assert_eq!(format_longitude(2.5), "02:30:00E");
        assert_eq!(format_latitude(37.5), "37:30:00N");
        assert_eq!(format_latitude(-33.75), "33:45:00S");
    }

    #[test]
    fn timezones() {
        assert_eq!(format_timezone(0.0), "00:00");
        assert_eq!(format_timezone(-8.0), "08:00W");
        assert_eq!(format_timezone(5.5), "05:30E");
        assert_eq!(format_timezone(-3.75), "03:45W");
    }
}
