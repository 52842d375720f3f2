//! Calendar date resolution from report paths
//!
//! Report folders follow `.../<year>/<month> <MonName>/<DD-MM-YYYY>/file`,
//! but hand-made folders drift from that shape. Segments are scanned from
//! the filename towards the root and the first one that matches a pattern
//! wins. Patterns are tried per segment in [`DatePattern::PRIORITY`] order:
//!
//! | Pattern      | Example segment         |
//! |--------------|-------------------------|
//! | `DD-MM-YYYY` | `20-06-2025`            |
//! | `DD_MM_YYYY` | `STE_Report_20_06_2025` |
//! | `YYYY-MM-DD` | `2025-06-20`            |
//! | `<N> <Mon>`  | `6 Jun` (year from a separate `2025` segment) |

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::AuditError;

static DAY_MONTH_YEAR_DASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])(\d{1,2})-(\d{1,2})-(\d{4})(?:[^0-9]|$)").expect("valid date regex")
});

static DAY_MONTH_YEAR_UNDERSCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])(\d{1,2})_(\d{1,2})_(\d{4})(?:[^0-9]|$)").expect("valid date regex")
});

static YEAR_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])(\d{4})-(\d{1,2})-(\d{1,2})(?:[^0-9]|$)").expect("valid date regex")
});

static MONTH_FOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]+)$").expect("valid month regex"));

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A recognized date shape in a path segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatePattern {
    /// `DD-MM-YYYY`
    DayMonthYearDash,
    /// `DD_MM_YYYY`
    DayMonthYearUnderscore,
    /// `YYYY-MM-DD`
    YearMonthDay,
    /// `<N> <MonthName>` plus a separate four-digit year segment
    MonthFolder,
}

impl DatePattern {
    /// Patterns in the order they are tried against each segment
    pub const PRIORITY: [DatePattern; 4] = [
        DatePattern::DayMonthYearDash,
        DatePattern::DayMonthYearUnderscore,
        DatePattern::YearMonthDay,
        DatePattern::MonthFolder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DatePattern::DayMonthYearDash => "DD-MM-YYYY",
            DatePattern::DayMonthYearUnderscore => "DD_MM_YYYY",
            DatePattern::YearMonthDay => "YYYY-MM-DD",
            DatePattern::MonthFolder => "N MonthName",
        }
    }

    /// Try this pattern against `segments[index]`
    ///
    /// `segments` is the whole path so that `MonthFolder` can look up the
    /// year in another segment.
    pub fn match_segment(self, segments: &[&str], index: usize) -> Option<NaiveDate> {
        let segment = segments.get(index)?.trim();
        match self {
            DatePattern::DayMonthYearDash => first_valid(&DAY_MONTH_YEAR_DASH, segment, |c| (c[2], c[1], c[0])),
            DatePattern::DayMonthYearUnderscore => {
                first_valid(&DAY_MONTH_YEAR_UNDERSCORE, segment, |c| (c[2], c[1], c[0]))
            }
            DatePattern::YearMonthDay => first_valid(&YEAR_MONTH_DAY, segment, |c| (c[0], c[1], c[2])),
            DatePattern::MonthFolder => match_month_folder(segments, index),
        }
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub pattern: DatePattern,
    /// The path segment that matched
    pub segment: String,
}

/// Derive a calendar date from a file path
///
/// Both `/` and `\` separate segments regardless of platform. Fails with
/// [`AuditError::DateNotFound`] only when no segment matches.
pub fn resolve_path_date(path: &str) -> Result<ResolvedDate, AuditError> {
    let segments: Vec<&str> = path
        .split(|c| c == '/' || c == '\\')
        .filter(|s| !s.trim().is_empty())
        .collect();

    for index in (0..segments.len()).rev() {
        for pattern in DatePattern::PRIORITY {
            if let Some(date) = pattern.match_segment(&segments, index) {
                return Ok(ResolvedDate {
                    date,
                    pattern,
                    segment: segments[index].to_string(),
                });
            }
        }
    }

    Err(AuditError::DateNotFound {
        path: path.to_string(),
    })
}

/// First match of `regex` in `segment` that forms a real date
///
/// `order` maps the three captured groups to (year, month, day).
fn first_valid<'a>(
    regex: &Regex,
    segment: &'a str,
    order: impl Fn([&'a str; 3]) -> (&'a str, &'a str, &'a str),
) -> Option<NaiveDate> {
    regex.captures_iter(segment).find_map(|caps| {
        let groups = [
            caps.get(1)?.as_str(),
            caps.get(2)?.as_str(),
            caps.get(3)?.as_str(),
        ];
        let (year, month, day) = order(groups);
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    })
}

fn match_month_folder(segments: &[&str], index: usize) -> Option<NaiveDate> {
    let caps = MONTH_FOLDER.captures(segments[index].trim())?;
    let number: u32 = caps[1].parse().ok()?;
    let month = month_from_name(&caps[2])?;
    let year = find_year(segments, index)?;

    // "6 Jun" is a month folder; "20 Jun" names a day in June
    let day = if number == month { 1 } else { number };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month number for `Jun`, `june`, `Sept`, ...
fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    if name == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|full| *full == name || (name.len() == 3 && full.starts_with(&name)))
        .map(|i| i as u32 + 1)
}

/// Nearest four-digit segment above `index`, falling back to below it
fn find_year(segments: &[&str], index: usize) -> Option<i32> {
    let is_year = |s: &&&str| {
        let s = s.trim();
        s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
    };
    segments[..index]
        .iter()
        .rev()
        .find(is_year)
        .or_else(|| segments[index + 1..].iter().find(is_year))
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn resolve(path: &str) -> NaiveDate {
        resolve_path_date(path).unwrap().date
    }

    #[test]
    fn windows_report_path() {
        let resolved = resolve_path_date(r"\Reports\2025\6 Jun\20-06-2025\STE_Report_x.xlsx").unwrap();
        assert_eq!(resolved.date, date(2025, 6, 20));
        assert_eq!(resolved.pattern, DatePattern::DayMonthYearDash);
        assert_eq!(resolved.segment, "20-06-2025");
    }

    #[test]
    fn unix_report_path() {
        assert_eq!(resolve("/mnt/reports/2025/6 Jun/20-06-2025/STE_Report_x.xlsx"), date(2025, 6, 20));
    }

    #[test]
    fn unc_share_path() {
        assert_eq!(
            resolve(r"\\TRUENAS\nasuser\GTS-Data\Reports\2025\7 Jul\01-07-2025\STE_Report.xlsx"),
            date(2025, 7, 1)
        );
    }

    #[test]
    fn single_digit_day_and_month() {
        assert_eq!(resolve("2025/6 Jun/5-6-2025/STE_Report.xlsx"), date(2025, 6, 5));
    }

    #[test]
    fn filename_segment_wins_over_folder() {
        // Scanning starts at the filename
        assert_eq!(resolve("2025/6 Jun/20-06-2025/STE_Report_21-06-2025.xlsx"), date(2025, 6, 21));
    }

    #[test]
    fn underscore_pattern() {
        let resolved = resolve_path_date("reports/STE_Report_16_06_2025.xlsx").unwrap();
        assert_eq!(resolved.date, date(2025, 6, 16));
        assert_eq!(resolved.pattern, DatePattern::DayMonthYearUnderscore);
    }

    #[test]
    fn iso_pattern() {
        let resolved = resolve_path_date("reports/2025-06-16/STE_Report.xlsx").unwrap();
        assert_eq!(resolved.date, date(2025, 6, 16));
        assert_eq!(resolved.pattern, DatePattern::YearMonthDay);
    }

    #[test]
    fn dash_pattern_takes_priority_within_segment() {
        // Both shapes present in one segment: DD-MM-YYYY is tried first
        let resolved = resolve_path_date("x/2025-01-02 copy of 03-04-2025/STE_Report.xlsx").unwrap();
        assert_eq!(resolved.date, date(2025, 4, 3));
        assert_eq!(resolved.pattern, DatePattern::DayMonthYearDash);
    }

    #[test]
    fn month_folder_with_year_segment() {
        let resolved = resolve_path_date("Reports/2025/6 Jun/STE_Report.xlsx").unwrap();
        assert_eq!(resolved.date, date(2025, 6, 1));
        assert_eq!(resolved.pattern, DatePattern::MonthFolder);
    }

    #[test]
    fn month_folder_with_full_name() {
        assert_eq!(resolve("Reports/2024/9 September/STE_Report.xlsx"), date(2024, 9, 1));
        assert_eq!(resolve("Reports/2024/9 sept/STE_Report.xlsx"), date(2024, 9, 1));
    }

    #[test]
    fn day_and_month_name_segment() {
        assert_eq!(resolve("Reports/2025/20 Jun/STE_Report.xlsx"), date(2025, 6, 20));
    }

    #[test]
    fn month_folder_year_below() {
        let resolved = resolve_path_date("Reports/6 Jun/2025/STE_Report.xlsx").unwrap();
        assert_eq!(resolved.date, date(2025, 6, 1));
        assert_eq!(resolved.segment, "6 Jun");
    }

    #[test]
    fn nearest_year_above_wins() {
        assert_eq!(resolve("Archive/2024/2025/7 Jul/STE_Report.xlsx"), date(2025, 7, 1));
    }

    #[test]
    fn month_folder_without_year_is_not_a_date() {
        let err = resolve_path_date("Reports/6 Jun/STE_Report.xlsx").unwrap_err();
        assert_eq!(err.kind(), "DateNotFound");
    }

    #[test]
    fn invalid_calendar_date_falls_through() {
        // 31-02 is not a date; the month folder above still is
        assert_eq!(resolve("Reports/2025/2 Feb/31-02-2025/STE_Report.xlsx"), date(2025, 2, 1));
    }

    #[test]
    fn digits_glued_to_match_are_ignored() {
        let err = resolve_path_date("Reports/120-06-20251/STE_Report.xlsx").unwrap_err();
        assert!(matches!(err, AuditError::DateNotFound { .. }));
    }

    #[test]
    fn no_date_anywhere() {
        let err = resolve_path_date("Reports/misc/STE_Report.xlsx").unwrap_err();
        match err {
            AuditError::DateNotFound { path } => assert_eq!(path, "Reports/misc/STE_Report.xlsx"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_path() {
        assert!(resolve_path_date("").is_err());
    }

    #[test]
    fn month_name_lookup() {
        assert_eq!(month_from_name("Jun"), Some(6));
        assert_eq!(month_from_name("DECEMBER"), Some(12));
        assert_eq!(month_from_name("Ju"), None);
        assert_eq!(month_from_name("Junk"), None);
    }
}
