//! Relative and absolute date phrases → absolute date ranges.
//!
//! Rules are tried in list order and the first one that matches wins; later
//! rules are never merged in. Calendar periods (month, quarter, semester,
//! year) snap to unit boundaries. "Last N days/weeks" is anchored to today
//! without snapping.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Months, NaiveDate};
use regex::{Captures, Regex};

use crate::models::DateRange;

use super::normalize::fold;

type Resolve = fn(&Captures<'_>, NaiveDate) -> Option<DateRange>;

/// One phrase pattern and how to turn its captures into a range.
pub struct DateRule {
    pub name: &'static str,
    pattern: Regex,
    resolve: Resolve,
}

impl DateRule {
    fn new(name: &'static str, pattern: &str, resolve: Resolve) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid regex"),
            resolve,
        }
    }

    /// Apply this rule alone to already-folded text.
    pub fn apply(&self, folded: &str, today: NaiveDate) -> Option<DateRange> {
        let caps = self.pattern.captures(folded)?;
        (self.resolve)(&caps, today)
    }
}

const YEAR: &str = r"((?:19|20)\d{2})";

/// Priority-ordered rule list.
static DATE_RULES: LazyLock<Vec<DateRule>> = LazyLock::new(|| {
    vec![
        DateRule::new(
            "year_range",
            &format!(r"\b(?:entre|de)\s+{YEAR}\s+(?:e|a|ate)\s+{YEAR}\b"),
            resolve_year_range,
        ),
        DateRule::new(
            "semester_of_year",
            &format!(
                r"\b(primeiro|segundo|1|2)\s*[°ºo]?\s*semestre\s+(?:de\s+|do\s+ano\s+de\s+)?{YEAR}\b"
            ),
            resolve_semester_of_year,
        ),
        DateRule::new(
            "last_n_days",
            r"\b(?:(?:nos\s+)?ultim[oa]s\s+(\d{1,4})\s+dias|ha\s+(\d{1,4})\s+dias|(\d{1,4})\s+dias\s+atras)\b",
            resolve_last_days,
        ),
        DateRule::new(
            "last_n_weeks",
            r"\b(?:(?:nas\s+)?ultim[oa]s\s+(\d{1,3})\s+semanas|ha\s+(\d{1,3})\s+semanas|(\d{1,3})\s+semanas\s+atras|(ultima\s+semana|semana\s+passada))\b",
            resolve_last_weeks,
        ),
        DateRule::new(
            "last_n_months",
            r"\b(?:(?:nos\s+)?ultimos\s+(\d{1,3})\s+meses|ha\s+(\d{1,3})\s+meses|(\d{1,3})\s+meses\s+atras|(ultimo\s+mes|mes\s+passado))\b",
            resolve_last_months,
        ),
        DateRule::new(
            "last_quarter",
            r"\b(?:ultimo\s+trimestre|trimestre\s+passado)\b",
            resolve_last_quarter,
        ),
        DateRule::new(
            "last_semester",
            r"\b(?:ultimo\s+semestre|semestre\s+passado)\b",
            resolve_last_semester,
        ),
        DateRule::new(
            "last_n_years",
            r"\b(?:(?:nos\s+)?ultimos\s+(\d{1,2})\s+anos|ha\s+(\d{1,2})\s+anos|(\d{1,2})\s+anos\s+atras|(ultimo\s+ano|ano\s+passado))\b",
            resolve_last_years,
        ),
        DateRule::new(
            "this_year",
            r"\b(?:(?:n|d)?es[st]e\s+ano|ano\s+(?:atual|corrente))\b",
            resolve_this_year,
        ),
        // Also fires on years inside project names ("copa 2014", "rio 2016").
        DateRule::new("explicit_year", &format!(r"\b{YEAR}\b"), resolve_explicit_year),
    ]
});

/// The ordered rule list, highest priority first.
pub fn date_rules() -> &'static [DateRule] {
    &DATE_RULES
}

/// Resolve the first matching date phrase in `text` relative to `today`.
/// No match yields None; the caller leaves the period filter unset.
pub fn resolve_period(text: &str, today: NaiveDate) -> Option<DateRange> {
    let folded = fold(text);
    for rule in date_rules() {
        if let Some(range) = rule.apply(&folded, today) {
            tracing::debug!(
                rule = rule.name,
                start = %range.start,
                end = %range.end,
                "Date phrase resolved"
            );
            return Some(range);
        }
    }
    None
}

// ── Resolvers ─────────────────────────────────────────────

fn resolve_year_range(caps: &Captures<'_>, _today: NaiveDate) -> Option<DateRange> {
    let a = capture_number(caps, 1)? as i32;
    let b = capture_number(caps, 2)? as i32;
    let (first, last) = if a <= b { (a, b) } else { (b, a) };
    DateRange::new(year_start(first)?, year_end(last)?)
}

fn resolve_semester_of_year(caps: &Captures<'_>, _today: NaiveDate) -> Option<DateRange> {
    let half = match caps.get(1)?.as_str() {
        "primeiro" | "1" => 0,
        _ => 1,
    };
    let year = capture_number(caps, 2)? as i32;
    semester_range(year, half)
}

fn resolve_last_days(caps: &Captures<'_>, today: NaiveDate) -> Option<DateRange> {
    let days = first_number(caps, &[1, 2, 3])?;
    anchored_days(today, i64::from(days))
}

fn resolve_last_weeks(caps: &Captures<'_>, today: NaiveDate) -> Option<DateRange> {
    let weeks = count_or_one(caps, &[1, 2, 3], 4)?;
    anchored_days(today, i64::from(weeks) * 7)
}

fn resolve_last_months(caps: &Captures<'_>, today: NaiveDate) -> Option<DateRange> {
    let months = count_or_one(caps, &[1, 2, 3], 4)?;
    let this_month = month_start(today.year(), today.month())?;
    let start = this_month.checked_sub_months(Months::new(months))?;
    DateRange::new(start, this_month.pred_opt()?)
}

fn resolve_last_quarter(_caps: &Captures<'_>, today: NaiveDate) -> Option<DateRange> {
    let quarter = (today.month0() / 3) as i32;
    let (year, quarter) = if quarter == 0 {
        (today.year() - 1, 3)
    } else {
        (today.year(), quarter - 1)
    };
    let first_month = (quarter * 3 + 1) as u32;
    let start = month_start(year, first_month)?;
    let end = month_end(year, first_month + 2)?;
    DateRange::new(start, end)
}

fn resolve_last_semester(_caps: &Captures<'_>, today: NaiveDate) -> Option<DateRange> {
    if today.month() <= 6 {
        semester_range(today.year() - 1, 1)
    } else {
        semester_range(today.year(), 0)
    }
}

fn resolve_last_years(caps: &Captures<'_>, today: NaiveDate) -> Option<DateRange> {
    let years = count_or_one(caps, &[1, 2, 3], 4)? as i32;
    DateRange::new(
        year_start(today.year() - years)?,
        year_end(today.year() - 1)?,
    )
}

fn resolve_this_year(_caps: &Captures<'_>, today: NaiveDate) -> Option<DateRange> {
    DateRange::new(year_start(today.year())?, year_end(today.year())?)
}

fn resolve_explicit_year(caps: &Captures<'_>, _today: NaiveDate) -> Option<DateRange> {
    let year = capture_number(caps, 1)? as i32;
    DateRange::new(year_start(year)?, year_end(year)?)
}

// ── Helpers ───────────────────────────────────────────────

fn capture_number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// First numeric group that participated in the match. Zero counts are rejected.
fn first_number(caps: &Captures<'_>, groups: &[usize]) -> Option<u32> {
    let n = groups.iter().find_map(|&g| capture_number(caps, g))?;
    (n > 0).then_some(n)
}

/// Numeric count, or 1 when the singular phrase group matched instead.
fn count_or_one(caps: &Captures<'_>, numeric: &[usize], singular: usize) -> Option<u32> {
    if caps.get(singular).is_some() {
        return Some(1);
    }
    first_number(caps, numeric)
}

fn anchored_days(today: NaiveDate, days: i64) -> Option<DateRange> {
    let start = today.checked_sub_signed(Duration::try_days(days)?)?;
    DateRange::new(start, today)
}

fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    month_start(next_year, next_month)?.pred_opt()
}

fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

fn year_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

/// `half` 0 is January–June, 1 is July–December.
fn semester_range(year: i32, half: u32) -> Option<DateRange> {
    let first_month = half * 6 + 1;
    DateRange::new(month_start(year, first_month)?, month_end(year, first_month + 5)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> Option<DateRange> {
        DateRange::new(start, end)
    }

    fn today() -> NaiveDate {
        date(2024, 5, 15)
    }

    #[test]
    fn last_n_days_is_anchored_to_today() {
        assert_eq!(
            resolve_period("cartas dos últimos 10 dias", today()),
            range(date(2024, 5, 5), today())
        );
        assert_eq!(
            resolve_period("publicadas há 30 dias", today()),
            range(date(2024, 4, 15), today())
        );
        assert_eq!(
            resolve_period("de 3 dias atrás", today()),
            range(date(2024, 5, 12), today())
        );
    }

    #[test]
    fn last_n_weeks_is_anchored_to_today() {
        assert_eq!(
            resolve_period("nas últimas 2 semanas", today()),
            range(date(2024, 5, 1), today())
        );
        assert_eq!(
            resolve_period("semana passada", today()),
            range(date(2024, 5, 8), today())
        );
    }

    #[test]
    fn last_n_months_snaps_to_whole_months() {
        assert_eq!(
            resolve_period("últimos 3 meses", today()),
            range(date(2024, 2, 1), date(2024, 4, 30))
        );
        assert_eq!(
            resolve_period("mês passado", date(2024, 3, 31)),
            range(date(2024, 2, 1), date(2024, 2, 29))
        );
    }

    #[test]
    fn months_cross_year_boundary() {
        assert_eq!(
            resolve_period("ultimos 2 meses", date(2024, 1, 10)),
            range(date(2023, 11, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn last_quarter_is_previous_calendar_quarter() {
        assert_eq!(
            resolve_period("último trimestre", today()),
            range(date(2024, 1, 1), date(2024, 3, 31))
        );
        assert_eq!(
            resolve_period("trimestre passado", date(2024, 2, 1)),
            range(date(2023, 10, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn last_semester_is_previous_half_year() {
        assert_eq!(
            resolve_period("último semestre", today()),
            range(date(2023, 7, 1), date(2023, 12, 31))
        );
        assert_eq!(
            resolve_period("semestre passado", date(2024, 9, 1)),
            range(date(2024, 1, 1), date(2024, 6, 30))
        );
    }

    #[test]
    fn last_years_are_whole_previous_years() {
        assert_eq!(
            resolve_period("ano passado", today()),
            range(date(2023, 1, 1), date(2023, 12, 31))
        );
        assert_eq!(
            resolve_period("últimos 5 anos", today()),
            range(date(2019, 1, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn this_year_spans_calendar_year() {
        for phrase in ["este ano", "neste ano", "deste ano", "ano corrente", "ano atual"] {
            assert_eq!(
                resolve_period(phrase, today()),
                range(date(2024, 1, 1), date(2024, 12, 31)),
                "{phrase}"
            );
        }
    }

    #[test]
    fn explicit_year_and_ranges() {
        assert_eq!(
            resolve_period("cartas de 2019", today()),
            range(date(2019, 1, 1), date(2019, 12, 31))
        );
        assert_eq!(
            resolve_period("publicadas entre 2018 e 2020", today()),
            range(date(2018, 1, 1), date(2020, 12, 31))
        );
        assert_eq!(
            resolve_period("entre 2020 e 2018", today()),
            range(date(2018, 1, 1), date(2020, 12, 31))
        );
        assert_eq!(
            resolve_period("de 2015 até 2017", today()),
            range(date(2015, 1, 1), date(2017, 12, 31))
        );
    }

    #[test]
    fn semester_of_year() {
        assert_eq!(
            resolve_period("primeiro semestre de 2021", today()),
            range(date(2021, 1, 1), date(2021, 6, 30))
        );
        assert_eq!(
            resolve_period("2º semestre de 2022", today()),
            range(date(2022, 7, 1), date(2022, 12, 31))
        );
    }

    #[test]
    fn first_rule_in_priority_order_wins() {
        // Range beats the explicit-year rule that would also match "2018".
        assert_eq!(
            resolve_period("entre 2018 e 2019 ou ano passado", today()),
            range(date(2018, 1, 1), date(2019, 12, 31))
        );
        // Days beat explicit year.
        assert_eq!(
            resolve_period("2015 nos últimos 7 dias", today()),
            range(date(2024, 5, 8), today())
        );
    }

    #[test]
    fn no_phrase_yields_none() {
        assert_eq!(resolve_period("cartas do 5° cgeo", today()), None);
        assert_eq!(resolve_period("MI 2965-2-NE", today()), None);
        assert_eq!(resolve_period("", today()), None);
    }

    #[test]
    fn zero_count_is_ignored() {
        assert_eq!(resolve_period("últimos 0 dias", today()), None);
    }

    #[test]
    fn every_resolved_range_is_ordered() {
        let phrases = [
            "últimos 400 dias",
            "ultimas 52 semanas",
            "últimos 24 meses",
            "último trimestre",
            "último semestre",
            "últimos 10 anos",
            "este ano",
            "2000",
            "entre 2099 e 1900",
            "segundo semestre de 2020",
        ];
        for phrase in phrases {
            let r = resolve_period(phrase, today()).unwrap_or_else(|| panic!("{phrase}"));
            assert!(r.start <= r.end, "{phrase}");
        }
    }

    #[test]
    fn rule_names_follow_priority() {
        let names: Vec<_> = date_rules().iter().map(|r| r.name).collect();
        assert_eq!(names.first(), Some(&"year_range"));
        assert_eq!(names.last(), Some(&"explicit_year"));
        assert_eq!(names.len(), 10);
    }
}
