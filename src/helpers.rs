//! Helper bindings available to every résumé template.
//!
//! | Helper | Example | Output |
//! |--------|---------|--------|
//! | `formatDate` | `{{formatDate startDate}}` | `Jun 2014` |
//! | `formatDate` | `{{formatDate startDate "%Y"}}` | `2014` |
//! | `duration` | `{{duration this}}` | `2 yrs 3 mos` |
//! | `year` | `{{year}}` | `2026` |
//!
//! Résumé dates are partial ISO-8601 (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
//! A missing end date means the position is current.

use chrono::{Datelike, Local, NaiveDate};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::Write as _;

/// Default `formatDate` pattern.
pub const DEFAULT_DATE_FORMAT: &str = "%b %Y";

/// Shown for a missing end date.
pub const PRESENT: &str = "Present";

/// Register `formatDate`, `duration` and `year` on `engine`.
pub fn register_helpers(engine: &mut Handlebars<'_>) {
    engine.register_helper("formatDate", Box::new(format_date_helper));
    engine.register_helper("duration", Box::new(duration_helper));
    engine.register_helper("year", Box::new(year_helper));
}

static RE_PARTIAL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:-(\d{2}))?(?:-(\d{2}))?$").unwrap());

/// Parse a partial ISO-8601 date; missing month/day default to 1.
pub fn parse_partial_date(s: &str) -> Option<NaiveDate> {
    let caps = RE_PARTIAL_DATE.captures(s.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps.get(2).map_or(Some(1), |m| m.as_str().parse().ok())?;
    let day: u32 = caps.get(3).map_or(Some(1), |m| m.as_str().parse().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a partial date with a strftime pattern.
///
/// Unparseable input and invalid patterns fall back to the raw string.
pub fn format_date(raw: Option<&str>, pattern: &str) -> String {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return PRESENT.to_string();
    };
    let Some(date) = parse_partial_date(raw) else {
        return raw.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return raw.to_string();
    }
    out
}

/// Whole months between two dates, never negative.
fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Total months covered by a work/project entry.
///
/// The spans are the entry's `dates` array when present, otherwise its own
/// `startDate`/`endDate`. Spans without a parseable start contribute nothing;
/// a missing end date is `today`.
pub fn calculate_duration(entry: &Value, today: NaiveDate) -> u32 {
    let own_span = [entry];
    let spans: Vec<&Value> = match entry.get("dates").and_then(Value::as_array) {
        Some(dates) => dates.iter().collect(),
        None => own_span.to_vec(),
    };

    spans
        .into_iter()
        .filter_map(|span| {
            let start = span
                .get("startDate")
                .and_then(Value::as_str)
                .and_then(parse_partial_date)?;
            let end = span
                .get("endDate")
                .and_then(Value::as_str)
                .and_then(parse_partial_date)
                .unwrap_or(today);
            Some(months_between(start, end))
        })
        .sum()
}

/// `27` → `"2 yrs 3 mos"`.
pub fn format_months(months: u32) -> String {
    let (years, rest) = (months / 12, months % 12);
    let unit = |n: u32, one: &str, many: &str| format!("{n} {}", if n == 1 { one } else { many });
    match (years, rest) {
        (0, 0) => "less than a month".to_string(),
        (0, m) => unit(m, "mo", "mos"),
        (y, 0) => unit(y, "yr", "yrs"),
        (y, m) => format!("{} {}", unit(y, "yr", "yrs"), unit(m, "mo", "mos")),
    }
}

fn format_date_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let raw = h.param(0).and_then(|p| p.value().as_str());
    let pattern = h
        .param(1)
        .and_then(|p| p.value().as_str())
        .unwrap_or(DEFAULT_DATE_FORMAT);
    out.write(&format_date(raw, pattern))?;
    Ok(())
}

fn duration_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let months = h
        .param(0)
        .map(|p| calculate_duration(p.value(), Local::now().date_naive()))
        .unwrap_or(0);
    out.write(&format_months(months))?;
    Ok(())
}

fn year_helper(
    _: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&Local::now().year().to_string())?;
    Ok(())
}
