//! Date, time, and age payload grammars

use chrono::NaiveDate;

use crate::registry::SchemaRegistry;
use crate::schema::{is_extension_tag, CalendarSchema};
use crate::version::GedcomVersion;

type Check = Result<(), String>;

const GREGORIAN: &str = "GREGORIAN";

fn month_number(calendar: &CalendarSchema, tag: &str) -> Option<u32> {
    calendar
        .months
        .iter()
        .position(|m| m == tag)
        .map(|i| i as u32 + 1)
}

/// `day month year` with a real-calendar confirmation against the
/// Gregorian calendar (all version-legal calendars default to Gregorian).
pub(crate) fn check_date_exact(
    registry: &SchemaRegistry,
    version: GedcomVersion,
    payload: &str,
) -> Check {
    let tokens: Vec<&str> = payload.split_whitespace().collect();
    let [day, month, year] = tokens.as_slice() else {
        return Err(format!("'{payload}' is not an exact date"));
    };
    let day: u32 = day
        .parse()
        .map_err(|_| format!("day '{day}' is not a number"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| format!("year '{year}' is not a number"))?;
    let calendar = registry
        .calendar(version, GREGORIAN)
        .ok_or_else(|| "no Gregorian calendar loaded".to_string())?;
    let month = month_number(&calendar, month).ok_or_else(|| format!("unknown month '{month}'"))?;
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(format!("'{payload}' is not a real calendar date"));
    }
    Ok(())
}

/// Plain date, period, range, or approximation. The period keywords are
/// recognized before a plain-date parse is attempted so that `FROM`/`TO`
/// never mis-tokenizes as a month.
pub(crate) fn check_date_value(
    registry: &SchemaRegistry,
    version: GedcomVersion,
    payload: &str,
) -> Check {
    let payload = payload.trim();
    let first = payload.split_whitespace().next().unwrap_or("");
    match first {
        "FROM" | "TO" => check_date_period(registry, version, payload),
        "BEF" | "AFT" => {
            let rest = payload[first.len()..].trim_start();
            check_date(registry, version, rest)
        }
        "BET" => {
            let rest = payload[first.len()..].trim_start();
            let (a, b) = rest
                .split_once(" AND ")
                .ok_or_else(|| format!("'{payload}' is missing AND"))?;
            check_date(registry, version, a)?;
            check_date(registry, version, b)
        }
        "ABT" | "CAL" | "EST" => {
            let rest = payload[first.len()..].trim_start();
            check_date(registry, version, rest)
        }
        _ => check_date(registry, version, payload),
    }
}

/// `FROM x`, `TO x`, `FROM x TO y`
pub(crate) fn check_date_period(
    registry: &SchemaRegistry,
    version: GedcomVersion,
    payload: &str,
) -> Check {
    let payload = payload.trim();
    if let Some(rest) = payload.strip_prefix("FROM ") {
        return match rest.split_once(" TO ") {
            Some((a, b)) => {
                check_date(registry, version, a)?;
                check_date(registry, version, b)
            }
            None => check_date(registry, version, rest),
        };
    }
    if let Some(rest) = payload.strip_prefix("TO ") {
        return check_date(registry, version, rest);
    }
    Err(format!("'{payload}' is not a date period"))
}

/// Bare date: `[calendar ] [[day ]month ]year[/alt-year][ epoch]`.
/// Extension-prefixed calendar tokens bypass further checking.
fn check_date(registry: &SchemaRegistry, version: GedcomVersion, payload: &str) -> Check {
    let mut tokens: Vec<&str> = payload.split_whitespace().collect();
    if tokens.is_empty() {
        return Err("empty date".to_string());
    }

    if is_extension_tag(tokens[0]) {
        return Ok(());
    }
    let calendar = match registry.calendar(version, tokens[0]) {
        Some(cal) => {
            tokens.remove(0);
            cal
        }
        None => registry
            .calendar(version, GREGORIAN)
            .ok_or_else(|| "no Gregorian calendar loaded".to_string())?,
    };
    if tokens.is_empty() {
        return Err("calendar with no date".to_string());
    }

    // Epoch is consumed from the end, which keeps `year epoch` and
    // `month year` unambiguous.
    if let Some(last) = tokens.last() {
        if calendar.has_epoch(last) || is_extension_tag(last) {
            tokens.pop();
        }
    }

    match tokens.as_slice() {
        [year] => check_year(version, year),
        [month, year] => {
            check_month(&calendar, month)?;
            check_year(version, year)
        }
        [day, month, year] => {
            let day: u32 = day
                .parse()
                .map_err(|_| format!("day '{day}' is not a number"))?;
            if day == 0 || day > 36 {
                return Err(format!("day {day} is out of range"));
            }
            check_month(&calendar, month)?;
            check_year(version, year)
        }
        _ => Err(format!("'{payload}' is not a date")),
    }
}

fn check_month(calendar: &CalendarSchema, month: &str) -> Check {
    if is_extension_tag(month) || calendar.has_month(month) {
        Ok(())
    } else {
        Err(format!(
            "'{month}' is not a month of the {} calendar",
            calendar.standard_tag
        ))
    }
}

/// `year[/alt-year]`; the 5.5.1 dual year requires the two-digit suffix to
/// equal (year+1) mod 100.
fn check_year(version: GedcomVersion, token: &str) -> Check {
    let (year, alt) = match token.split_once('/') {
        Some((y, alt)) => (y, Some(alt)),
        None => (token, None),
    };
    let year: u32 = year
        .parse()
        .map_err(|_| format!("year '{year}' is not a number"))?;
    if let Some(alt) = alt {
        if alt.len() != 2 || !alt.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("alternate year '{alt}' is not two digits"));
        }
        if version == GedcomVersion::V551 {
            let expected = (year + 1) % 100;
            let alt: u32 = alt.parse().map_err(|_| "bad alternate year".to_string())?;
            if alt != expected {
                return Err(format!(
                    "alternate year {alt:02} does not follow {year} (expected {expected:02})"
                ));
            }
        }
    }
    Ok(())
}

/// `H:MM[:SS[.fraction]][Z]` with hour 0-23
pub(crate) fn check_time(payload: &str) -> Check {
    let bare = payload.strip_suffix('Z').unwrap_or(payload);
    let parts: Vec<&str> = bare.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("'{payload}' is not a time of day"));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| format!("hour '{}' is not a number", parts[0]))?;
    if parts[0].is_empty() || parts[0].len() > 2 || hour > 23 {
        return Err(format!("hour {} is out of range", parts[0]));
    }
    check_sexagesimal(parts[1], "minute")?;
    if let Some(seconds) = parts.get(2) {
        let whole = match seconds.split_once('.') {
            Some((whole, fraction)) => {
                if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
                    return Err(format!("'{seconds}' has a malformed fraction"));
                }
                whole
            }
            None => seconds,
        };
        check_sexagesimal(whole, "second")?;
    }
    Ok(())
}

fn check_sexagesimal(token: &str, unit: &str) -> Check {
    if token.len() != 2 || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{unit} '{token}' is not two digits"));
    }
    let value: u32 = token.parse().map_err(|_| format!("bad {unit}"))?;
    if value > 59 {
        return Err(format!("{unit} {value} is out of range"));
    }
    Ok(())
}

const AGE_KEYWORDS: [&str; 3] = ["child", "infant", "stillborn"];

/// Duration tokens in descending units with an optional leading comparison
/// marker; 5.5.1 additionally accepts a small keyword set.
pub(crate) fn check_age(version: GedcomVersion, payload: &str) -> Check {
    let mut value = payload.trim();
    if version == GedcomVersion::V551 && AGE_KEYWORDS.contains(&value.to_lowercase().as_str()) {
        return Ok(());
    }
    if let Some(rest) = value.strip_prefix(['>', '<']) {
        value = rest.trim_start();
    }

    let mut last_rank = 5u8;
    let mut seen = false;
    for token in value.split_whitespace() {
        let Some(unit) = token.chars().last() else {
            continue;
        };
        let digits = &token[..token.len() - unit.len_utf8()];
        let rank = match unit {
            'y' => 4,
            'm' => 3,
            'w' => 2,
            'd' => 1,
            _ => return Err(format!("'{token}' is not an age duration")),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("'{token}' is not an age duration"));
        }
        if rank >= last_rank {
            return Err(format!("age units out of order at '{token}'"));
        }
        last_rank = rank;
        seen = true;
    }
    if !seen {
        return Err(format!("'{payload}' is not an age"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::builtin::standard_registry;

    fn registry(version: GedcomVersion) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.load_all(version, &standard_registry()).unwrap();
        registry
    }

    #[test]
    fn test_date_exact() {
        let r = registry(GedcomVersion::V70);
        assert!(check_date_exact(&r, GedcomVersion::V70, "1 JAN 2000").is_ok());
        assert!(check_date_exact(&r, GedcomVersion::V70, "29 FEB 2000").is_ok());
        // Not a real calendar date
        assert!(check_date_exact(&r, GedcomVersion::V70, "30 FEB 2000").is_err());
        assert!(check_date_exact(&r, GedcomVersion::V70, "JAN 2000").is_err());
        assert!(check_date_exact(&r, GedcomVersion::V70, "1 FOO 2000").is_err());
    }

    #[test]
    fn test_date_value_forms() {
        let r = registry(GedcomVersion::V70);
        let v = GedcomVersion::V70;
        for good in [
            "1990",
            "JAN 1990",
            "15 JAN 1990",
            "GREGORIAN 15 JAN 1990",
            "JULIAN 44 BCE",
            "FROM 1900 TO 1910",
            "FROM 1900",
            "TO 12 DEC 1910",
            "BEF 1950",
            "AFT 3 MAR 1922",
            "BET 1900 AND 1910",
            "ABT 1875",
            "CAL 14 APR 1865",
            "EST 1900",
            "36 JAN 1990",
            "_FRENCH 13 VEND 8",
        ] {
            assert!(check_date_value(&r, v, good).is_ok(), "rejected: {good}");
        }
        for bad in [
            "JANUARY 1990",
            "37 JAN 1990",
            "0 JAN 1990",
            "BET 1900 1910",
            "FROM",
            "1 2 3 4",
            "15 JAN year",
        ] {
            assert!(check_date_value(&r, v, bad).is_err(), "accepted: {bad}");
        }
    }

    #[test]
    fn test_period_keyword_wins_over_month_parse() {
        let r = registry(GedcomVersion::V70);
        // "TO" must not be consumed as a month token
        assert!(check_date_value(&r, GedcomVersion::V70, "TO 1900").is_ok());
        assert!(check_date_period(&r, GedcomVersion::V70, "1900").is_err());
    }

    #[test]
    fn test_dual_year_rule_is_551_only() {
        let r551 = registry(GedcomVersion::V551);
        assert!(check_date_value(&r551, GedcomVersion::V551, "1699/00").is_ok());
        assert!(check_date_value(&r551, GedcomVersion::V551, "1699/01").is_err());

        let r70 = registry(GedcomVersion::V70);
        assert!(check_date_value(&r70, GedcomVersion::V70, "1699/17").is_ok());
    }

    #[test]
    fn test_time() {
        for good in ["0:00", "12:34", "23:59:59", "7:45:30.25", "10:00Z"] {
            assert!(check_time(good).is_ok(), "rejected: {good}");
        }
        for bad in ["24:00", "12", "12:5", "12:60", "12:00:61", "12:00:30.", "ab:cd"] {
            assert!(check_time(bad).is_err(), "accepted: {bad}");
        }
    }

    #[test]
    fn test_age() {
        let v7 = GedcomVersion::V70;
        for good in ["73y", "4m 8d", "> 8y 3m", "< 1d", "1y 2m 3w 4d"] {
            assert!(check_age(v7, good).is_ok(), "rejected: {good}");
        }
        for bad in ["", "3m 8y", "8", "8q", "y8"] {
            assert!(check_age(v7, bad).is_err(), "accepted: {bad}");
        }
        // Keywords are 5.5.1-only, case-insensitive
        assert!(check_age(GedcomVersion::V551, "CHILD").is_ok());
        assert!(check_age(GedcomVersion::V551, "stillborn").is_ok());
        assert!(check_age(v7, "CHILD").is_err());
    }
}
