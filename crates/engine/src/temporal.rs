//! Calendar and duration values of the XSD type system.
//!
//! Years may be negative and longer than four digits (within chrono's range).
//! A timezone is stored exactly as written; an absent timezone stays absent.

use core::fmt;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike};
use crate::decimal::XsDecimal;
use crate::lexical::LexicalError;

type Tz = Option<FixedOffset>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDateTime {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDate {
    pub date: NaiveDate,
    pub tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsTime {
    pub time: NaiveTime,
    pub tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GYearMonth {
    pub year: i32,
    pub month: u32,
    pub tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GYear {
    pub year: i32,
    pub tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GMonthDay {
    pub month: u32,
    pub day: u32,
    pub tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GDay {
    pub day: u32,
    pub tz: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GMonth {
    pub month: u32,
    pub tz: Tz,
}

/// `xs:duration`. Components are kept as written; no carrying between fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct XsDuration {
    pub negative: bool,
    pub years: u64,
    pub months: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: XsDecimal,
}

impl XsDuration {
    /// `1` or `-1`, or `0` for the zero duration.
    pub fn sign(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds.is_zero()
    }
}

// ===== Parsing =====

/// Splits a trailing `Z` or `±hh:mm` off `s`.
fn split_timezone(s: &str) -> Result<(&str, Tz), LexicalError> {
    if let Some(rest) = s.strip_suffix('Z') {
        return Ok((rest, FixedOffset::east_opt(0)));
    }
    if s.len() >= 6 && s.is_char_boundary(s.len() - 6) {
        let (rest, tz) = s.split_at(s.len() - 6);
        let b = tz.as_bytes();
        if matches!(b[0], b'+' | b'-') && b[3] == b':' {
            return Ok((rest, Some(parse_offset(tz)?)));
        }
    }
    Ok((s, None))
}

fn parse_offset(tz: &str) -> Result<FixedOffset, LexicalError> {
    let hours = fixed_digits(&tz[1..3])?;
    let mins = fixed_digits(&tz[4..6])?;
    if hours > 14 || mins > 59 || (hours == 14 && mins != 0) {
        return Err(LexicalError::Invalid);
    }
    let total = i32::try_from(hours * 3600 + mins * 60).map_err(|_| LexicalError::Invalid)?;
    let secs = if tz.starts_with('-') { -total } else { total };
    FixedOffset::east_opt(secs).ok_or(LexicalError::Invalid)
}

fn fixed_digits(s: &str) -> Result<u32, LexicalError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LexicalError::Invalid);
    }
    s.parse().map_err(|_| LexicalError::Overflow)
}

/// `-?YYYY+`, no leading zeros beyond four digits, year zero rejected.
fn parse_year(s: &str) -> Result<i32, LexicalError> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, s),
    };
    if digits.len() < 4 || (digits.len() > 4 && digits.starts_with('0')) {
        return Err(LexicalError::Invalid);
    }
    let year = i32::try_from(fixed_digits(digits)?).map_err(|_| LexicalError::Overflow)?;
    if year == 0 {
        return Err(LexicalError::Invalid);
    }
    Ok(if negative { -year } else { year })
}

/// Splits `year-rest` where the year itself may carry a leading minus.
fn split_year(s: &str) -> Result<(i32, &str), LexicalError> {
    let start = usize::from(s.starts_with('-'));
    let pos = s[start..]
        .find('-')
        .map(|p| p + start)
        .ok_or(LexicalError::Invalid)?;
    Ok((parse_year(&s[..pos])?, &s[pos + 1..]))
}

fn two_digits(s: &str) -> Result<u32, LexicalError> {
    if s.len() != 2 {
        return Err(LexicalError::Invalid);
    }
    fixed_digits(s)
}

fn make_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, LexicalError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(LexicalError::Invalid)
}

fn parse_date_part(s: &str) -> Result<NaiveDate, LexicalError> {
    let (year, rest) = split_year(s)?;
    let (month, day) = rest.split_once('-').ok_or(LexicalError::Invalid)?;
    make_date(year, two_digits(month)?, two_digits(day)?)
}

/// Returns the time and whether it was the end-of-day form `24:00:00`.
fn parse_time_part(s: &str) -> Result<(NaiveTime, bool), LexicalError> {
    let b = s.as_bytes();
    if b.len() < 8 || !b[..8].is_ascii() || b[2] != b':' || b[5] != b':' {
        return Err(LexicalError::Invalid);
    }
    let hour = two_digits(&s[0..2])?;
    let minute = two_digits(&s[3..5])?;
    let second = two_digits(&s[6..8])?;
    let nanos = match &s[8..] {
        "" => 0,
        frac => parse_fraction(frac)?,
    };
    if hour == 24 {
        if minute != 0 || second != 0 || nanos != 0 {
            return Err(LexicalError::Invalid);
        }
        return Ok((NaiveTime::default(), true));
    }
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .map(|t| (t, false))
        .ok_or(LexicalError::Invalid)
}

/// `.ddd` to nanoseconds. Digits past the ninth must be zero.
fn parse_fraction(frac: &str) -> Result<u32, LexicalError> {
    let digits = frac.strip_prefix('.').ok_or(LexicalError::Invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LexicalError::Invalid);
    }
    let (kept, rest) = digits.split_at(digits.len().min(9));
    if rest.bytes().any(|b| b != b'0') {
        return Err(LexicalError::Overflow);
    }
    let mut nanos: u32 = kept.parse().map_err(|_| LexicalError::Invalid)?;
    for _ in kept.len()..9 {
        nanos *= 10;
    }
    Ok(nanos)
}

pub fn parse_date_time(s: &str) -> Result<XsDateTime, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    let (date, time) = body.split_once('T').ok_or(LexicalError::Invalid)?;
    let mut date = parse_date_part(date)?;
    let (time, end_of_day) = parse_time_part(time)?;
    if end_of_day {
        date = date.succ_opt().ok_or(LexicalError::Overflow)?;
    }
    Ok(XsDateTime { date, time, tz })
}

pub fn parse_date(s: &str) -> Result<XsDate, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    Ok(XsDate {
        date: parse_date_part(body)?,
        tz,
    })
}

pub fn parse_time(s: &str) -> Result<XsTime, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    let (time, _) = parse_time_part(body)?;
    Ok(XsTime { time, tz })
}

pub fn parse_g_year_month(s: &str) -> Result<GYearMonth, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    let (year, month) = split_year(body)?;
    let month = two_digits(month)?;
    if !(1..=12).contains(&month) {
        return Err(LexicalError::Invalid);
    }
    Ok(GYearMonth { year, month, tz })
}

pub fn parse_g_year(s: &str) -> Result<GYear, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    Ok(GYear {
        year: parse_year(body)?,
        tz,
    })
}

pub fn parse_g_month_day(s: &str) -> Result<GMonthDay, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    let rest = body.strip_prefix("--").ok_or(LexicalError::Invalid)?;
    let (month, day) = rest.split_once('-').ok_or(LexicalError::Invalid)?;
    let (month, day) = (two_digits(month)?, two_digits(day)?);
    // validated against a leap year so that --02-29 is accepted
    make_date(2000, month, day)?;
    Ok(GMonthDay { month, day, tz })
}

pub fn parse_g_day(s: &str) -> Result<GDay, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    let day = two_digits(body.strip_prefix("---").ok_or(LexicalError::Invalid)?)?;
    if !(1..=31).contains(&day) {
        return Err(LexicalError::Invalid);
    }
    Ok(GDay { day, tz })
}

pub fn parse_g_month(s: &str) -> Result<GMonth, LexicalError> {
    let (body, tz) = split_timezone(s)?;
    let month = two_digits(body.strip_prefix("--").ok_or(LexicalError::Invalid)?)?;
    if !(1..=12).contains(&month) {
        return Err(LexicalError::Invalid);
    }
    Ok(GMonth { month, tz })
}

/// `-?PnYnMnDTnHnMnS`
pub fn parse_duration(s: &str) -> Result<XsDuration, LexicalError> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(b) => (true, b),
        None => (false, s),
    };
    let body = body.strip_prefix('P').ok_or(LexicalError::Invalid)?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((_, "")) => return Err(LexicalError::Invalid),
        Some((d, t)) => (d, Some(t)),
        None => (body, None),
    };

    let mut out = XsDuration {
        negative,
        ..XsDuration::default()
    };
    let mut any = false;

    let mut cur = date_part;
    for (designator, slot) in [('Y', &mut out.years), ('M', &mut out.months), ('D', &mut out.days)] {
        if let Some((num, rest)) = take_component(cur, designator) {
            *slot = parse_count(num)?;
            cur = rest;
            any = true;
        }
    }
    if !cur.is_empty() {
        return Err(LexicalError::Invalid);
    }

    if let Some(mut cur) = time_part {
        for (designator, slot) in [('H', &mut out.hours), ('M', &mut out.minutes)] {
            if let Some((num, rest)) = take_component(cur, designator) {
                *slot = parse_count(num)?;
                cur = rest;
                any = true;
            }
        }
        if let Some(num) = cur.strip_suffix('S') {
            if !crate::lexical::is_decimal_lexical(num) || num.starts_with(['+', '-']) {
                return Err(LexicalError::Invalid);
            }
            out.seconds = num.parse()?;
            cur = "";
            any = true;
        }
        if !cur.is_empty() {
            return Err(LexicalError::Invalid);
        }
    }

    if any { Ok(out) } else { Err(LexicalError::Invalid) }
}

/// Leading `\d+<designator>` of `s`, if present.
fn take_component(s: &str, designator: char) -> Option<(&str, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !s[digits..].starts_with(designator) {
        return None;
    }
    Some((&s[..digits], &s[digits + 1..]))
}

fn parse_count(num: &str) -> Result<u64, LexicalError> {
    num.parse().map_err(|_| LexicalError::Overflow)
}

// ===== Canonical forms =====

fn fmt_year(f: &mut fmt::Formatter<'_>, year: i32) -> fmt::Result {
    if year < 0 {
        write!(f, "-{:04}", year.unsigned_abs())
    } else {
        write!(f, "{year:04}")
    }
}

fn fmt_tz(f: &mut fmt::Formatter<'_>, tz: Tz) -> fmt::Result {
    let Some(off) = tz else {
        return Ok(());
    };
    let secs = off.local_minus_utc();
    if secs == 0 {
        return f.write_str("Z");
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.unsigned_abs();
    write!(f, "{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

fn fmt_time(f: &mut fmt::Formatter<'_>, time: NaiveTime) -> fmt::Result {
    write!(f, "{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())?;
    let nanos = time.nanosecond();
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        write!(f, ".{}", frac.trim_end_matches('0'))?;
    }
    Ok(())
}

fn fmt_date(f: &mut fmt::Formatter<'_>, date: NaiveDate) -> fmt::Result {
    fmt_year(f, date.year())?;
    write!(f, "-{:02}-{:02}", date.month(), date.day())
}

impl fmt::Display for XsDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_date(f, self.date)?;
        f.write_str("T")?;
        fmt_time(f, self.time)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for XsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_date(f, self.date)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for XsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_time(f, self.time)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for GYearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_year(f, self.year)?;
        write!(f, "-{:02}", self.month)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for GYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_year(f, self.year)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for GMonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{:02}-{:02}", self.month, self.day)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for GDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "---{:02}", self.day)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for GMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{:02}", self.month)?;
        fmt_tz(f, self.tz)
    }
}

impl fmt::Display for XsDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("PT0S");
        }
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        for (n, d) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if n != 0 {
                write!(f, "{n}{d}")?;
            }
        }
        if self.hours != 0 || self.minutes != 0 || !self.seconds.is_zero() {
            f.write_str("T")?;
            for (n, d) in [(self.hours, 'H'), (self.minutes, 'M')] {
                if n != 0 {
                    write!(f, "{n}{d}")?;
                }
            }
            if !self.seconds.is_zero() {
                write!(f, "{}S", self.seconds)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time_keeps_zone_as_given() {
        let dt = parse_date_time("2001-11-26T21:32:52Z").unwrap();
        assert_eq!(dt.tz.map(|o| o.local_minus_utc()), Some(0));
        assert_eq!(dt.to_string(), "2001-11-26T21:32:52Z");

        let local = parse_date_time("2001-11-26T21:32:52").unwrap();
        assert_eq!(local.tz, None);
        assert_eq!(local.to_string(), "2001-11-26T21:32:52");

        let east = parse_date_time("2001-11-26T21:32:52.125+05:30").unwrap();
        assert_eq!(east.to_string(), "2001-11-26T21:32:52.125+05:30");
    }

    #[test]
    fn end_of_day_rolls_over() {
        let dt = parse_date_time("1999-12-31T24:00:00").unwrap();
        assert_eq!(dt.to_string(), "2000-01-01T00:00:00");
        assert!(parse_date_time("1999-12-31T24:00:01").is_err());
        assert_eq!(parse_time("24:00:00").unwrap().to_string(), "00:00:00");
    }

    #[test]
    fn rejects_malformed_dates() {
        for bad in [
            "01-11-26",
            "2001-13-01",
            "2001-02-29",
            "0000-01-01",
            "02001-01-01",
            "2001-1-01",
            "2001-01-01+15:00",
            "2001-01-01T",
        ] {
            assert!(parse_date(bad).is_err(), "{bad}");
        }
        assert_eq!(parse_date("-0044-03-15").unwrap().to_string(), "-0044-03-15");
        assert_eq!(parse_date("12345-01-01").unwrap().to_string(), "12345-01-01");
    }

    #[test]
    fn gregorian_fragments() {
        assert_eq!(parse_g_year_month("2001-11").unwrap().to_string(), "2001-11");
        assert_eq!(parse_g_year("2001-05:00").unwrap().to_string(), "2001-05:00");
        assert_eq!(parse_g_month_day("--02-29").unwrap().to_string(), "--02-29");
        assert!(parse_g_month_day("--02-30").is_err());
        assert_eq!(parse_g_day("---31Z").unwrap().to_string(), "---31Z");
        assert_eq!(parse_g_month("--12").unwrap().to_string(), "--12");
        assert!(parse_g_month("--13").is_err());
    }

    #[test]
    fn fraction_precision() {
        let t = parse_time("10:00:00.123456789").unwrap();
        assert_eq!(t.time.nanosecond(), 123_456_789);
        assert!(parse_time("10:00:00.1234567890").is_ok());
        assert_eq!(parse_time("10:00:00.1234567891"), Err(LexicalError::Overflow));
        assert!(parse_time("10:00:00.").is_err());
        assert!(parse_time("10:00:60").is_err());
    }

    #[test]
    fn durations() {
        let d = parse_duration("-PT7S").unwrap();
        assert_eq!(d.sign(), -1);
        assert_eq!(d.seconds, XsDecimal::from(7i64));
        assert_eq!(d.to_string(), "-PT7S");

        let full = parse_duration("P1Y2M3DT4H5M6.5S").unwrap();
        assert_eq!(full.to_string(), "P1Y2M3DT4H5M6.5S");

        assert_eq!(parse_duration("P0D").unwrap().to_string(), "PT0S");
        for bad in ["P", "PT", "P1Y2MT", "1Y", "P-1Y", "P1S", "PT1D", "P1M1Y", "PT1.S1M"] {
            assert!(parse_duration(bad).is_err(), "{bad}");
        }
    }
}
