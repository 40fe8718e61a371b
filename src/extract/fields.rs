use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Month, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::StatementParseError;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}) (\p{L}{3})$").expect("valid date regex"));

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$").expect("valid amount regex")
});

static CARD_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)[•●·*]{2,} ?(\d{4})$").expect("valid card header regex")
});

static INLINE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2} \p{L}{3}) (.+)$").expect("valid inline row regex"));

const CURRENCY_PREFIXES: &[&str] = &["US$", "R$", "$", "€"];

const SIGNS: &[&str] = &["-", "\u{2212}", "\u{2013}"];

/// Collapses every run of whitespace (NBSP included) into one space and trims.
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A purchase date as printed on the statement: day and abbreviated month,
/// no year.
///
/// The printed text is kept verbatim and is what gets serialized. Month
/// abbreviations are recognised in English and Portuguese, in any case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementDate {
    raw: String,
    day: u32,
    month: Month,
}

impl StatementDate {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// Pins the date to a calendar year. `None` when the day does not exist
    /// in that year (e.g. "29 FEV" outside leap years).
    pub fn with_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month.number_from_month(), self.day)
    }
}

fn month_from_abbreviation(abbr: &str) -> Option<Month> {
    let month = match abbr.to_uppercase().as_str() {
        "JAN" => Month::January,
        "FEB" | "FEV" => Month::February,
        "MAR" => Month::March,
        "APR" | "ABR" => Month::April,
        "MAY" | "MAI" => Month::May,
        "JUN" => Month::June,
        "JUL" => Month::July,
        "AUG" | "AGO" => Month::August,
        "SEP" | "SET" => Month::September,
        "OCT" | "OUT" => Month::October,
        "NOV" => Month::November,
        "DEC" | "DEZ" => Month::December,
        _ => return None,
    };
    Some(month)
}

impl FromStr for StatementDate {
    type Err = StatementParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = normalize_whitespace(value);
        let invalid = || StatementParseError::DateInvalidFormat(raw.clone());

        let caps = DATE.captures(&raw).ok_or_else(invalid)?;
        let day: u32 = caps[1].parse().map_err(|_| invalid())?;
        let month = month_from_abbreviation(&caps[2]).ok_or_else(invalid)?;

        if !(1..=31).contains(&day) {
            return Err(invalid());
        }

        Ok(StatementDate { raw, day, month })
    }
}

impl fmt::Display for StatementDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for StatementDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for StatementDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses an amount written in the statement's notation: optional currency
/// symbol, `.` thousands separator, `,` decimal separator, sign before or
/// after the symbol or trailing.
pub fn parse_amount(value: &str) -> Result<Decimal, StatementParseError> {
    let invalid = || StatementParseError::AmountInvalidFormat(value.trim().to_string());

    let mut rest = normalize_whitespace(value);
    let mut negative = false;

    for _ in 0..2 {
        if let Some(stripped) = strip_sign(&rest) {
            negative = !negative;
            rest = stripped.trim_start().to_string();
        }
        if let Some(stripped) = CURRENCY_PREFIXES.iter().find_map(|p| rest.strip_prefix(p)) {
            rest = stripped.trim_start().to_string();
        }
    }
    if let Some(stripped) = rest.strip_suffix('-') {
        negative = !negative;
        rest = stripped.trim_end().to_string();
    }

    if !AMOUNT.is_match(&rest) {
        return Err(invalid());
    }

    let canonical = rest.replace('.', "").replace(',', ".");
    let amount = Decimal::from_str(&canonical).map_err(|_| invalid())?;

    Ok(if negative { -amount } else { amount })
}

fn strip_sign(value: &str) -> Option<&str> {
    value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('\u{2212}'))
        .or_else(|| value.strip_prefix('\u{2013}'))
}

/// Splits a row printed on a single line, "01 JAN Uber *Trip R$ 12,50", into
/// date, description and amount, plus a running total when one follows the
/// amount.
///
/// Amount tokens must carry decimal cents, so a description ending in a
/// number ("Parcela 2") is never mistaken for an amount. Returns `None` when
/// the line does not have that shape.
pub fn split_inline_row(line: &str) -> Option<Vec<String>> {
    let caps = INLINE_ROW.captures(line)?;
    let date = caps.get(1)?.as_str();
    date.parse::<StatementDate>().ok()?;

    let mut tokens: Vec<&str> = caps.get(2)?.as_str().split(' ').collect();
    let last = take_amount(&mut tokens)?;
    let before_last = if tokens.len() > 1 { take_amount(&mut tokens) } else { None };

    if tokens
        .iter()
        .all(|token| CURRENCY_PREFIXES.contains(token) || SIGNS.contains(token))
    {
        return None;
    }
    let description = tokens.join(" ");

    let mut fields = vec![date.to_string(), description];
    match before_last {
        Some(amount) => fields.extend([amount, last]),
        None => fields.push(last),
    }
    Some(fields)
}

/// Pops a trailing amount token, with its currency symbol and sign tokens.
fn take_amount(tokens: &mut Vec<&str>) -> Option<String> {
    let value = *tokens.last()?;
    if !has_cents(value) || parse_amount(value).is_err() {
        return None;
    }
    let mut start = tokens.len() - 1;

    for _ in 0..2 {
        if start > 1 && (CURRENCY_PREFIXES.contains(&tokens[start - 1]) || SIGNS.contains(&tokens[start - 1])) {
            start -= 1;
        }
    }

    let amount = tokens.split_off(start).join(" ");
    Some(amount)
}

fn has_cents(value: &str) -> bool {
    let digits = value.trim_end_matches('-');
    digits
        .rsplit_once(',')
        .is_some_and(|(_, cents)| !cents.is_empty() && cents.chars().all(|c| c.is_ascii_digit()))
}

/// Card identifier carried by a section header line such as "Card ••1234"
/// or "•••• 1234".
pub fn parse_card_header(line: &str) -> Option<String> {
    CARD_HEADER.captures(line).map(|caps| caps[1].to_string())
}
