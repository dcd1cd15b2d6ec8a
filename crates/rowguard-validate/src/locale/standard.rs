//! Built-in locale formats for `en-US`, `en-GB`, `de-DE` and `fr-FR`.

use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use rowguard_model::ColumnType;

use super::{LocaleChecker, LocaleProvider, LocaleTypeCheck, SubError};
use crate::rules::ISO_DATE_REGEX;

static SLASH_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid date regex"));

static DOT_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("Invalid date regex"));

#[derive(Debug, Clone, Copy)]
enum DateShape {
    Slash,
    Dot,
}

impl DateShape {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Slash => &SLASH_DATE_REGEX,
            Self::Dot => &DOT_DATE_REGEX,
        }
    }
}

#[derive(Debug)]
struct LocaleFormat {
    id: &'static str,
    decimal: char,
    groups: &'static [char],
    number_example: &'static str,
    date_shape: DateShape,
    date_format: &'static str,
    date_label: &'static str,
    true_words: &'static [&'static str],
    false_words: &'static [&'static str],
    currency_symbols: &'static [&'static str],
    phone_digits: (usize, usize),
}

// Language-only ids resolve to the first entry for that language.
static LOCALES: &[LocaleFormat] = &[
    LocaleFormat {
        id: "en-US",
        decimal: '.',
        groups: &[','],
        number_example: "1,234.56",
        date_shape: DateShape::Slash,
        date_format: "%m/%d/%Y",
        date_label: "MM/DD/YYYY",
        true_words: &["true", "yes", "y", "1"],
        false_words: &["false", "no", "n", "0"],
        currency_symbols: &["US$", "$", "USD"],
        phone_digits: (10, 11),
    },
    LocaleFormat {
        id: "en-GB",
        decimal: '.',
        groups: &[','],
        number_example: "1,234.56",
        date_shape: DateShape::Slash,
        date_format: "%d/%m/%Y",
        date_label: "DD/MM/YYYY",
        true_words: &["true", "yes", "y", "1"],
        false_words: &["false", "no", "n", "0"],
        currency_symbols: &["£", "GBP"],
        phone_digits: (10, 13),
    },
    LocaleFormat {
        id: "de-DE",
        decimal: ',',
        groups: &['.'],
        number_example: "1.234,56",
        date_shape: DateShape::Dot,
        date_format: "%d.%m.%Y",
        date_label: "TT.MM.JJJJ",
        true_words: &["wahr", "ja", "j", "true", "1"],
        false_words: &["falsch", "nein", "n", "false", "0"],
        currency_symbols: &["€", "EUR"],
        phone_digits: (7, 15),
    },
    LocaleFormat {
        id: "fr-FR",
        decimal: ',',
        groups: &[' ', '\u{a0}', '\u{202f}'],
        number_example: "1 234,56",
        date_shape: DateShape::Slash,
        date_format: "%d/%m/%Y",
        date_label: "JJ/MM/AAAA",
        true_words: &["vrai", "oui", "o", "true", "1"],
        false_words: &["faux", "non", "n", "false", "0"],
        currency_symbols: &["€", "EUR"],
        phone_digits: (9, 13),
    },
];

fn resolve(locale: &str) -> Option<&'static LocaleFormat> {
    let normalized = locale.trim().replace('_', "-");
    if let Some(format) = LOCALES
        .iter()
        .find(|format| format.id.eq_ignore_ascii_case(&normalized))
    {
        return Some(format);
    }
    if normalized.contains('-') {
        return None;
    }
    LOCALES.iter().find(|format| {
        format
            .id
            .split('-')
            .next()
            .is_some_and(|language| language.eq_ignore_ascii_case(&normalized))
    })
}

#[derive(Debug, Clone, Copy)]
enum CheckKind {
    Number,
    Date,
    Boolean,
    Phone,
    Currency,
}

/// Checker bound to one column.
#[derive(Debug)]
struct StandardChecker {
    format: &'static LocaleFormat,
    kind: CheckKind,
}

impl StandardChecker {
    fn parse_locale_number(&self, value: &str) -> Option<f64> {
        let text = value.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = match body.split_once(self.format.decimal) {
            Some((int_part, frac)) => (int_part, Some(frac)),
            None => (body, None),
        };
        if let Some(frac) = frac_part
            && (frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }

        let grouped = int_part.contains(self.format.groups);
        let mut digits = String::with_capacity(int_part.len() + 8);
        for (index, chunk) in int_part.split(self.format.groups).enumerate() {
            if !chunk.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            if grouped {
                let valid = if index == 0 {
                    (1..=3).contains(&chunk.len())
                } else {
                    chunk.len() == 3
                };
                if !valid {
                    return None;
                }
            }
            digits.push_str(chunk);
        }
        if digits.is_empty() && frac_part.is_none() {
            return None;
        }

        let mut normalized = String::with_capacity(digits.len() + 8);
        if negative {
            normalized.push('-');
        }
        normalized.push_str(if digits.is_empty() { "0" } else { &digits });
        if let Some(frac) = frac_part {
            normalized.push('.');
            normalized.push_str(frac);
        }
        normalized
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
    }

    fn parse_currency(&self, value: &str) -> Option<f64> {
        let mut text = value.trim();
        let negative = text.starts_with('-');
        if negative || text.starts_with('+') {
            text = text[1..].trim_start();
        }
        for symbol in self.format.currency_symbols {
            if let Some(rest) = text.strip_prefix(symbol) {
                text = rest.trim_start();
                break;
            }
            if let Some(rest) = text.strip_suffix(symbol) {
                text = rest.trim_end();
                break;
            }
        }
        if text.starts_with(['-', '+']) {
            return None;
        }
        let amount = self.parse_locale_number(text)?;
        Some(if negative { -amount } else { amount })
    }

    fn check_date(&self, value: &str) -> Option<u8> {
        let text = value.trim();
        let pattern = if ISO_DATE_REGEX.is_match(text) {
            "%Y-%m-%d"
        } else if self.format.date_shape.regex().is_match(text) {
            self.format.date_format
        } else {
            return Some(0);
        };
        NaiveDate::parse_from_str(text, pattern).is_err().then_some(1)
    }

    fn check_boolean(&self, value: &str) -> bool {
        let lowered = value.trim().to_lowercase();
        self.format
            .true_words
            .iter()
            .chain(self.format.false_words)
            .any(|word| *word == lowered)
    }

    fn check_phone(&self, value: &str) -> bool {
        let mut digits = 0usize;
        for ch in value.trim().chars() {
            match ch {
                '0'..='9' => digits += 1,
                ' ' | '-' | '+' | '(' | ')' | '.' | '/' => {}
                _ => return false,
            }
        }
        let (min, max) = self.format.phone_digits;
        (min..=max).contains(&digits)
    }
}

impl LocaleChecker for StandardChecker {
    fn check(&self, value: &str) -> Option<u8> {
        match self.kind {
            CheckKind::Number => self.parse_locale_number(value).is_none().then_some(0),
            CheckKind::Date => self.check_date(value),
            CheckKind::Boolean => (!self.check_boolean(value)).then_some(0),
            CheckKind::Phone => (!self.check_phone(value)).then_some(0),
            CheckKind::Currency => self.parse_currency(value).is_none().then_some(0),
        }
    }

    fn parse_number(&self, value: &str) -> Option<f64> {
        match self.kind {
            CheckKind::Number => self.parse_locale_number(value),
            _ => None,
        }
    }
}

/// Locale provider backed by a fixed table of formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLocales;

impl StandardLocales {
    pub fn new() -> Self {
        Self
    }

    /// Whether `locale` resolves to a known format.
    pub fn supports(&self, locale: &str) -> bool {
        resolve(locale).is_some()
    }

    pub fn locale_ids() -> impl Iterator<Item = &'static str> {
        LOCALES.iter().map(|format| format.id)
    }
}

impl LocaleProvider for StandardLocales {
    fn type_check(
        &self,
        column_type: ColumnType,
        locale: &str,
        _base_code: u8,
    ) -> Option<LocaleTypeCheck> {
        let format = resolve(locale)?;
        let (kind, sub_errors) = match column_type {
            ColumnType::Number => (
                CheckKind::Number,
                vec![SubError::new(
                    0,
                    format!("Must be a valid number (e.g. {})", format.number_example),
                )],
            ),
            ColumnType::Date => (
                CheckKind::Date,
                vec![
                    SubError::new(0, format!("Must be a date in {} format", format.date_label)),
                    SubError::new(1, "Must be a real calendar date"),
                ],
            ),
            ColumnType::Boolean => {
                let words: Vec<&str> = format
                    .true_words
                    .iter()
                    .chain(format.false_words)
                    .copied()
                    .collect();
                (
                    CheckKind::Boolean,
                    vec![SubError::new(0, format!("Must be one of: {}", words.join(", ")))],
                )
            }
            ColumnType::Phone => {
                let (min, max) = format.phone_digits;
                (
                    CheckKind::Phone,
                    vec![SubError::new(
                        0,
                        format!("Must be a phone number with {min} to {max} digits"),
                    )],
                )
            }
            ColumnType::Currency => (
                CheckKind::Currency,
                vec![SubError::new(
                    0,
                    format!(
                        "Must be a currency amount (e.g. {} {})",
                        format.currency_symbols[0], format.number_example
                    ),
                )],
            ),
            ColumnType::String | ColumnType::Integer | ColumnType::Enum => return None,
        };
        Some(LocaleTypeCheck {
            checker: Arc::new(StandardChecker { format, kind }),
            sub_errors,
        })
    }
}
