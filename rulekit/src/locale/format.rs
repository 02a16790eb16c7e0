//! Locale-aware decimal formatting

use super::Locale;

/// Formats numbers with a locale's decimal and grouping separators
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    decimal_separator: char,
    grouping_separator: char,
    grouping_used: bool,
    min_fraction_digits: usize,
    max_fraction_digits: usize,
}

impl NumberFormat {
    /// Formatter for the current default locale
    pub fn number_instance() -> Self {
        Self::for_locale(&Locale::current())
    }

    pub fn for_locale(locale: &Locale) -> Self {
        let (decimal_separator, grouping_separator) = separators(locale);
        Self {
            decimal_separator,
            grouping_separator,
            grouping_used: true,
            min_fraction_digits: 0,
            max_fraction_digits: 3,
        }
    }

    pub fn min_fraction_digits(mut self, digits: usize) -> Self {
        self.min_fraction_digits = digits;
        self.max_fraction_digits = self.max_fraction_digits.max(digits);
        self
    }

    pub fn max_fraction_digits(mut self, digits: usize) -> Self {
        self.max_fraction_digits = digits;
        self.min_fraction_digits = self.min_fraction_digits.min(digits);
        self
    }

    pub fn grouping(mut self, used: bool) -> Self {
        self.grouping_used = used;
        self
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "∞" } else { "-∞" }.to_string();
        }

        let rounded = format!("{:.*}", self.max_fraction_digits, value.abs());
        let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

        let mut fraction = fraction.trim_end_matches('0').to_string();
        while fraction.len() < self.min_fraction_digits {
            fraction.push('0');
        }

        let mut out = String::new();
        let is_zero = integer.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
        if value.is_sign_negative() && !is_zero {
            out.push('-');
        }

        if self.grouping_used {
            out.push_str(&group(integer, self.grouping_separator));
        } else {
            out.push_str(integer);
        }

        if !fraction.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(&fraction);
        }

        out
    }
}

fn separators(locale: &Locale) -> (char, char) {
    match (locale.language(), locale.country()) {
        ("de", Some("CH")) => ('.', '\''),
        ("de" | "es" | "it" | "nl" | "pt" | "da" | "id" | "tr", _) => (',', '.'),
        ("fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "uk", _) => (',', '\u{a0}'),
        _ => ('.', ','),
    }
}

/// Insert `separator` every three digits from the right
fn group(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(digit);
    }
    out
}
