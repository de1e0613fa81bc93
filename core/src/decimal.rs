//! Dual-representation decimal statistics.
//!
//! Report CSVs deliver statistics as display text ("1,234.50", "3.2%",
//! "--"). Internally they are exact `rust_decimal::Decimal`s so that
//! aggregation never drifts. `DualDecimal` holds the exact value and renders
//! the report-compatible text on demand.
//!
//! Text rules, independent of the process locale:
//!   - `,` groups thousands, `.` separates the fraction, `-` marks negatives.
//!   - `""` and `--` mean "not applicable" and parse to the absent state.
//!   - A trailing `%` is accepted and dropped.
//!   - Formatting keeps the decimal's scale, so `1,234.50` stays `1,234.50`.

use rust_decimal::Decimal;
use thiserror::Error;

/// Marker the report source emits for statistics that do not apply.
pub const NOT_APPLICABLE: &str = "--";

const GROUP_SEPARATOR: char = ',';
const DECIMAL_SEPARATOR: char = '.';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a report number: {raw:?}")]
pub struct InvalidNumber {
    pub raw: String,
}

impl InvalidNumber {
    fn new(raw: &str) -> Self {
        Self { raw: raw.to_string() }
    }
}

/// An exact statistic with a formatted text view. `None` is "absent".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DualDecimal(Option<Decimal>);

impl DualDecimal {
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(Some(value))
    }

    /// Parse report text. Empty and `--` yield the absent state, not zero.
    pub fn parse(text: &str) -> Result<Self, InvalidNumber> {
        parse_report_number(text).map(Self)
    }

    pub fn raw(&self) -> Option<Decimal> {
        self.0
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// Report-compatible text; the absent state renders as `""`.
    pub fn formatted(&self) -> String {
        match &self.0 {
            Some(d) => format_decimal(d),
            None => String::new(),
        }
    }
}

/// Canonical text form of a valid report number.
pub fn normalize(text: &str) -> Result<String, InvalidNumber> {
    DualDecimal::parse(text).map(|d| d.formatted())
}

/// Render with fixed grouping and separators, keeping the value's scale.
pub fn format_decimal(value: &Decimal) -> String {
    let plain = value.abs().to_string();
    let (int_digits, frac_digits) = match plain.split_once(DECIMAL_SEPARATOR) {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut out = String::with_capacity(plain.len() + plain.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        out.push('-');
    }
    let lead = int_digits.len() % 3;
    for (i, ch) in int_digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_digits {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(frac);
    }
    out
}

fn parse_report_number(text: &str) -> Result<Option<Decimal>, InvalidNumber> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == NOT_APPLICABLE {
        return Ok(None);
    }

    let body = trimmed.strip_suffix('%').map(str::trim_end).unwrap_or(trimmed);
    let (negative, unsigned) = match body.as_bytes().first() {
        Some(b'-') => (true, &body[1..]),
        Some(b'+') => (false, &body[1..]),
        _ => (false, body),
    };

    let (int_part, frac_part) = match unsigned.split_once(DECIMAL_SEPARATOR) {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let int_digits = ungroup(int_part).ok_or_else(|| InvalidNumber::new(text))?;
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidNumber::new(text));
        }
    }

    let mut canonical = String::with_capacity(unsigned.len() + 1);
    if negative {
        canonical.push('-');
    }
    canonical.push_str(&int_digits);
    if let Some(frac) = frac_part {
        canonical.push(DECIMAL_SEPARATOR);
        canonical.push_str(frac);
    }

    Decimal::from_str_exact(&canonical)
        .map(Some)
        .map_err(|_| InvalidNumber::new(text))
}

/// Strip well-formed thousands grouping. `None` on anything else.
fn ungroup(int_part: &str) -> Option<String> {
    if int_part.is_empty() {
        return None;
    }
    let mut groups = int_part.split(GROUP_SEPARATOR);
    let first = groups.next()?;
    let grouped = int_part.contains(GROUP_SEPARATOR);
    let first_ok = !first.is_empty()
        && first.bytes().all(|b| b.is_ascii_digit())
        && (!grouped || first.len() <= 3);
    if !first_ok {
        return None;
    }

    let mut digits = String::from(first);
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}
