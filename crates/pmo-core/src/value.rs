use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single cell in a loaded table.
///
/// `Absent` is an explicit sentinel distinct from `Number(0.0)` and from the
/// empty string: it means "could not be determined". It is produced by the
/// normalization boundary on conversion failure and resolved by a defined
/// fill rule (zero for money/quantity columns, propagated for dates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    /// Raw or cleaned text.
    Text(String),
    /// A coerced numeric value.
    Number(f64),
    /// A coerced calendar date.
    Date(NaiveDate),
    /// A coerced boolean flag.
    Bool(bool),
    /// Could not be determined.
    Absent,
}

impl Value {
    /// `true` for the `Absent` sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Numeric view: `Number` as-is, `Bool` as 0/1, everything else `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Numeric view with the absent-as-zero fill rule applied.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Date view, `None` unless the cell is a coerced `Date`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Boolean view, `None` unless the cell is a coerced `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Textual label used for grouping and display.
    ///
    /// Numbers and dates render through their canonical string forms;
    /// `Absent` renders as the empty string so that grouping by a partially
    /// populated column buckets unknowns together rather than dropping rows.
    pub fn label(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Absent => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

// ── Tolerant parsers ──────────────────────────────────────────────────────────

fn numeric_cleaner() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    // Currency prefixes and thousands separators seen in exported sheets,
    // e.g. "AED 1,250,000" or "1_500".
    RE.get_or_init(|| regex::Regex::new(r"(?i)^aed\s*|[,_\s]").expect("static regex"))
}

/// Parse a numeric cell from its textual form.
///
/// Strips an optional `AED` prefix, thousands separators, and surrounding
/// whitespace before parsing. Returns `None` for anything that still fails
/// to parse; callers map that to [`Value::Absent`].
///
/// # Examples
///
/// ```
/// use pmo_core::value::parse_number;
///
/// assert_eq!(parse_number("1250.5"), Some(1250.5));
/// assert_eq!(parse_number("AED 1,250,000"), Some(1_250_000.0));
/// assert_eq!(parse_number("n/a"), None);
/// ```
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned = numeric_cleaner().replace_all(trimmed, "");
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date cell from the formats that occur in the source exports.
///
/// Accepted, in order: `%Y-%m-%d`, `%d/%m/%Y`, `%m/%d/%Y`, `%Y/%m/%d`, and
/// an RFC 3339 timestamp whose date component is taken. Anything else is
/// `None` and becomes [`Value::Absent`] downstream.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    const FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    // Timestamps like "2024-03-01T09:30:00Z": keep the date component.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    None
}

/// Parse a boolean flag cell ("is_billable"-style columns).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Value accessors ──────────────────────────────────────────────────────

    #[test]
    fn test_absent_is_distinct_from_zero() {
        assert!(Value::Absent.is_absent());
        assert!(!Value::Number(0.0).is_absent());
        assert_eq!(Value::Absent.as_number(), None);
        assert_eq!(Value::Absent.number_or_zero(), 0.0);
    }

    #[test]
    fn test_as_number_for_bool() {
        assert_eq!(Value::Bool(true).as_number(), Some(1.0));
        assert_eq!(Value::Bool(false).as_number(), Some(0.0));
    }

    #[test]
    fn test_as_number_for_text_is_none() {
        assert_eq!(Value::Text("12".to_string()).as_number(), None);
    }

    #[test]
    fn test_label_forms() {
        assert_eq!(Value::Text("Dubai".into()).label(), "Dubai");
        assert_eq!(Value::Number(42.0).label(), "42");
        assert_eq!(Value::Number(42.5).label(), "42.5");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).label(),
            "2024-03-01"
        );
        assert_eq!(Value::Bool(true).label(), "true");
        assert_eq!(Value::Absent.label(), "");
    }

    // ── parse_number ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number("1250.5"), Some(1250.5));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
    }

    #[test]
    fn test_parse_number_currency_and_separators() {
        assert_eq!(parse_number("AED 1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_number("aed 900"), Some(900.0));
        assert_eq!(parse_number("1,000.25"), Some(1000.25));
    }

    #[test]
    fn test_parse_number_garbage_is_none() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("TBD"), None);
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    // ── parse_date ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(
            parse_date("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_parse_date_slashed() {
        assert_eq!(
            parse_date("15/02/2024"),
            NaiveDate::from_ymd_opt(2024, 2, 15)
        );
        assert_eq!(
            parse_date("2024/02/15"),
            NaiveDate::from_ymd_opt(2024, 2, 15)
        );
    }

    #[test]
    fn test_parse_date_rfc3339_keeps_date() {
        assert_eq!(
            parse_date("2024-03-01T09:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_parse_date_garbage_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    // ── parse_bool ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
