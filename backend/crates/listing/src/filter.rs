//! Filter Builder
//!
//! Turns raw query parameters into a [`FilterExpression`] over allow-listed
//! columns. Malformed or unknown input is dropped, never reported: a bad
//! filter only makes the result wider, it never fails the request.
//!
//! Parameter naming per field kind:
//! - `Enum`: the field's own parameter (`status=shipped`)
//! - ranges: `<param>From` and `<param>To` (`priceFrom=10&priceTo=20.50`)

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::definition::ListParams;

/// How a filterable field's raw value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Exact match against one of the listed values
    Enum(&'static [&'static str]),
    /// Non-negative integer range (stock counts)
    Integer,
    /// Non-negative decimal amount range, compared in integer cents
    Money,
    /// Calendar date range; the upper bound covers the whole day
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FilterField {
    pub const fn new(param: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            param,
            column,
            kind,
        }
    }
}

/// A typed value that may be compared against a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl FilterValue {
    /// Ordering between values of the same variant; `None` across variants
    pub fn partial_cmp_value(&self, other: &FilterValue) -> Option<Ordering> {
        match (self, other) {
            (FilterValue::Text(a), FilterValue::Text(b)) => Some(a.cmp(b)),
            (FilterValue::Integer(a), FilterValue::Integer(b)) => Some(a.cmp(b)),
            (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => Some(a.cmp(b)),
            (FilterValue::Uuid(a), FilterValue::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq {
        column: &'static str,
        value: FilterValue,
    },
    /// At least one bound is present
    Range {
        column: &'static str,
        gte: Option<FilterValue>,
        lte: Option<FilterValue>,
    },
}

impl Condition {
    pub fn column(&self) -> &'static str {
        match self {
            Condition::Eq { column, .. } | Condition::Range { column, .. } => column,
        }
    }
}

/// Conjunction of conditions over allow-listed columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    conditions: Vec<Condition>,
}

impl FilterExpression {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub(crate) fn prepend(&mut self, condition: Condition) {
        self.conditions.insert(0, condition);
    }

    /// The first condition on `column`, if any
    pub fn condition_for(&self, column: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.column() == column)
    }
}

/// Build the filter for `fields` from `params`
pub fn build_filter(fields: &[FilterField], params: &ListParams) -> FilterExpression {
    let mut filter = FilterExpression::default();

    for field in fields {
        let condition = match field.kind {
            FieldKind::Enum(allowed) => params
                .get(field.param)
                .and_then(|raw| allowed.iter().find(|value| **value == raw))
                .map(|value| Condition::Eq {
                    column: field.column,
                    value: FilterValue::Text((*value).to_string()),
                }),
            FieldKind::Integer => range(field, params, integer_bound, integer_bound),
            FieldKind::Money => range(field, params, money_bound, money_bound),
            FieldKind::Date => range(
                field,
                params,
                |raw| parse_date_lower(raw).map(FilterValue::Timestamp),
                |raw| parse_date_upper(raw).map(FilterValue::Timestamp),
            ),
        };

        if let Some(condition) = condition {
            filter.push(condition);
        }
    }

    filter
}

fn range(
    field: &FilterField,
    params: &ListParams,
    lower: impl Fn(&str) -> Option<FilterValue>,
    upper: impl Fn(&str) -> Option<FilterValue>,
) -> Option<Condition> {
    let gte = params
        .get(&format!("{}From", field.param))
        .and_then(&lower);
    let lte = params.get(&format!("{}To", field.param)).and_then(&upper);

    if gte.is_none() && lte.is_none() {
        return None;
    }
    Some(Condition::Range {
        column: field.column,
        gte,
        lte,
    })
}

/// Negative bounds are omitted, the same as unparseable ones
fn integer_bound(raw: &str) -> Option<FilterValue> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .map(FilterValue::Integer)
}

fn money_bound(raw: &str) -> Option<FilterValue> {
    parse_money_cents(raw).map(FilterValue::Integer)
}

/// `"12"`, `"12.5"`, `"12.50"` → cents. More than two decimals, signs and
/// exponents are rejected.
pub fn parse_money_cents(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (raw, ""),
    };

    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) || fraction.len() > 2 {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    whole.checked_mul(100)?.checked_add(fraction)
}

fn parse_date(raw: &str) -> Option<ParsedDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(ParsedDate::Day(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| ParsedDate::Instant(dt.with_timezone(&Utc)))
}

enum ParsedDate {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

/// Start of the day for a bare date, the instant itself otherwise
fn parse_date_lower(raw: &str) -> Option<DateTime<Utc>> {
    match parse_date(raw)? {
        ParsedDate::Day(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        ParsedDate::Instant(instant) => Some(instant),
    }
}

/// 23:59:59.999 UTC of the given day
fn parse_date_upper(raw: &str) -> Option<DateTime<Utc>> {
    let date = match parse_date(raw)? {
        ParsedDate::Day(date) => date,
        ParsedDate::Instant(instant) => instant.date_naive(),
    };
    date.and_hms_milli_opt(23, 59, 59, 999).map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const STATUSES: &[&str] = &["pending", "shipped"];
    const FIELDS: &[FilterField] = &[
        FilterField::new("status", "status", FieldKind::Enum(STATUSES)),
        FilterField::new("stock", "stock", FieldKind::Integer),
        FilterField::new("price", "price_cents", FieldKind::Money),
        FilterField::new("orderDate", "created_at", FieldKind::Date),
    ];

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_enum_exact_match_only() {
        let filter = build_filter(FIELDS, &params(&[("status", "shipped")]));
        assert_eq!(
            filter.conditions(),
            &[Condition::Eq {
                column: "status",
                value: FilterValue::Text("shipped".into()),
            }]
        );

        for raw in ["Shipped", "shipped ", "{\"$ne\":null}", "delivered", ""] {
            assert!(build_filter(FIELDS, &params(&[("status", raw)])).is_empty(), "{raw:?}");
        }
    }

    #[test]
    fn test_integer_range_omits_negative_and_garbage() {
        let filter = build_filter(FIELDS, &params(&[("stockFrom", "-1"), ("stockTo", "20")]));
        assert_eq!(
            filter.conditions(),
            &[Condition::Range {
                column: "stock",
                gte: None,
                lte: Some(FilterValue::Integer(20)),
            }]
        );

        let filter = build_filter(FIELDS, &params(&[("stockFrom", "x"), ("stockTo", "-3")]));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_money_to_cents() {
        assert_eq!(parse_money_cents("12"), Some(1200));
        assert_eq!(parse_money_cents("12.5"), Some(1250));
        assert_eq!(parse_money_cents(" 0.07 "), Some(7));
        assert_eq!(parse_money_cents("12."), Some(1200));
        assert_eq!(parse_money_cents("-1"), None);
        assert_eq!(parse_money_cents("1.234"), None);
        assert_eq!(parse_money_cents("1e3"), None);
        assert_eq!(parse_money_cents(".5"), None);
        assert_eq!(parse_money_cents("99999999999999999999"), None);
    }

    #[test]
    fn test_date_range_is_day_inclusive() {
        let filter = build_filter(
            FIELDS,
            &params(&[("orderDateFrom", "2024-07-01"), ("orderDateTo", "2024-08-01")]),
        );
        let expected_from = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let expected_to = Utc.with_ymd_and_hms(2024, 8, 1, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);

        assert_eq!(
            filter.condition_for("created_at"),
            Some(&Condition::Range {
                column: "created_at",
                gte: Some(FilterValue::Timestamp(expected_from)),
                lte: Some(FilterValue::Timestamp(expected_to)),
            })
        );
    }

    #[test]
    fn test_invalid_dates_omitted() {
        let filter = build_filter(
            FIELDS,
            &params(&[("orderDateFrom", "2024-02-30"), ("orderDateTo", "yesterday")]),
        );
        assert!(filter.is_empty());
    }

    #[test]
    fn test_rfc3339_bounds() {
        let filter = build_filter(
            FIELDS,
            &params(&[
                ("orderDateFrom", "2024-07-01T12:30:00+09:00"),
                ("orderDateTo", "2024-07-02T01:00:00Z"),
            ]),
        );
        let Some(Condition::Range { gte, lte, .. }) = filter.condition_for("created_at") else {
            panic!("expected range");
        };
        assert_eq!(
            gte,
            &Some(FilterValue::Timestamp(
                Utc.with_ymd_and_hms(2024, 7, 1, 3, 30, 0).unwrap()
            ))
        );
        assert_eq!(
            lte,
            &Some(FilterValue::Timestamp(
                Utc.with_ymd_and_hms(2024, 7, 2, 23, 59, 59).unwrap()
                    + chrono::Duration::milliseconds(999)
            ))
        );
    }

    #[test]
    fn test_unknown_params_ignored() {
        let filter = build_filter(
            FIELDS,
            &params(&[("password_hash", "x"), ("stock", "5"), ("priceFrom", "1.00")]),
        );
        assert_eq!(filter.conditions().len(), 1);
        assert_eq!(filter.conditions()[0].column(), "price_cents");
    }
}
