//! Rendered sales detail records and the value formatting rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::schema::{FIELD_COUNT, FIELDS, Field, FieldSpec};

/// One rendered sales detail row: [`FIELD_COUNT`] strings in layout order.
///
/// Records are built once by the converter (or read back by
/// [`from_csv`](super::from_csv)) and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcaRecord {
    pub(super) values: Vec<String>,
}

impl PcaRecord {
    /// Wrap already rendered values. Returns `None` unless exactly
    /// [`FIELD_COUNT`] values are given.
    pub fn from_values(values: Vec<String>) -> Option<Self> {
        (values.len() == FIELD_COUNT).then_some(Self { values })
    }

    /// Rendered value of `field`.
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// All values in layout order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Pairs of field descriptor and rendered value, in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldSpec, &str)> {
        FIELDS.iter().zip(self.values.iter().map(String::as_str))
    }
}

/// A typed value before rendering into a field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue<'a> {
    /// Unused field, rendered as `""`.
    Blank,
    /// Identifier, zero-padded to the field width.
    Code(&'a str),
    /// Text, cut to the field width.
    Text(&'a str),
    Number(Decimal),
    /// Date, or `"0"` when unset.
    Date(Option<NaiveDate>),
    Flag(&'a str),
}

impl FieldValue<'_> {
    pub(crate) fn render(&self, spec: &FieldSpec) -> String {
        match self {
            Self::Blank => String::new(),
            Self::Code(s) => pad_code(s, spec.width),
            Self::Text(s) => truncate_chars(s, spec.width),
            Self::Number(d) => format_number(*d),
            Self::Date(Some(d)) => format_date(*d),
            Self::Date(None) => "0".to_string(),
            Self::Flag(s) => (*s).to_string(),
        }
    }
}

/// Left-pad with `'0'` to `width` characters. Longer values are kept whole.
pub fn pad_code(s: &str, width: usize) -> String {
    format!("{s:0>width$}")
}

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Plain decimal string: no grouping, no trailing fractional zeros.
pub fn format_number(d: Decimal) -> String {
    d.normalize().to_string()
}

/// `YYYYMMDD` without separators.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pad_short() {
        assert_eq!(pad_code("REST001", 13), "000000REST001");
        assert_eq!(pad_code("", 6), "000000");
    }

    #[test]
    fn pad_does_not_cut() {
        assert_eq!(pad_code("202410000", 8), "202410000");
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate_chars("レストラン田中", 5), "レストラ");
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn number_has_no_grouping_or_trailing_zeros() {
        assert_eq!(format_number(dec!(1234567)), "1234567");
        assert_eq!(format_number(dec!(10.0)), "10");
        assert_eq!(format_number(dec!(1.50)), "1.5");
        assert_eq!(format_number(dec!(-0.0)), "0");
    }

    #[test]
    fn date_has_no_separators() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(d), "20240105");
    }

    #[test]
    fn record_requires_full_width() {
        assert!(PcaRecord::from_values(vec![String::new(); FIELD_COUNT]).is_some());
        assert!(PcaRecord::from_values(vec![String::new(); 3]).is_none());
    }
}
