//! Field names and the values a field expression can carry.

use std::fmt;

/// A cron field. The declaration order is the canonical field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldName {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl FieldName {
    /// All fields in canonical order.
    pub const ALL: [FieldName; 7] = [
        FieldName::Second,
        FieldName::Minute,
        FieldName::Hour,
        FieldName::DayOfMonth,
        FieldName::Month,
        FieldName::DayOfWeek,
        FieldName::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Second => "second",
            FieldName::Minute => "minute",
            FieldName::Hour => "hour",
            FieldName::DayOfMonth => "day-of-month",
            FieldName::Month => "month",
            FieldName::DayOfWeek => "day-of-week",
            FieldName::Year => "year",
        }
    }

    /// Day-of-month and day-of-week are the only fields that accept `?`.
    pub fn is_day_field(self) -> bool {
        matches!(self, FieldName::DayOfMonth | FieldName::DayOfWeek)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Special characters a fixed value may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecialChar {
    None,
    /// `L`: last day of the month.
    Last,
    /// `LW`: last Monday-Friday of the month.
    LastWeekday,
    /// `nW`: weekday nearest to day `n`.
    NearestWeekday,
    /// `d#n`: n-th occurrence of weekday `d` in the month.
    NthOccurrence,
}

impl SpecialChar {
    /// The flag that must be present in a field's allowed set for this character.
    pub fn flag(self) -> SpecialChars {
        match self {
            SpecialChar::None => SpecialChars::empty(),
            SpecialChar::Last => SpecialChars::LAST,
            SpecialChar::LastWeekday => SpecialChars::LAST_WEEKDAY,
            SpecialChar::NearestWeekday => SpecialChars::NEAREST_WEEKDAY,
            SpecialChar::NthOccurrence => SpecialChars::NTH,
        }
    }
}

bitflags::bitflags! {
    /// Special characters a field accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpecialChars: u8 {
        const LAST            = 1 << 0;
        const LAST_WEEKDAY    = 1 << 1;
        const NEAREST_WEEKDAY = 1 << 2;
        const NTH             = 1 << 3;
        const QUESTION_MARK   = 1 << 4;
    }
}

/// Value carried by a fixed-value expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// A plain number in the dialect's native encoding.
    Int(i32),
    /// `L`
    Last,
    /// `LW`
    LastWeekday,
    /// `15W`
    NearestWeekday(i32),
    /// `5#3`: weekday value and 1-based occurrence.
    NthOccurrence(i32, u32),
}

impl FieldValue {
    pub fn special(self) -> SpecialChar {
        match self {
            FieldValue::Int(_) => SpecialChar::None,
            FieldValue::Last => SpecialChar::Last,
            FieldValue::LastWeekday => SpecialChar::LastWeekday,
            FieldValue::NearestWeekday(_) => SpecialChar::NearestWeekday,
            FieldValue::NthOccurrence(..) => SpecialChar::NthOccurrence,
        }
    }

    /// Numeric part, if the value has one.
    pub fn number(self) -> Option<i32> {
        match self {
            FieldValue::Int(v) | FieldValue::NearestWeekday(v) | FieldValue::NthOccurrence(v, _) => Some(v),
            FieldValue::Last | FieldValue::LastWeekday => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Last => f.write_str("L"),
            FieldValue::LastWeekday => f.write_str("LW"),
            FieldValue::NearestWeekday(v) => write!(f, "{v}W"),
            FieldValue::NthOccurrence(v, n) => write!(f, "{v}#{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_is_canonical() {
        let mut shuffled = vec![FieldName::Year, FieldName::Second, FieldName::DayOfWeek, FieldName::Month];
        shuffled.sort();
        assert_eq!(shuffled, vec![FieldName::Second, FieldName::Month, FieldName::DayOfWeek, FieldName::Year]);
    }

    #[test]
    fn values_render_in_cron_syntax() {
        let cases = vec![
            ("7", FieldValue::Int(7)),
            ("L", FieldValue::Last),
            ("LW", FieldValue::LastWeekday),
            ("15W", FieldValue::NearestWeekday(15)),
            ("6#3", FieldValue::NthOccurrence(6, 3)),
        ];
        for (expected, value) in cases {
            assert_eq!(value.to_string(), expected);
        }
    }

    #[test]
    fn special_char_maps_to_allowed_flag() {
        assert_eq!(FieldValue::NthOccurrence(2, 1).special().flag(), SpecialChars::NTH);
        assert!(FieldValue::Int(3).special().flag().is_empty());
    }
}
