//! Field expression tree.
//!
//! A field expression is the parsed matching rule for one cron field. Trees
//! are built once (by the parser or by [`CronBuilder`](crate::CronBuilder))
//! and never mutated afterwards.
//!
//! ```text
//! "*/15"          -> Always { period: 15 }
//! "15W"           -> On(NearestWeekday(15))
//! "MON-FRI"       -> Between { from: 1, to: 5, period: 1 }
//! "1,15,L"        -> Alternatives([On(Int(1)), On(Int(15)), On(Last)])
//! "?"             -> NoConstraint
//! ```

use std::fmt;

use crate::field::FieldValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldExpression {
    /// `*` or `*/period`, anchored at the field minimum.
    Always { period: u32 },
    /// A single value, optionally carrying a special character.
    On(FieldValue),
    /// `from-to` or `from-to/period`. `from > to` wraps through the field bounds.
    Between { from: i32, to: i32, period: u32 },
    /// Comma separated alternatives; any child matching is a match.
    Alternatives(Vec<FieldExpression>),
    /// `?`
    NoConstraint,
}

impl FieldExpression {
    /// False for `*`, `*/n` and `?`; the day-of-month/day-of-week pairing
    /// rule only ORs fields that restrict the date.
    pub fn is_restrictive(&self) -> bool {
        !matches!(self, FieldExpression::Always { .. } | FieldExpression::NoConstraint)
    }

    /// True if `?` appears anywhere in the tree.
    pub fn contains_no_constraint(&self) -> bool {
        match self {
            FieldExpression::NoConstraint => true,
            FieldExpression::Alternatives(children) => children.iter().any(Self::contains_no_constraint),
            FieldExpression::Always { .. } | FieldExpression::On(_) | FieldExpression::Between { .. } => false,
        }
    }

    /// Combine with another expression into a flat list of alternatives.
    pub fn and(self, other: FieldExpression) -> FieldExpression {
        let mut children = match self {
            FieldExpression::Alternatives(children) => children,
            single => vec![single],
        };
        match other {
            FieldExpression::Alternatives(more) => children.extend(more),
            single => children.push(single),
        }
        FieldExpression::Alternatives(children)
    }

    /// Textual form, re-parseable under the dialect that produced the tree.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldExpression::Always { period: 1 } => f.write_str("*"),
            FieldExpression::Always { period } => write!(f, "*/{period}"),
            FieldExpression::On(value) => write!(f, "{value}"),
            FieldExpression::Between { from, to, period: 1 } => write!(f, "{from}-{to}"),
            FieldExpression::Between { from, to, period } => write!(f, "{from}-{to}/{period}"),
            FieldExpression::Alternatives(children) => {
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            FieldExpression::NoConstraint => f.write_str("?"),
        }
    }
}

// --- Factory ----------------------------------------------------------------

/// `*`
pub fn always() -> FieldExpression {
    FieldExpression::Always { period: 1 }
}

/// `*/period`
pub fn every(period: u32) -> FieldExpression {
    FieldExpression::Always { period }
}

/// A plain value.
pub fn on(value: i32) -> FieldExpression {
    FieldExpression::On(FieldValue::Int(value))
}

/// A value carrying a special character (`L`, `LW`, `nW`, `d#n`).
pub fn on_special(value: FieldValue) -> FieldExpression {
    FieldExpression::On(value)
}

/// `from-to`
pub fn between(from: i32, to: i32) -> FieldExpression {
    FieldExpression::Between { from, to, period: 1 }
}

/// `from-to/period`
pub fn between_every(from: i32, to: i32, period: u32) -> FieldExpression {
    FieldExpression::Between { from, to, period }
}

/// `?`
pub fn question_mark() -> FieldExpression {
    FieldExpression::NoConstraint
}

/// Alternatives from any number of expressions; a single one is returned as-is.
pub fn and(expressions: impl IntoIterator<Item = FieldExpression>) -> FieldExpression {
    let mut children: Vec<FieldExpression> = Vec::new();
    for expr in expressions {
        match expr {
            FieldExpression::Alternatives(more) => children.extend(more),
            single => children.push(single),
        }
    }
    if children.len() == 1 {
        children.remove(0)
    } else {
        FieldExpression::Alternatives(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_variant() {
        let cases: Vec<(&str, FieldExpression)> = vec![
            ("*", always()),
            ("*/15", every(15)),
            ("5", on(5)),
            ("L", on_special(FieldValue::Last)),
            ("10-20", between(10, 20)),
            ("0-30/10", between_every(0, 30, 10)),
            ("?", question_mark()),
            ("1,15,L", and([on(1), on(15), on_special(FieldValue::Last)])),
        ];
        for (expected, expr) in cases {
            assert_eq!(expr.as_text(), expected);
        }
    }

    #[test]
    fn and_flattens_nested_alternatives() {
        let expr = on(1).and(on(2)).and(between(5, 6));
        let FieldExpression::Alternatives(children) = expr else {
            panic!("expected alternatives");
        };
        assert_eq!(children.len(), 3);
        assert_eq!(and([on(4)]), on(4));
    }

    #[test]
    fn always_and_question_mark_are_not_restrictive() {
        assert!(!always().is_restrictive());
        assert!(!every(2).is_restrictive());
        assert!(!question_mark().is_restrictive());
        assert!(on(1).is_restrictive());
        assert!(and([on(1), question_mark()]).contains_no_constraint());
    }
}
