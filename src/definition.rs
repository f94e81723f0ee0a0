//! Cron dialect definitions.
//!
//! A [`CronDefinition`] is a declarative recipe: the fields a dialect uses, in
//! canonical order, each with its [`FieldConstraints`], plus a handful of
//! dialect flags. Definitions are built once and shared read-only by every
//! parse of that dialect.
//!
//! The four predefined dialects live behind [`CronDefinition::instance`], a
//! lazily populated process-wide cache with one initialization guard per
//! [`CronType`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::constraints::{FieldConstraints, FieldConstraintsBuilder, WeekdayNumbering};
use crate::error::{CronError, CronResult};
use crate::field::{FieldName, SpecialChars};

/// Fields every definition must contain.
const REQUIRED_FIELDS: [FieldName; 5] =
    [FieldName::Minute, FieldName::Hour, FieldName::DayOfMonth, FieldName::Month, FieldName::DayOfWeek];

/// Tags for the predefined dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CronType {
    /// Classic crontab: `min hour dom month dow`.
    Unix,
    /// Cron4j: five fields, `L` on day-of-month, lenient ranges.
    Cron4j,
    /// Quartz: seconds, `L`/`W`/`#`/`?`, optional year.
    Quartz,
    /// Spring `@Scheduled`: six fields with `L`/`W`/`#`/`?`.
    Spring,
}

impl CronType {
    /// Build a fresh definition for this dialect. Prefer [`CronDefinition::instance`].
    pub fn definition(self) -> CronDefinition {
        let builder = match self {
            CronType::Unix => CronDefinitionBuilder::new()
                .with_field(FieldName::Minute)
                .with_field(FieldName::Hour)
                .with_field(FieldName::DayOfMonth)
                .with_field(FieldName::Month)
                .field(FieldName::DayOfWeek, |c| c.with_valid_range(0, 7).with_int_mapping(7, 0))
                .with_nicknames()
                .with_strict_ranges(),
            CronType::Cron4j => CronDefinitionBuilder::new()
                .with_field(FieldName::Minute)
                .with_field(FieldName::Hour)
                .field(FieldName::DayOfMonth, |c| c.with_special_chars(SpecialChars::LAST))
                .with_field(FieldName::Month)
                .with_field(FieldName::DayOfWeek),
            CronType::Quartz => CronDefinitionBuilder::new()
                .with_field(FieldName::Second)
                .with_field(FieldName::Minute)
                .with_field(FieldName::Hour)
                .field(FieldName::DayOfMonth, |c| c.with_special_chars(quartz_day_of_month_specials()))
                .with_field(FieldName::Month)
                .field(FieldName::DayOfWeek, |c| {
                    c.with_weekday_numbering(WeekdayNumbering::SundayOne)
                        .with_valid_range(1, 7)
                        .with_special_chars(SpecialChars::NTH | SpecialChars::QUESTION_MARK)
                })
                .field(FieldName::Year, |c| c.with_valid_range(1970, 2099))
                .with_last_field_optional()
                .with_question_mark_required()
                .with_strict_ranges(),
            CronType::Spring => CronDefinitionBuilder::new()
                .with_field(FieldName::Second)
                .with_field(FieldName::Minute)
                .with_field(FieldName::Hour)
                .field(FieldName::DayOfMonth, |c| c.with_special_chars(quartz_day_of_month_specials()))
                .with_field(FieldName::Month)
                .field(FieldName::DayOfWeek, |c| {
                    c.with_valid_range(0, 7)
                        .with_int_mapping(7, 0)
                        .with_special_chars(SpecialChars::NTH | SpecialChars::QUESTION_MARK)
                })
                .with_nicknames()
                .with_strict_ranges(),
        };
        builder.assemble()
    }
}

impl fmt::Display for CronType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CronType::Unix => "unix",
            CronType::Cron4j => "cron4j",
            CronType::Quartz => "quartz",
            CronType::Spring => "spring",
        };
        f.write_str(name)
    }
}

fn quartz_day_of_month_specials() -> SpecialChars {
    SpecialChars::LAST | SpecialChars::LAST_WEEKDAY | SpecialChars::NEAREST_WEEKDAY | SpecialChars::QUESTION_MARK
}

/// A field of a dialect: its name and constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    name: FieldName,
    constraints: FieldConstraints,
}

impl FieldDefinition {
    pub fn new(name: FieldName, constraints: FieldConstraints) -> Self {
        FieldDefinition { name, constraints }
    }

    pub fn name(&self) -> FieldName {
        self.name
    }

    pub fn constraints(&self) -> &FieldConstraints {
        &self.constraints
    }
}

/// A dialect: ordered field definitions plus dialect-wide flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronDefinition {
    fields: Vec<FieldDefinition>,
    last_field_optional: bool,
    strict_ranges: bool,
    question_mark_required: bool,
    nicknames: bool,
}

impl CronDefinition {
    /// Shared definition for a predefined dialect.
    ///
    /// Each dialect is built at most once per process; later calls are plain
    /// reads of the initialized cell.
    pub fn instance(kind: CronType) -> Arc<CronDefinition> {
        static UNIX: OnceCell<Arc<CronDefinition>> = OnceCell::new();
        static CRON4J: OnceCell<Arc<CronDefinition>> = OnceCell::new();
        static QUARTZ: OnceCell<Arc<CronDefinition>> = OnceCell::new();
        static SPRING: OnceCell<Arc<CronDefinition>> = OnceCell::new();

        let cell = match kind {
            CronType::Unix => &UNIX,
            CronType::Cron4j => &CRON4J,
            CronType::Quartz => &QUARTZ,
            CronType::Spring => &SPRING,
        };
        let definition = cell.get_or_init(|| {
            debug!(dialect = %kind, "building cron definition");
            Arc::new(kind.definition())
        });
        Arc::clone(definition)
    }

    /// Field definitions in canonical order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: FieldName) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: FieldName) -> bool {
        self.field(name).is_some()
    }

    /// Number of fields an expression must have, not counting an optional trailing one.
    pub fn min_arity(&self) -> usize {
        if self.last_field_optional { self.fields.len().saturating_sub(1) } else { self.fields.len() }
    }

    pub fn max_arity(&self) -> usize {
        self.fields.len()
    }

    pub fn is_last_field_optional(&self) -> bool {
        self.last_field_optional
    }

    /// Whether range checks apply to every field regardless of per-field flags.
    pub fn is_strict(&self) -> bool {
        self.strict_ranges
    }

    /// Whether exactly one of day-of-month/day-of-week must be `?`.
    pub fn requires_question_mark(&self) -> bool {
        self.question_mark_required
    }

    pub fn supports_nicknames(&self) -> bool {
        self.nicknames
    }

    /// Strictness that applies to one field of this dialect.
    pub(crate) fn is_strict_for(&self, constraints: &FieldConstraints) -> bool {
        self.strict_ranges || constraints.is_strict_range()
    }
}

/// Fluent builder for [`CronDefinition`].
///
/// ```
/// use cronweave::{CronDefinitionBuilder, FieldName, SpecialChars};
///
/// let definition = CronDefinitionBuilder::new()
///     .with_field(FieldName::Minute)
///     .with_field(FieldName::Hour)
///     .field(FieldName::DayOfMonth, |c| c.with_special_chars(SpecialChars::LAST))
///     .with_field(FieldName::Month)
///     .with_field(FieldName::DayOfWeek)
///     .build()
///     .unwrap();
/// assert_eq!(definition.min_arity(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CronDefinitionBuilder {
    fields: BTreeMap<FieldName, FieldConstraints>,
    duplicates: Vec<FieldName>,
    last_field_optional: bool,
    strict_ranges: bool,
    question_mark_required: bool,
    nicknames: bool,
}

impl CronDefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with its default constraints.
    pub fn with_field(self, name: FieldName) -> Self {
        self.field(name, |c| c)
    }

    /// Register `name` with constraints tuned by `configure`.
    pub fn field(self, name: FieldName, configure: impl FnOnce(FieldConstraintsBuilder) -> FieldConstraintsBuilder) -> Self {
        let constraints = configure(FieldConstraintsBuilder::for_field(name)).build();
        self.with_constraints(name, constraints)
    }

    /// Register `name` with prebuilt constraints.
    pub fn with_constraints(mut self, name: FieldName, constraints: FieldConstraints) -> Self {
        if self.fields.insert(name, constraints).is_some() {
            self.duplicates.push(name);
        }
        self
    }

    /// The last field (in canonical order) may be omitted from expressions.
    pub fn with_last_field_optional(mut self) -> Self {
        self.last_field_optional = true;
        self
    }

    pub fn with_strict_ranges(mut self) -> Self {
        self.strict_ranges = true;
        self
    }

    /// Exactly one of day-of-month/day-of-week must be `?`.
    pub fn with_question_mark_required(mut self) -> Self {
        self.question_mark_required = true;
        self
    }

    /// Accept `@yearly`, `@monthly`, `@weekly`, `@daily`, `@midnight` and `@hourly`.
    pub fn with_nicknames(mut self) -> Self {
        self.nicknames = true;
        self
    }

    pub fn build(self) -> CronResult<CronDefinition> {
        if let Some(name) = self.duplicates.first() {
            return Err(CronError::configuration(format!("field {name} registered more than once")));
        }
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|name| !self.fields.contains_key(name)) {
            return Err(CronError::configuration(format!("required field {missing} is missing")));
        }
        for (name, constraints) in &self.fields {
            if constraints.min() > constraints.max() {
                return Err(CronError::configuration(format!(
                    "{name} range is empty: {}-{}",
                    constraints.min(),
                    constraints.max()
                )));
            }
            if constraints.allows(SpecialChars::QUESTION_MARK) && !name.is_day_field() {
                return Err(CronError::configuration(format!("{name} cannot accept '?'")));
            }
        }
        if self.question_mark_required {
            let accepts = |name: FieldName| {
                self.fields.get(&name).is_some_and(|c| c.allows(SpecialChars::QUESTION_MARK))
            };
            if !accepts(FieldName::DayOfMonth) || !accepts(FieldName::DayOfWeek) {
                return Err(CronError::configuration(
                    "'?' is required but day-of-month and day-of-week do not both accept it",
                ));
            }
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> CronDefinition {
        let fields = self.fields.into_iter().map(|(name, constraints)| FieldDefinition { name, constraints }).collect();
        CronDefinition {
            fields,
            last_field_optional: self.last_field_optional,
            strict_ranges: self.strict_ranges,
            question_mark_required: self.question_mark_required,
            nicknames: self.nicknames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix_builder() -> CronDefinitionBuilder {
        CronDefinitionBuilder::new()
            .with_field(FieldName::Minute)
            .with_field(FieldName::Hour)
            .with_field(FieldName::DayOfMonth)
            .with_field(FieldName::Month)
            .with_field(FieldName::DayOfWeek)
    }

    #[test]
    fn fields_come_out_in_canonical_order() {
        let definition = CronDefinitionBuilder::new()
            .with_field(FieldName::DayOfWeek)
            .with_field(FieldName::Minute)
            .with_field(FieldName::Month)
            .with_field(FieldName::Hour)
            .with_field(FieldName::DayOfMonth)
            .build()
            .unwrap();
        let names: Vec<FieldName> = definition.fields().iter().map(FieldDefinition::name).collect();
        assert_eq!(
            names,
            vec![FieldName::Minute, FieldName::Hour, FieldName::DayOfMonth, FieldName::Month, FieldName::DayOfWeek]
        );
    }

    #[test]
    fn missing_required_field_is_configuration_error() {
        let err = CronDefinitionBuilder::new().with_field(FieldName::Minute).build().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("hour"));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let err = unix_builder().with_field(FieldName::Hour).build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn question_mark_requirement_needs_both_day_fields_to_accept_it() {
        let err = unix_builder().with_question_mark_required().build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn question_mark_outside_day_fields_is_rejected() {
        let err = CronDefinitionBuilder::new()
            .field(FieldName::Minute, |c| c.with_special_chars(SpecialChars::QUESTION_MARK))
            .with_field(FieldName::Hour)
            .with_field(FieldName::DayOfMonth)
            .with_field(FieldName::Month)
            .with_field(FieldName::DayOfWeek)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn predefined_dialects_pass_builder_checks() {
        for kind in [CronType::Unix, CronType::Cron4j, CronType::Quartz, CronType::Spring] {
            let definition = kind.definition();
            let mut builder = CronDefinitionBuilder::new();
            for field in definition.fields() {
                builder = builder.with_constraints(field.name(), field.constraints().clone());
            }
            if definition.is_last_field_optional() {
                builder = builder.with_last_field_optional();
            }
            if definition.requires_question_mark() {
                builder = builder.with_question_mark_required();
            }
            assert!(builder.build().is_ok(), "{kind} failed validation");
        }
    }

    #[test]
    fn arities_follow_optional_trailing_field() {
        let quartz = CronDefinition::instance(CronType::Quartz);
        assert_eq!((quartz.min_arity(), quartz.max_arity()), (6, 7));
        let unix = CronDefinition::instance(CronType::Unix);
        assert_eq!((unix.min_arity(), unix.max_arity()), (5, 5));
    }

    #[test]
    fn instance_is_cached_per_dialect() {
        let a = CronDefinition::instance(CronType::Spring);
        let b = CronDefinition::instance(CronType::Spring);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &CronDefinition::instance(CronType::Quartz)));
    }
}
