//! A parsed, validated cron expression.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::constraints::FieldConstraints;
use crate::definition::CronDefinition;
use crate::error::CronResult;
use crate::expression::FieldExpression;
use crate::field::FieldName;
use crate::validator;

/// Immutable mapping of field name to expression for one parsed string.
///
/// Only produced by [`parse`](crate::parse) or [`CronBuilder`](crate::CronBuilder),
/// both of which validate before handing the value out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cron {
    definition: Arc<CronDefinition>,
    fields: BTreeMap<FieldName, FieldExpression>,
}

/// Borrowed view of one field of a [`Cron`].
#[derive(Debug, Clone, Copy)]
pub struct CronField<'a> {
    pub name: FieldName,
    pub expression: &'a FieldExpression,
    pub constraints: &'a FieldConstraints,
}

impl Cron {
    pub(crate) fn from_parts(definition: Arc<CronDefinition>, fields: BTreeMap<FieldName, FieldExpression>) -> Self {
        Cron { definition, fields }
    }

    pub fn definition(&self) -> &Arc<CronDefinition> {
        &self.definition
    }

    pub fn expression(&self, name: FieldName) -> Option<&FieldExpression> {
        self.fields.get(&name)
    }

    pub fn field(&self, name: FieldName) -> Option<CronField<'_>> {
        let expression = self.fields.get(&name)?;
        let constraints = self.definition.field(name)?.constraints();
        Some(CronField { name, expression, constraints })
    }

    /// Fields present in this cron, in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = CronField<'_>> {
        self.definition.fields().iter().filter_map(|def| {
            let expression = self.fields.get(&def.name())?;
            Some(CronField { name: def.name(), expression, constraints: def.constraints() })
        })
    }

    /// Re-run validation; useful after deserializing or building by hand.
    pub fn validate(&self) -> CronResult<&Self> {
        validator::validate_cron(&self.definition, &self.fields)?;
        Ok(self)
    }

    /// Space separated text that re-parses to an equivalent cron.
    pub fn as_text(&self) -> String {
        self.fields().map(|field| field.expression.as_text()).collect::<Vec<_>>().join(" ")
    }

    /// Whether `other` expresses the same schedule in the same dialect.
    ///
    /// Alternatives are compared as sets, and an absent optional trailing
    /// field equals an explicit `*`.
    pub fn equivalent(&self, other: &Cron) -> bool {
        if *self.definition != *other.definition {
            return false;
        }
        self.definition.fields().iter().all(|def| {
            let name = def.name();
            normal_form(self.fields.get(&name)) == normal_form(other.fields.get(&name))
        })
    }
}

impl fmt::Display for Cron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

fn normal_form(expression: Option<&FieldExpression>) -> Vec<String> {
    let mut parts = match expression {
        None => vec!["*".to_string()],
        Some(FieldExpression::Alternatives(children)) => children.iter().map(FieldExpression::as_text).collect(),
        Some(single) => vec![single.as_text()],
    };
    parts.sort();
    parts.dedup();
    parts
}

#[cfg(test)]
mod tests {
    use crate::definition::{CronDefinition, CronType};
    use crate::field::FieldName;
    use crate::parse;

    #[test]
    fn as_text_round_trips() {
        let quartz = CronDefinition::instance(CronType::Quartz);
        let cron = parse(&quartz, "0 15 10 ? JAN-MAR MON#2 2030").unwrap();
        assert_eq!(cron.as_text(), "0 15 10 ? 1-3 2#2 2030");
        let again = parse(&quartz, &cron.as_text()).unwrap();
        assert_eq!(cron, again);
    }

    #[test]
    fn fields_iterate_in_definition_order() {
        let spring = CronDefinition::instance(CronType::Spring);
        let cron = parse(&spring, "1 2 3 4 5 ?").unwrap();
        let names: Vec<FieldName> = cron.fields().map(|f| f.name).collect();
        assert_eq!(names.first(), Some(&FieldName::Second));
        assert_eq!(names.last(), Some(&FieldName::DayOfWeek));
        assert_eq!(cron.field(FieldName::Hour).unwrap().constraints.max(), 23);
    }

    #[test]
    fn equivalence_ignores_list_order_and_optional_year() {
        let quartz = CronDefinition::instance(CronType::Quartz);
        let a = parse(&quartz, "0 0 1,2,3 ? * *").unwrap();
        let b = parse(&quartz, "0 0 3,1,2 ? * * *").unwrap();
        assert!(a.equivalent(&b));
        let c = parse(&quartz, "0 0 4 ? * *").unwrap();
        assert!(!a.equivalent(&c));
    }

    #[test]
    fn crons_from_different_dialects_are_not_equivalent() {
        let unix = parse(&CronDefinition::instance(CronType::Unix), "0 0 * * *").unwrap();
        let cron4j = parse(&CronDefinition::instance(CronType::Cron4j), "0 0 * * *").unwrap();
        assert!(!unix.equivalent(&cron4j));
        assert!(unix.validate().is_ok());
    }
}
