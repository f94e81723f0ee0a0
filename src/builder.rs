//! Programmatic construction of a [`Cron`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::cron::Cron;
use crate::definition::CronDefinition;
use crate::error::CronResult;
use crate::expression::FieldExpression;
use crate::field::FieldName;
use crate::validator;

/// Builds a [`Cron`] from expression trees instead of text. The result goes
/// through the same validation as parsed input.
///
/// ```
/// use cronweave::expression::{always, on, question_mark};
/// use cronweave::{CronBuilder, CronDefinition, CronType, FieldName};
///
/// let cron = CronBuilder::new(CronDefinition::instance(CronType::Quartz))
///     .with(FieldName::Second, on(0))
///     .with(FieldName::Minute, on(30))
///     .with(FieldName::Hour, on(9))
///     .with(FieldName::DayOfMonth, question_mark())
///     .with(FieldName::Month, always())
///     .with(FieldName::DayOfWeek, on(2))
///     .build()
///     .unwrap();
/// assert_eq!(cron.as_text(), "0 30 9 ? * 2");
/// ```
#[derive(Debug, Clone)]
pub struct CronBuilder {
    definition: Arc<CronDefinition>,
    fields: BTreeMap<FieldName, FieldExpression>,
}

impl CronBuilder {
    pub fn new(definition: Arc<CronDefinition>) -> Self {
        CronBuilder { definition, fields: BTreeMap::new() }
    }

    /// Set (or replace) the expression for `name`.
    pub fn with(mut self, name: FieldName, expression: FieldExpression) -> Self {
        self.fields.insert(name, expression);
        self
    }

    pub fn build(self) -> CronResult<Cron> {
        validator::validate_cron(&self.definition, &self.fields)?;
        let cron = Cron::from_parts(self.definition, self.fields);
        debug!(expression = %cron, "built cron expression");
        Ok(cron)
    }
}
