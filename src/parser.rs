//! Turning cron text into a validated [`Cron`].
//!
//! Parsing happens in two layers:
//!
//! ```text
//! "0 */15 9-17 ? * MON-FRI"
//!     │ nickname expansion, uppercase, split on whitespace, arity check
//!     v
//! per field: FieldParser::parse            (syntax only -> CronError::Parse)
//!     │ split ',' -> alternatives, split '/' -> step,
//!     │ '*', '?', 'a-b', value with L / W / #n suffix
//!     v
//! validator::validate_cron                 (semantics -> CronError::Validation)
//!     v
//! Cron
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::constraints::FieldConstraints;
use crate::cron::Cron;
use crate::definition::CronDefinition;
use crate::error::{CronError, CronResult};
use crate::expression::FieldExpression;
use crate::field::{FieldName, FieldValue};
use crate::validator;

/// Parse `text` under `definition`.
///
/// ```
/// use cronweave::{CronDefinition, CronType, parse};
///
/// let unix = CronDefinition::instance(CronType::Unix);
/// let cron = parse(&unix, "*/15 9-17 * * mon-fri").unwrap();
/// assert_eq!(cron.as_text(), "*/15 9-17 * * 1-5");
/// ```
pub fn parse(definition: &Arc<CronDefinition>, text: &str) -> CronResult<Cron> {
    CronParser::new(Arc::clone(definition)).parse(text)
}

/// Parser bound to one dialect.
#[derive(Debug, Clone)]
pub struct CronParser {
    definition: Arc<CronDefinition>,
}

impl CronParser {
    pub fn new(definition: Arc<CronDefinition>) -> Self {
        CronParser { definition }
    }

    pub fn definition(&self) -> &Arc<CronDefinition> {
        &self.definition
    }

    /// Parse and validate. Never returns a partially built cron.
    pub fn parse(&self, text: &str) -> CronResult<Cron> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CronError::Parse { field: None, token: text.to_string(), message: "empty expression".into() });
        }

        let expanded;
        let source = if trimmed.starts_with('@') {
            expanded = self.expand_nickname(trimmed)?;
            expanded.as_str()
        } else {
            trimmed
        };

        let upper = source.to_ascii_uppercase();
        let parts: Vec<&str> = upper.split_whitespace().collect();
        let (min, max) = (self.definition.min_arity(), self.definition.max_arity());
        if parts.len() < min || parts.len() > max {
            let expected = if min == max { min.to_string() } else { format!("{min} or {max}") };
            return Err(CronError::Parse {
                field: None,
                token: trimmed.to_string(),
                message: format!("expected {expected} fields, found {}", parts.len()),
            });
        }

        let mut fields = BTreeMap::new();
        for (definition, raw) in self.definition.fields().iter().zip(parts.iter()) {
            let expression = FieldParser::new(definition.name(), definition.constraints()).parse(raw)?;
            fields.insert(definition.name(), expression);
        }

        if let Err(err) = validator::validate_cron(&self.definition, &fields) {
            debug!(expression = trimmed, error = %err, "cron expression failed validation");
            return Err(err);
        }

        let cron = Cron::from_parts(Arc::clone(&self.definition), fields);
        debug!(expression = trimmed, fields = parts.len(), "parsed cron expression");
        Ok(cron)
    }

    /// Expand `@daily` and friends into this dialect's field layout.
    fn expand_nickname(&self, nickname: &str) -> CronResult<String> {
        let unsupported = |message: &str| CronError::Parse {
            field: None,
            token: nickname.to_string(),
            message: message.to_string(),
        };
        if !self.definition.supports_nicknames() {
            return Err(unsupported("nicknames are not supported by this dialect"));
        }

        // minute, hour, day-of-month, month, day-of-week
        let base: [&str; 5] = match nickname.to_ascii_lowercase().as_str() {
            "@yearly" | "@annually" => ["0", "0", "1", "1", "*"],
            "@monthly" => ["0", "0", "1", "*", "*"],
            "@weekly" => ["0", "0", "*", "*", "0"],
            "@daily" | "@midnight" => ["0", "0", "*", "*", "*"],
            "@hourly" => ["0", "*", "*", "*", "*"],
            _ => return Err(unsupported("unknown nickname")),
        };
        let weekly = base[4] != "*";

        let mut out: Vec<&str> = Vec::with_capacity(self.definition.max_arity());
        for (idx, field) in self.definition.fields().iter().enumerate() {
            let optional_tail = self.definition.is_last_field_optional() && idx + 1 == self.definition.max_arity();
            let value = match field.name() {
                FieldName::Second => "0",
                FieldName::Minute => base[0],
                FieldName::Hour => base[1],
                FieldName::DayOfMonth if self.definition.requires_question_mark() && weekly => "?",
                FieldName::DayOfMonth => base[2],
                FieldName::Month => base[3],
                FieldName::DayOfWeek if self.definition.requires_question_mark() && !weekly => "?",
                FieldName::DayOfWeek => base[4],
                FieldName::Year if optional_tail => continue,
                FieldName::Year => "*",
            };
            out.push(value);
        }
        Ok(out.join(" "))
    }
}

/// Parses one field's text against its constraints.
#[derive(Debug, Clone, Copy)]
pub struct FieldParser<'a> {
    name: FieldName,
    constraints: &'a FieldConstraints,
}

impl<'a> FieldParser<'a> {
    pub fn new(name: FieldName, constraints: &'a FieldConstraints) -> Self {
        FieldParser { name, constraints }
    }

    /// Parse `raw` into an expression tree. Input is expected upper-cased.
    pub fn parse(&self, raw: &str) -> CronResult<FieldExpression> {
        if !regex!(r"^[0-9A-Z*?/,#\-]+$").is_match(raw) {
            return Err(parse_err!(self.name, raw, "unexpected character"));
        }

        let mut alternatives = Vec::new();
        for token in raw.split(',') {
            if token.is_empty() {
                return Err(parse_err!(self.name, raw, "empty list element"));
            }
            alternatives.push(self.parse_token(token)?);
        }

        if alternatives.len() == 1 {
            Ok(alternatives.remove(0))
        } else {
            Ok(FieldExpression::Alternatives(alternatives))
        }
    }

    fn parse_token(&self, token: &str) -> CronResult<FieldExpression> {
        let (base, step) = match token.split_once('/') {
            Some((base, step)) => (base, Some(self.parse_step(token, step)?)),
            None => (token, None),
        };
        if base.is_empty() {
            return Err(parse_err!(self.name, token, "missing value before '/'"));
        }

        match base {
            "*" => Ok(FieldExpression::Always { period: step.unwrap_or(1) }),
            "?" if step.is_some() => Err(parse_err!(self.name, token, "'?' cannot take a step")),
            "?" => Ok(FieldExpression::NoConstraint),
            _ => {
                if let Some((from, to)) = base.split_once('-') {
                    let from = self.parse_number(from)?;
                    let to = self.parse_number(to)?;
                    return Ok(FieldExpression::Between { from, to, period: step.unwrap_or(1) });
                }
                let Some(period) = step else {
                    return Ok(FieldExpression::On(self.parse_value(base)?));
                };
                // `a/n` starts at `a` as written and runs to the top of the field.
                match self.parse_number(base) {
                    Ok(from) => Ok(FieldExpression::Between { from, to: self.constraints.max(), period }),
                    Err(_) if self.parse_value(base).is_ok() => {
                        Err(parse_err!(self.name, token, "special values cannot take a step"))
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    fn parse_step(&self, token: &str, step: &str) -> CronResult<u32> {
        match step.parse::<u32>() {
            Ok(0) => Err(parse_err!(self.name, token, "step must be positive")),
            Ok(period) if i32::try_from(period).is_err() => Err(parse_err!(self.name, token, "step is too large")),
            Ok(period) => Ok(period),
            Err(_) => Err(parse_err!(self.name, token, "invalid step '{step}'")),
        }
    }

    fn parse_value(&self, text: &str) -> CronResult<FieldValue> {
        if let Some(value) = self.constraints.resolve_name(text) {
            return Ok(FieldValue::Int(value));
        }
        match text {
            "L" => return Ok(FieldValue::Last),
            "LW" => return Ok(FieldValue::LastWeekday),
            _ => {}
        }
        if let Some((base, nth)) = text.split_once('#') {
            if base.is_empty() {
                return Err(parse_err!(self.name, text, "'#' needs a preceding day-of-week value"));
            }
            let nth = nth.parse::<u32>().map_err(|_| parse_err!(self.name, text, "invalid occurrence '{nth}'"))?;
            return Ok(FieldValue::NthOccurrence(self.parse_number(base)?, nth));
        }
        if let Some(caps) = regex!(r"^([0-9]+)W$").captures(text) {
            return Ok(FieldValue::NearestWeekday(self.parse_number(&caps[1])?));
        }
        Ok(FieldValue::Int(self.constraints.remap(self.parse_number(text)?)))
    }

    /// A bare number or a symbolic name.
    fn parse_number(&self, text: &str) -> CronResult<i32> {
        if let Some(value) = self.constraints.resolve_name(text) {
            return Ok(value);
        }
        if regex!(r"^[0-9]+$").is_match(text) {
            return text.parse::<i32>().map_err(|_| parse_err!(self.name, text, "number too large"));
        }
        if text.chars().all(|c| c.is_ascii_alphabetic()) {
            Err(parse_err!(self.name, text, "unrecognized name"))
        } else {
            Err(parse_err!(self.name, text, "unrecognized value"))
        }
    }
}
