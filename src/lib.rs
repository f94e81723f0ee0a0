//! Cron expressions in several dialects, and the instants they select.
//!
//! A [`CronDefinition`] describes a dialect: which fields exist, their value
//! ranges and names, and which special characters each accepts. Four
//! dialects ship ready-made ([`CronType`]); custom ones are assembled with
//! [`CronDefinitionBuilder`].
//!
//! Text is parsed against a definition into an immutable [`Cron`], a map of
//! field name to [`FieldExpression`] tree. [`ExecutionTime`] then answers
//! "when next / when last / does it fire now" in any chrono time zone.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use cronweave::{CronDefinition, CronType, ExecutionTime, parse};
//!
//! let quartz = CronDefinition::instance(CronType::Quartz);
//! let cron = parse(&quartz, "0 0 9 ? * MON-FRI").unwrap();
//! let execution = ExecutionTime::for_cron(&cron);
//!
//! // 2024-01-06 is a Saturday.
//! let from = Utc.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap();
//! let next = execution.next_execution(&from).unwrap();
//! assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap());
//! ```

#[macro_use]
mod macros;

mod builder;
mod calendar;
mod constraints;
mod cron;
mod definition;
mod error;
mod execution;
pub mod expression;
mod field;
mod parser;
pub mod validator;

pub use builder::CronBuilder;
pub use constraints::{FieldConstraints, FieldConstraintsBuilder, WeekdayNumbering};
pub use cron::{Cron, CronField};
pub use definition::{CronDefinition, CronDefinitionBuilder, CronType, FieldDefinition};
pub use error::{CronError, CronResult};
pub use execution::ExecutionTime;
pub use expression::FieldExpression;
pub use field::{FieldName, FieldValue, SpecialChar, SpecialChars};
pub use parser::{CronParser, FieldParser, parse};
