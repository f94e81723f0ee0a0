//! Execution-time calculation for a parsed [`Cron`].
//!
//! Matching happens on wall-clock time in the caller's time zone. When a
//! wall-clock instant does not exist (spring-forward gap) it is skipped; when
//! it exists twice (fall-back overlap) only the earlier offset fires.

#[path = "execution/matcher.rs"]
mod matcher;
#[path = "execution/search.rs"]
mod search;

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Timelike};
use tracing::{debug, trace};

use crate::calendar::{Grain, start_of};
use crate::cron::Cron;
use crate::field::FieldName;
use search::Schedule;

/// Computes next/previous executions of one cron.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use cronweave::{CronDefinition, CronType, ExecutionTime, parse};
///
/// let cron = parse(&CronDefinition::instance(CronType::Unix), "*/15 * * * *").unwrap();
/// let execution = ExecutionTime::for_cron(&cron);
/// let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(execution.next_execution(&from), Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 15, 0).unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionTime {
    cron: Cron,
    grain: Grain,
}

impl ExecutionTime {
    pub fn for_cron(cron: &Cron) -> Self {
        debug_assert!(cron.validate().is_ok(), "execution time built for an invalid cron");
        let grain = if cron.definition().contains(FieldName::Second) { Grain::Second } else { Grain::Minute };
        debug!(expression = %cron, ?grain, "execution time ready");
        ExecutionTime { cron: cron.clone(), grain }
    }

    pub fn cron(&self) -> &Cron {
        &self.cron
    }

    /// First execution strictly after `from`.
    pub fn next_execution<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let schedule = Schedule::new(&self.cron);
        let tz = from.timezone();
        let unit = self.grain.duration();
        let mut candidate = start_of(self.grain, from.naive_local()) + unit;

        loop {
            let local = schedule.next_after(candidate)?;
            if let Some(found) = resolve(&tz, local, |dt| dt > from) {
                return Some(found);
            }
            trace!(%local, "wall-clock match skipped");
            candidate = local + unit;
        }
    }

    /// Last execution strictly before `from`.
    pub fn previous_execution<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let schedule = Schedule::new(&self.cron);
        let tz = from.timezone();
        let unit = self.grain.duration();
        let local = from.naive_local();
        let truncated = start_of(self.grain, local);
        let mut candidate = if truncated < local { truncated } else { truncated - unit };

        loop {
            let local = schedule.previous_before(candidate)?;
            if let Some(found) = resolve(&tz, local, |dt| dt < from) {
                return Some(found);
            }
            trace!(%local, "wall-clock match skipped");
            candidate = local - unit;
        }
    }

    /// Whether the cron fires exactly at `at`.
    ///
    /// Sub-second instants never match, and neither does the second pass
    /// through a repeated wall-clock hour.
    pub fn is_match<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        if at.nanosecond() != 0 {
            return false;
        }
        let local = at.naive_local();
        Schedule::new(&self.cron).matches(local) && at.timezone().from_local_datetime(&local).earliest().as_ref() == Some(at)
    }

    pub fn time_to_next<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<Duration> {
        self.next_execution(from).map(|next| next.signed_duration_since(from))
    }

    pub fn time_from_previous<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<Duration> {
        self.previous_execution(from).map(|previous| from.clone().signed_duration_since(previous))
    }

    /// Executions after `from`, ascending.
    pub fn upcoming<'a, Tz: TimeZone>(&'a self, from: &DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> + use<'a, Tz> {
        std::iter::successors(self.next_execution(from), move |last| self.next_execution(last))
    }

    /// Executions before `from`, descending.
    pub fn preceding<'a, Tz: TimeZone>(&'a self, from: &DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> + use<'a, Tz> {
        std::iter::successors(self.previous_execution(from), move |last| self.previous_execution(last))
    }

    /// Number of executions in `(start, end]`.
    pub fn count_executions<Tz: TimeZone>(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> usize {
        self.upcoming(start).take_while(|dt| dt <= end).count()
    }
}

/// Map a wall-clock match to an instant, taking the earlier offset of an
/// ambiguous time. `accept` filters out instants on the wrong side of the origin.
fn resolve<Tz: TimeZone>(
    tz: &Tz,
    local: NaiveDateTime,
    accept: impl Fn(&DateTime<Tz>) -> bool,
) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) if accept(&dt) => Some(dt),
        LocalResult::Single(_) | LocalResult::Ambiguous(..) | LocalResult::None => None,
    }
}
