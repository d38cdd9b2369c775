//! The six stateless rule checkers. Each reads the shared
//! [`ScheduleContext`](super::context::ScheduleContext) and returns its
//! findings in a deterministic order; none depends on another's output.

pub mod activity_rules;
pub mod availability;
pub mod conflicts;
pub mod coverage;
pub mod skills;
pub mod time_limits;
