//! Normalized schedule quality scores.
//!
//! | Score | Definition |
//! |-------|-----------|
//! | availability | 1 - AVAILABILITY violations / evaluated shifts, floored at 0 |
//! | skill match | 1 - SKILLS violations / evaluated shifts, floored at 0 |
//! | coverage | sum of min(scheduled, required) / sum of required |
//!
//! Every score is 1.0 when its denominator is zero.

use super::validators::coverage::SlotCoverage;
use super::violation::{Metrics, Violation, ViolationKind};

/// Snapshot sizes the scores are reported alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub shifts: usize,
    pub users: usize,
    pub positions: usize,
}

pub fn calculate(totals: Totals, violations: &[Violation], coverage: &[SlotCoverage<'_>]) -> Metrics {
    let count = |kind: ViolationKind| violations.iter().filter(|v| v.kind == kind).count();

    Metrics {
        total_shifts: totals.shifts,
        total_users: totals.users,
        total_positions: totals.positions,
        coverage_score: coverage_score(coverage),
        skill_match_score: pass_rate(count(ViolationKind::Skills), totals.shifts),
        availability_score: pass_rate(count(ViolationKind::Availability), totals.shifts),
    }
}

fn pass_rate(failures: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (1.0 - failures as f64 / total as f64).max(0.0)
}

fn coverage_score(coverage: &[SlotCoverage<'_>]) -> f64 {
    let required: u64 = coverage.iter().map(|c| u64::from(c.slot.required_agents)).sum();
    if required == 0 {
        return 1.0;
    }
    let covered: u64 = coverage.iter().map(|c| u64::from(c.covered())).sum();
    covered as f64 / required as f64
}
