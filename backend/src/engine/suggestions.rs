use std::collections::BTreeMap;

use super::violation::{Suggestion, Violation, ViolationKind};

pub fn remediation(kind: ViolationKind) -> &'static str {
    match kind {
        ViolationKind::Availability => {
            "Consider adjusting work-hour rules or moving shifts into agents' working windows"
        }
        ViolationKind::Skills => "Assign agents who hold the required skills or schedule skill training",
        ViolationKind::TimeLimits => {
            "Redistribute hours so agents stay within their daily and weekly limits"
        }
        ViolationKind::ActivityRules => {
            "Adjust shift lengths to the position's limits and leave rest between stress shifts"
        }
        ViolationKind::Conflicts => "Remove or reschedule overlapping shifts for the same agent",
        ViolationKind::Coverage => "Add agents to understaffed slots to meet forecast demand",
    }
}

/// One advisory hint per violation type present, in reporting order.
pub fn generate(violations: &[Violation]) -> Vec<Suggestion> {
    let mut counts: BTreeMap<ViolationKind, usize> = BTreeMap::new();
    for v in violations {
        *counts.entry(v.kind).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(kind, count)| Suggestion {
            kind,
            message: remediation(kind).to_string(),
            count,
        })
        .collect()
}
