//! Ranking of setter candidates.
//!
//! Candidates are ordered by a total key so the outcome never depends on the
//! order in which they were compared:
//!
//! 1. An exact direct method is final. An exact adapter comes next; exact
//!    matches beat every inexact one regardless of view type
//! 2. A more specific (deeper) view type
//! 3. Value match quality ([`ValueRank`])
//! 4. Discovery order

use std::cmp::Reverse;

use super::{SetterMatch, SetterTarget};
use crate::conversion::ValueRank;

type RankKey = (u8, Reverse<usize>, ValueRank, usize);

fn rank_key(candidate: &SetterMatch) -> RankKey {
    let tier = match (&candidate.target, candidate.value_match.is_exact()) {
        (SetterTarget::Direct(_), true) => 0,
        (SetterTarget::Adapter(_), true) => 1,
        _ => 2,
    };
    (
        tier,
        Reverse(candidate.view_depth),
        candidate.value_match.rank(),
        candidate.sequence,
    )
}

/// Find the best match among viable candidates, if any.
pub fn find_best_match(candidates: &[SetterMatch]) -> Option<&SetterMatch> {
    candidates.iter().min_by_key(|candidate| rank_key(candidate))
}
