//! Ranking rules for competition participants.
//!
//! Lower average daily usage ranks better. Participants with an average hold the
//! dense positions `1..=k` ordered by `(average, participant id)`; those without one
//! follow at `k+1..=k+m` ordered by participant id, so every position in a
//! competition is distinct.
//!
//! Everything here is pure. Storage backends call these functions inside whatever
//! critical section they use to serialize updates to one competition.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::entities::Participant;
use crate::value_objects::Snowflake;

/// New position for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankAssignment {
    pub participant_id: Snowflake,
    pub position: i32,
}

/// Fold one usage observation into the running average.
///
/// The first observation becomes the average; later ones are blended with
/// `(old + minutes) / 2`. This is a two-point moving average, not a time-weighted
/// mean over days.
pub fn next_average(previous: Option<f64>, minutes: f64) -> f64 {
    match previous {
        Some(old) => (old + minutes) / 2.0,
        None => minutes,
    }
}

fn by_usage(a: &Participant, b: &Participant) -> Ordering {
    match (a.average_daily_usage, b.average_daily_usage) {
        (Some(x), Some(y)) => x.total_cmp(&y).then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

/// Compute the full ranking of a competition's participants
pub fn rank_participants(participants: &[Participant]) -> Vec<RankAssignment> {
    let mut ordered: Vec<&Participant> = participants.iter().collect();
    ordered.sort_by(|a, b| by_usage(a, b));

    ordered
        .into_iter()
        .zip(1..)
        .map(|(p, position)| RankAssignment {
            participant_id: p.id,
            position,
        })
        .collect()
}

/// Close the gaps left after a participant leaves.
///
/// Participants that already hold a position keep their relative order and are
/// renumbered `1..=n`. Participants without a position are left alone.
pub fn compact_positions(participants: &[Participant]) -> Vec<RankAssignment> {
    let mut positioned: Vec<(i32, Snowflake)> = participants
        .iter()
        .filter_map(|p| p.position.map(|pos| (pos, p.id)))
        .collect();
    positioned.sort_unstable();

    positioned
        .into_iter()
        .zip(1..)
        .map(|((_, participant_id), position)| RankAssignment {
            participant_id,
            position,
        })
        .collect()
}

/// Write assignments back onto in-memory participants
pub fn apply_assignments(participants: &mut [Participant], assignments: &[RankAssignment]) {
    let by_id: HashMap<Snowflake, i32> = assignments
        .iter()
        .map(|a| (a.participant_id, a.position))
        .collect();

    for participant in participants.iter_mut() {
        if let Some(position) = by_id.get(&participant.id) {
            participant.position = Some(*position);
        }
    }
}

/// Persisted ranking of one competition, split by whether a usage average exists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    /// Participants with an average, ascending by position
    pub ranked: Vec<Participant>,
    /// Participants without an average, ascending by id
    pub unranked: Vec<Participant>,
}

impl Leaderboard {
    /// Split participants as stored. Nothing is re-ranked here.
    pub fn from_participants(participants: Vec<Participant>) -> Self {
        let (mut ranked, mut unranked): (Vec<_>, Vec<_>) =
            participants.into_iter().partition(Participant::is_ranked);

        ranked.sort_by(|a, b| match (a.position, b.position) {
            (Some(x), Some(y)) => x.cmp(&y).then(a.id.cmp(&b.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        unranked.sort_by_key(|p| p.id);

        Self { ranked, unranked }
    }

    /// Best-ranked participant, if anyone has recorded usage
    pub fn leader(&self) -> Option<&Participant> {
        self.ranked.first()
    }

    pub fn len(&self) -> usize {
        self.ranked.len() + self.unranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty() && self.unranked.is_empty()
    }
}
