use std::collections::BTreeMap;

use rand::RngCore;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::script::model::Character;

/// Roles bound to the two most frequent participants, in rank order.
pub const LEAD_ROLES: [Character; 2] = [Character::Phoenix, Character::Edgeworth];

/// Roles handed out at random to everyone else.
pub const SUPPORTING_ROLES: [Character; 12] = [
    Character::Godot,
    Character::Franziska,
    Character::Judge,
    Character::Larry,
    Character::Maya,
    Character::Karma,
    Character::Payne,
    Character::Maggey,
    Character::Pearl,
    Character::Lotta,
    Character::Gumshoe,
    Character::Grossberg,
];

/// Order participants by how often they appear, most frequent first.
///
/// Ties keep first-appearance order.
pub fn rank_participants<S: AsRef<str>>(appearances: &[S]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for who in appearances {
        let who = who.as_ref();
        match counts.iter_mut().find(|(name, _)| name == who) {
            Some((_, n)) => *n += 1,
            None => counts.push((who.to_owned(), 1)),
        }
    }
    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(name, _)| name).collect()
}

/// One-to-one binding of conversation participants to cast members for a single job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CastAssignment {
    by_participant: BTreeMap<String, Character>,
}

impl CastAssignment {
    /// Bind ranked participants: the first two take the lead roles, the rest draw unused
    /// supporting roles from `rng`.
    pub fn assign<S: AsRef<str>>(ranked: &[S], rng: &mut dyn RngCore) -> TurnaboutResult<Self> {
        let mut by_participant = BTreeMap::new();
        let mut taken: Vec<Character> = Vec::with_capacity(ranked.len());

        for (rank, who) in ranked.iter().enumerate() {
            let who = who.as_ref();
            if by_participant.contains_key(who) {
                return Err(TurnaboutError::validation(format!(
                    "participant '{who}' is listed more than once"
                )));
            }

            let role = match LEAD_ROLES.get(rank) {
                Some(&lead) => lead,
                None => {
                    let free: Vec<Character> = SUPPORTING_ROLES
                        .into_iter()
                        .filter(|c| !taken.contains(c))
                        .collect();
                    *free.choose(rng).ok_or_else(|| {
                        TurnaboutError::validation(format!(
                            "cast is full: cannot seat '{who}' ({} participants, {} roles)",
                            ranked.len(),
                            LEAD_ROLES.len() + SUPPORTING_ROLES.len()
                        ))
                    })?
                }
            };
            taken.push(role);
            by_participant.insert(who.to_owned(), role);
        }

        Ok(Self { by_participant })
    }

    /// Character played by `participant`.
    pub fn character_for(&self, participant: &str) -> Option<Character> {
        self.by_participant.get(participant).copied()
    }

    /// Participant playing `character`.
    pub fn participant_for(&self, character: Character) -> Option<&str> {
        self.by_participant
            .iter()
            .find(|(_, c)| **c == character)
            .map(|(p, _)| p.as_str())
    }

    /// Number of seated participants.
    pub fn len(&self) -> usize {
        self.by_participant.len()
    }

    /// Return `true` when nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.by_participant.is_empty()
    }

    /// Iterate `(participant, character)` pairs in participant order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Character)> {
        self.by_participant.iter().map(|(p, c)| (p.as_str(), *c))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/cast.rs"]
mod tests;
