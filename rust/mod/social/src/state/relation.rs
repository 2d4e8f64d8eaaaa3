//! Like and follow relations, stored at `relation/{kind}/{actor}/{target}`.

use std::fmt;

use flux_derive::state;
use serde::{Deserialize, Serialize};
use socialbook_client::ToggleAck;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    Like,
    Follow,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Like => "like",
            RelationKind::Follow => "follow",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one toggleable relation: who acts on what.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationKey {
    pub kind: RelationKind,
    pub actor: String,
    pub target: String,
}

impl RelationKey {
    pub fn like(actor: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self { kind: RelationKind::Like, actor: actor.into(), target: post_id.into() }
    }

    pub fn follow(actor: impl Into<String>, username: impl Into<String>) -> Self {
        Self { kind: RelationKind::Follow, actor: actor.into(), target: username.into() }
    }

    pub fn path(&self) -> String {
        format!("{}/{}/{}/{}", RelationState::PATH, self.kind, self.actor, self.target)
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.actor, self.target)
    }
}

/// Flag plus count: "liked, 4 likes" or "following, 12 followers".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub active: bool,
    pub count: u32,
}

impl Relation {
    pub fn new(active: bool, count: u32) -> Self {
        Self { active, count }
    }

    /// The optimistic guess: flip the flag and move the count with it.
    pub fn toggled(self) -> Self {
        let count = if self.active {
            self.count.saturating_sub(1)
        } else {
            self.count.saturating_add(1)
        };
        Self { active: !self.active, count }
    }

    /// Settle against the server's answer, starting from the value held
    /// before the optimistic apply. The server flag always wins; its count
    /// wins when present, otherwise the count moves by the flag delta.
    pub fn settle(self, ack: ToggleAck) -> Self {
        let count = match ack.count {
            Some(count) => count,
            None => match (self.active, ack.active) {
                (false, true) => self.count.saturating_add(1),
                (true, false) => self.count.saturating_sub(1),
                _ => self.count,
            },
        };
        Self { active: ack.active, count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationPhase {
    /// Server-authoritative, including values seeded from a query.
    Confirmed,
    /// Optimistic; a call is in flight.
    Applied,
    /// A call failed and the pre-optimistic value was restored.
    RolledBack,
}

#[state("relation")]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationState {
    #[serde(flatten)]
    pub relation: Relation,
    pub phase: MutationPhase,
}

impl RelationState {
    pub fn confirmed(relation: Relation) -> Self {
        Self { relation, phase: MutationPhase::Confirmed }
    }

    pub fn in_flight(&self) -> bool {
        self.phase == MutationPhase::Applied
    }
}
