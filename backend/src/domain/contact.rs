//! Directed contact edges derived from postcard sends.
//!
//! Every postcard between A and B touches two rows: (owner A, counterpart B)
//! and (owner B, counterpart A). Each row remembers the latest exchange and
//! the set of postcards exchanged in either direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Postcard, PostcardId, UserId};

/// Contact row owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// User the row belongs to.
    #[schema(value_type = String)]
    pub owner: UserId,
    /// The other party.
    #[schema(value_type = String)]
    pub counterpart: UserId,
    /// Send instant of the most recent postcard in either direction.
    pub last_postcard_at: DateTime<Utc>,
    /// Postcards exchanged, in first-seen order, without duplicates.
    pub postcard_ids: Vec<PostcardId>,
}

impl Contact {
    /// Row created by the first exchange on `edge`.
    #[must_use]
    pub fn first_exchange(edge: &ContactEdge) -> Self {
        Self {
            owner: edge.owner,
            counterpart: edge.counterpart,
            last_postcard_at: edge.sent_at,
            postcard_ids: vec![edge.postcard_id],
        }
    }

    /// Apply a later exchange: refresh the timestamp and add the postcard
    /// reference if it is not already present.
    pub fn record(&mut self, edge: &ContactEdge) {
        self.last_postcard_at = edge.sent_at;
        if !self.postcard_ids.contains(&edge.postcard_id) {
            self.postcard_ids.push(edge.postcard_id);
        }
    }
}

/// One directed upsert produced by a postcard send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEdge {
    /// Row owner.
    pub owner: UserId,
    /// Row counterpart.
    pub counterpart: UserId,
    /// Postcard that caused the upsert.
    pub postcard_id: PostcardId,
    /// Send instant written to `last_postcard_at`.
    pub sent_at: DateTime<Utc>,
}

impl ContactEdge {
    /// Both directed edges for `postcard`, sender side first.
    #[must_use]
    pub fn pair_for(postcard: &Postcard) -> [Self; 2] {
        let edge = |owner, counterpart| Self {
            owner,
            counterpart,
            postcard_id: postcard.id,
            sent_at: postcard.created_at,
        };
        [
            edge(postcard.sender, postcard.recipient),
            edge(postcard.recipient, postcard.sender),
        ]
    }
}
