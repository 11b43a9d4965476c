//! In-memory implementation of every driven repository port.
//!
//! # Purpose
//! Serves local development, tests, and deployments that run without a
//! database URL. All state is lost on restart.
//!
//! # Consistency
//! State lives in one set of maps behind a single `tokio::sync::RwLock`.
//! Multi-record writes (a postcard and its two contact rows, a promoted
//! stamp and its request) happen under one write guard, so readers never
//! observe half of an operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    CollectOutcome, ContactRepository, ContactRepositoryError, PostcardRepository,
    PostcardRepositoryError, StampCollectionRepository, StampCollectionRepositoryError,
    StampRepository, StampRepositoryError, StampRequestRepository, StampRequestRepositoryError,
    UserAccount, UserRepository, UserRepositoryError,
};
use crate::domain::{
    CollectedStamp, CollectionEntry, Contact, ContactEdge, Postcard, PostcardId, Stamp, StampId,
    StampRequest, StampRequestId, StampRequestStatus, User, UserId, UserSummary, Username,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserAccount>,
    /// Lower-cased username to id.
    usernames: HashMap<String, UserId>,
    emails: HashMap<String, UserId>,
    postcards: HashMap<PostcardId, Postcard>,
    contacts: HashMap<(UserId, UserId), Contact>,
    stamps: HashMap<StampId, Stamp>,
    requests: HashMap<StampRequestId, StampRequest>,
    /// Keyed by `(user, stamp)`; the map key is the uniqueness constraint.
    collections: HashMap<(UserId, StampId), DateTime<Utc>>,
}

impl State {
    fn record_contact(&mut self, edge: &ContactEdge) {
        self.contacts
            .entry((edge.owner, edge.counterpart))
            .and_modify(|contact| contact.record(edge))
            .or_insert_with(|| Contact::first_exchange(edge));
    }
}

/// Shared in-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first_stamps<'a>(stamps: impl Iterator<Item = &'a Stamp>) -> Vec<Stamp> {
    let mut stamps: Vec<Stamp> = stamps.cloned().collect();
    stamps.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
    stamps
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError> {
        let mut state = self.state.write().await;
        let user = &account.user;
        let username_key = user.username().as_ref().to_lowercase();
        if state.usernames.contains_key(&username_key) {
            return Err(UserRepositoryError::duplicate_username(
                user.username().as_ref(),
            ));
        }
        let email_key = user.email().as_ref().to_owned();
        if state.emails.contains_key(&email_key) {
            return Err(UserRepositoryError::duplicate_email());
        }
        state.usernames.insert(username_key, *user.id());
        state.emails.insert(email_key, *user.id());
        state.users.insert(*user.id(), account.clone());
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .usernames
            .get(&username.as_ref().to_lowercase())
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).map(|account| account.user.clone()))
    }

    async fn search(
        &self,
        needle: &str,
        exclude: &UserId,
        limit: usize,
    ) -> Result<Vec<UserSummary>, UserRepositoryError> {
        let needle = needle.to_lowercase();
        let state = self.state.read().await;
        let mut matches: Vec<UserSummary> = state
            .users
            .values()
            .filter(|account| account.user.id() != exclude)
            .filter(|account| {
                account
                    .user
                    .username()
                    .as_ref()
                    .to_lowercase()
                    .contains(&needle)
            })
            .map(|account| account.user.summary())
            .collect();
        matches.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
        matches.truncate(limit);
        Ok(matches)
    }
}

#[async_trait]
impl PostcardRepository for InMemoryStore {
    async fn insert_with_contacts(
        &self,
        postcard: &Postcard,
        edges: &[ContactEdge; 2],
    ) -> Result<(), PostcardRepositoryError> {
        let mut state = self.state.write().await;
        if state.postcards.contains_key(&postcard.id) {
            return Err(PostcardRepositoryError::query(format!(
                "postcard {} already exists",
                postcard.id
            )));
        }
        state.postcards.insert(postcard.id, postcard.clone());
        for edge in edges {
            state.record_contact(edge);
        }
        Ok(())
    }

    async fn list_delivered_to(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Postcard>, PostcardRepositoryError> {
        let state = self.state.read().await;
        let mut inbox: Vec<Postcard> = state
            .postcards
            .values()
            .filter(|postcard| postcard.recipient == *recipient && postcard.delivered)
            .cloned()
            .collect();
        inbox.sort_by(|a, b| {
            b.delivery_date
                .cmp(&a.delivery_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(inbox)
    }

    async fn deliver_due(&self, now: DateTime<Utc>) -> Result<u64, PostcardRepositoryError> {
        let mut state = self.state.write().await;
        let mut delivered = 0_u64;
        for postcard in state.postcards.values_mut() {
            if postcard.is_due(now) {
                postcard.deliver(now);
                delivered += 1;
            }
        }
        Ok(delivered)
    }
}

#[async_trait]
impl ContactRepository for InMemoryStore {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Contact>, ContactRepositoryError> {
        let state = self.state.read().await;
        let mut contacts: Vec<Contact> = state
            .contacts
            .values()
            .filter(|contact| contact.owner == *owner)
            .cloned()
            .collect();
        contacts.sort_by(|a, b| b.last_postcard_at.cmp(&a.last_postcard_at));
        Ok(contacts)
    }
}

#[async_trait]
impl StampRepository for InMemoryStore {
    async fn insert(&self, stamp: &Stamp) -> Result<(), StampRepositoryError> {
        let mut state = self.state.write().await;
        if state.stamps.contains_key(&stamp.id) {
            return Err(StampRepositoryError::query(format!(
                "stamp {} already exists",
                stamp.id
            )));
        }
        state.stamps.insert(stamp.id, stamp.clone());
        Ok(())
    }

    async fn insert_promoted(
        &self,
        stamp: &Stamp,
        request_id: &StampRequestId,
    ) -> Result<(), StampRepositoryError> {
        let mut state = self.state.write().await;
        if state.stamps.contains_key(&stamp.id) {
            return Err(StampRepositoryError::query(format!(
                "stamp {} already exists",
                stamp.id
            )));
        }
        let request = state
            .requests
            .get_mut(request_id)
            .filter(|request| request.is_pending())
            .ok_or_else(|| StampRepositoryError::request_not_pending(request_id.to_string()))?;
        request.status = StampRequestStatus::Approved;
        request.stamp_id = Some(stamp.id);
        state.stamps.insert(stamp.id, stamp.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Stamp>, StampRepositoryError> {
        let state = self.state.read().await;
        Ok(newest_first_stamps(state.stamps.values()))
    }

    async fn list_approved(&self) -> Result<Vec<Stamp>, StampRepositoryError> {
        let state = self.state.read().await;
        Ok(newest_first_stamps(
            state.stamps.values().filter(|stamp| stamp.approved),
        ))
    }
}

#[async_trait]
impl StampRequestRepository for InMemoryStore {
    async fn insert(&self, request: &StampRequest) -> Result<(), StampRequestRepositoryError> {
        let mut state = self.state.write().await;
        if state.requests.contains_key(&request.id) {
            return Err(StampRequestRepositoryError::query(format!(
                "stamp request {} already exists",
                request.id
            )));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &StampRequestId,
    ) -> Result<Option<StampRequest>, StampRequestRepositoryError> {
        let state = self.state.read().await;
        Ok(state.requests.get(id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<StampRequest>, StampRequestRepositoryError> {
        let state = self.state.read().await;
        let mut pending: Vec<StampRequest> = state
            .requests
            .values()
            .filter(|request| request.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(pending)
    }

    async fn decide(
        &self,
        id: &StampRequestId,
        status: StampRequestStatus,
    ) -> Result<Option<StampRequest>, StampRequestRepositoryError> {
        let mut state = self.state.write().await;
        Ok(state
            .requests
            .get_mut(id)
            .filter(|request| request.is_pending())
            .map(|request| {
                request.status = status;
                request.clone()
            }))
    }
}

#[async_trait]
impl StampCollectionRepository for InMemoryStore {
    async fn insert_if_absent(
        &self,
        entry: &CollectionEntry,
    ) -> Result<CollectOutcome, StampCollectionRepositoryError> {
        let mut state = self.state.write().await;
        let key = (entry.user_id, entry.stamp_id);
        if state.collections.contains_key(&key) {
            return Ok(CollectOutcome::AlreadyCollected);
        }
        state.collections.insert(key, entry.collected_at);
        Ok(CollectOutcome::Inserted)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CollectedStamp>, StampCollectionRepositoryError> {
        let state = self.state.read().await;
        let mut collected: Vec<CollectedStamp> = state
            .collections
            .iter()
            .filter(|((owner, _), _)| owner == user_id)
            .filter_map(|((_, stamp_id), collected_at)| {
                state.stamps.get(stamp_id).map(|stamp| CollectedStamp {
                    stamp: stamp.clone(),
                    collected_at: *collected_at,
                })
            })
            .collect();
        collected.sort_by(|a, b| b.collected_at.cmp(&a.collected_at));
        Ok(collected)
    }
}

#[cfg(test)]
mod tests;
