//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! stored values and surface corruption as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, ImageRef, MessageText, PasswordHash, Postcard, PostcardId, Stamp, StampId,
    StampOrigin, StampPrompt, StampRequest, StampRequestId, StampRequestStatus, User, UserId,
    Username,
};
use crate::domain::{Contact, ports::UserAccount};

use super::schema::{contacts, postcards, stamp_collections, stamp_requests, stamps, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_account(self) -> Result<UserAccount, String> {
        let username = Username::new(self.username)
            .map_err(|err| format!("invalid username in database: {err}"))?;
        let email = EmailAddress::new(self.email)
            .map_err(|err| format!("invalid email in database: {err}"))?;
        Ok(UserAccount {
            user: User::new(
                UserId::from_uuid(self.id),
                username,
                email,
                self.is_admin,
                self.created_at,
            ),
            password_hash: PasswordHash::from_encoded(self.password_hash),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Postcards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = postcards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostcardRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub message: String,
    pub stamp_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub opened: bool,
}

impl From<&Postcard> for PostcardRow {
    fn from(postcard: &Postcard) -> Self {
        Self {
            id: *postcard.id.as_uuid(),
            sender_id: *postcard.sender.as_uuid(),
            recipient_id: *postcard.recipient.as_uuid(),
            message: postcard.message.as_ref().to_owned(),
            stamp_ids: postcard.stamps.iter().map(|id| *id.as_uuid()).collect(),
            created_at: postcard.created_at,
            delivery_date: postcard.delivery_date,
            delivered: postcard.delivered,
            delivered_at: postcard.delivered_at,
            opened: postcard.opened,
        }
    }
}

impl TryFrom<PostcardRow> for Postcard {
    type Error = String;

    fn try_from(row: PostcardRow) -> Result<Self, Self::Error> {
        let message = MessageText::new(row.message)
            .map_err(|err| format!("invalid postcard message in database: {err}"))?;
        Ok(Self {
            id: PostcardId::from_uuid(row.id),
            sender: UserId::from_uuid(row.sender_id),
            recipient: UserId::from_uuid(row.recipient_id),
            message,
            stamps: row.stamp_ids.into_iter().map(StampId::from_uuid).collect(),
            created_at: row.created_at,
            delivery_date: row.delivery_date,
            delivered: row.delivered,
            delivered_at: row.delivered_at,
            opened: row.opened,
        })
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactRow {
    pub owner_id: Uuid,
    pub counterpart_id: Uuid,
    pub last_postcard_at: DateTime<Utc>,
    pub postcard_ids: Vec<Uuid>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            owner: UserId::from_uuid(row.owner_id),
            counterpart: UserId::from_uuid(row.counterpart_id),
            last_postcard_at: row.last_postcard_at,
            postcard_ids: row
                .postcard_ids
                .into_iter()
                .map(PostcardId::from_uuid)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stamps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = stamps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StampRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub approved: bool,
    pub request_id: Option<Uuid>,
    pub prompt: Option<String>,
    pub submitted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Stamp> for StampRow {
    fn from(stamp: &Stamp) -> Self {
        let origin = stamp.origin.as_ref();
        Self {
            id: *stamp.id.as_uuid(),
            name: stamp.name.clone(),
            description: stamp.description.clone(),
            image: stamp.image.as_ref().to_owned(),
            approved: stamp.approved,
            request_id: origin.map(|o| *o.request_id.as_uuid()),
            prompt: origin.map(|o| o.prompt.clone()),
            submitted_by: origin.map(|o| *o.submitted_by.as_uuid()),
            created_at: stamp.created_at,
        }
    }
}

impl TryFrom<StampRow> for Stamp {
    type Error = String;

    fn try_from(row: StampRow) -> Result<Self, Self::Error> {
        let image = ImageRef::new(row.image)
            .map_err(|err| format!("invalid stamp image in database: {err}"))?;
        let origin = match (row.request_id, row.prompt, row.submitted_by) {
            (Some(request_id), Some(prompt), Some(submitted_by)) => Some(StampOrigin {
                request_id: StampRequestId::from_uuid(request_id),
                prompt,
                submitted_by: UserId::from_uuid(submitted_by),
            }),
            (None, None, None) => None,
            _ => return Err(String::from("partial stamp origin in database")),
        };
        Ok(Self {
            id: StampId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            image,
            approved: row.approved,
            origin,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Stamp requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stamp_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StampRequestRow {
    pub id: Uuid,
    pub prompt: String,
    pub submitted_by: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub stamp_id: Option<Uuid>,
}

impl TryFrom<StampRequestRow> for StampRequest {
    type Error = String;

    fn try_from(row: StampRequestRow) -> Result<Self, Self::Error> {
        let prompt = StampPrompt::new(row.prompt)
            .map_err(|err| format!("invalid stamp prompt in database: {err}"))?;
        let status = row
            .status
            .parse::<StampRequestStatus>()
            .map_err(|err| format!("invalid stamp request status in database: {err}"))?;
        Ok(Self {
            id: StampRequestId::from_uuid(row.id),
            prompt,
            submitted_by: UserId::from_uuid(row.submitted_by),
            status,
            created_at: row.created_at,
            stamp_id: row.stamp_id.map(StampId::from_uuid),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stamp_requests)]
pub(crate) struct NewStampRequestRow<'a> {
    pub id: Uuid,
    pub prompt: &'a str,
    pub submitted_by: Uuid,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub stamp_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stamp_collections)]
pub(crate) struct NewCollectionRow {
    pub user_id: Uuid,
    pub stamp_id: Uuid,
    pub collected_at: DateTime<Utc>,
}
