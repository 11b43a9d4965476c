//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed entities for accounts, postcards, contacts
//! and stamps, plus the services that enforce their invariants behind the
//! ports in [`ports`]. Types validate on construction so adapters never hold
//! an invalid value.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Identity and AdminCapability: authenticated caller and admin proof.
//! - Postcard, Contact, Stamp, StampRequest: the exchange aggregates.
//! - next_delivery_instant: the daily 18:30 UTC delivery slot.

pub mod account_service;
pub mod auth;
pub mod contact;
pub mod delivery_schedule;
pub mod error;
pub mod ports;
pub mod postcard;
pub mod postcard_service;
pub mod stamp;
pub mod stamp_request;
pub mod stamp_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    AdminCapability, CredentialsValidationError, Identity, LoginCredentials, NewAccount,
    PASSWORD_MIN, PasswordHash, Role,
};
pub use self::contact::{Contact, ContactEdge};
pub use self::delivery_schedule::{DELIVERY_HOUR_UTC, DELIVERY_MINUTE_UTC, next_delivery_instant};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::postcard::{
    MESSAGE_MAX, MessageText, Postcard, PostcardDraft, PostcardId, PostcardValidationError,
    STAMPS_MAX,
};
pub use self::postcard_service::{DeliverySweepService, PostcardService};
pub use self::stamp::{
    CollectedStamp, CollectionEntry, ImageRef, STAMP_DESCRIPTION_MAX, STAMP_NAME_MAX, Stamp,
    StampDraft, StampId, StampOrigin, StampValidationError,
};
pub use self::stamp_request::{
    PROMPT_MAX, StampPrompt, StampRequest, StampRequestId, StampRequestStatus,
    StampRequestValidationError,
};
pub use self::stamp_service::{StampCatalogueService, StampCollectionService, StampRequestService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EmailAddress, USERNAME_MAX, USERNAME_MIN, User, UserId, UserSummary, Username,
    UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use postcards::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
