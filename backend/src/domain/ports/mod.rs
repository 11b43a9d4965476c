//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`]) are implemented by
//! outbound adapters. Driving ports (`*Command`, `*Query`, [`DeliverySweep`])
//! are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod contact_repository;
mod delivery_sweep;
mod password_hasher;
mod postcard_command;
mod postcard_query;
mod postcard_repository;
mod stamp_catalogue_command;
mod stamp_catalogue_query;
mod stamp_collection_command;
mod stamp_collection_query;
mod stamp_collection_repository;
mod stamp_repository;
mod stamp_request_command;
mod stamp_request_query;
mod stamp_request_repository;
mod user_repository;

pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_command::MockAccountCommand;
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::{AccountQuery, USER_SEARCH_LIMIT};
#[cfg(test)]
pub use contact_repository::MockContactRepository;
pub use contact_repository::{ContactRepository, ContactRepositoryError};
#[cfg(test)]
pub use delivery_sweep::MockDeliverySweep;
pub use delivery_sweep::{DeliverySweep, DeliverySweepReport};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use postcard_command::MockPostcardCommand;
pub use postcard_command::{PostcardCommand, SendPostcardRequest};
#[cfg(test)]
pub use postcard_query::MockPostcardQuery;
pub use postcard_query::PostcardQuery;
#[cfg(test)]
pub use postcard_repository::MockPostcardRepository;
pub use postcard_repository::{PostcardRepository, PostcardRepositoryError};
#[cfg(test)]
pub use stamp_catalogue_command::MockStampCatalogueCommand;
pub use stamp_catalogue_command::{StampCatalogueCommand, StampPromotion};
#[cfg(test)]
pub use stamp_catalogue_query::MockStampCatalogueQuery;
pub use stamp_catalogue_query::StampCatalogueQuery;
#[cfg(test)]
pub use stamp_collection_command::MockStampCollectionCommand;
pub use stamp_collection_command::StampCollectionCommand;
#[cfg(test)]
pub use stamp_collection_query::MockStampCollectionQuery;
pub use stamp_collection_query::StampCollectionQuery;
#[cfg(test)]
pub use stamp_collection_repository::MockStampCollectionRepository;
pub use stamp_collection_repository::{
    CollectOutcome, StampCollectionRepository, StampCollectionRepositoryError,
};
#[cfg(test)]
pub use stamp_repository::MockStampRepository;
pub use stamp_repository::{StampRepository, StampRepositoryError};
#[cfg(test)]
pub use stamp_request_command::MockStampRequestCommand;
pub use stamp_request_command::StampRequestCommand;
#[cfg(test)]
pub use stamp_request_query::MockStampRequestQuery;
pub use stamp_request_query::StampRequestQuery;
#[cfg(test)]
pub use stamp_request_repository::MockStampRequestRepository;
pub use stamp_request_repository::{StampRequestRepository, StampRequestRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserAccount, UserRepository, UserRepositoryError};
