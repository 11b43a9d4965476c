//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    ///
    /// Usernames are unique case-insensitively via the
    /// `users_username_lower_key` expression index; emails are stored
    /// lower-cased and unique via `users_email_key`.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        is_admin -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Postcards in flight and delivered.
    postcards (id) {
        id -> Uuid,
        sender_id -> Uuid,
        recipient_id -> Uuid,
        message -> Text,
        stamp_ids -> Array<Uuid>,
        created_at -> Timestamptz,
        /// First 18:30 UTC slot strictly after `created_at`.
        delivery_date -> Timestamptz,
        delivered -> Bool,
        delivered_at -> Nullable<Timestamptz>,
        opened -> Bool,
    }
}

diesel::table! {
    /// Directed contact edges; two rows per pair that has exchanged a postcard.
    contacts (owner_id, counterpart_id) {
        owner_id -> Uuid,
        counterpart_id -> Uuid,
        last_postcard_at -> Timestamptz,
        postcard_ids -> Array<Uuid>,
    }
}

diesel::table! {
    /// Stamp idea queue.
    stamp_requests (id) {
        id -> Uuid,
        prompt -> Text,
        submitted_by -> Uuid,
        /// One of `pending`, `approved`, `rejected`.
        status -> Varchar,
        created_at -> Timestamptz,
        stamp_id -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Stamp catalogue. Origin columns are set together or not at all.
    stamps (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        image -> Text,
        approved -> Bool,
        request_id -> Nullable<Uuid>,
        prompt -> Nullable<Text>,
        submitted_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Collection ledger keyed by `(user_id, stamp_id)`.
    stamp_collections (user_id, stamp_id) {
        user_id -> Uuid,
        stamp_id -> Uuid,
        collected_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(stamp_collections, stamps);
