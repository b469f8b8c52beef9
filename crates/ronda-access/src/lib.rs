//! Persisted access list and access-code lifecycle.
//!
//! The access list is a capacity-bounded, ordered set of phone numbers
//! kept in memory and mirrored to a JSON file on every mutation. Users
//! earn a slot by requesting an `ACCESS-XXXXXX` code and activating it;
//! super-admins bypass the list entirely.
//!
//! # Architecture
//!
//! - [`store`]: the [`AccessStore`] backing-store trait with JSON-file and
//!   in-memory implementations
//! - [`manager`]: the [`AccessManager`] implementing the request/activate/
//!   revoke/list operations and the access predicate

pub mod manager;
pub mod store;

pub use manager::{AccessError, AccessManager, IssuedCode, ACCESS_CODE_PREFIX};
pub use store::{AccessStore, JsonAccessStore, MemoryAccessStore, StoreError};
