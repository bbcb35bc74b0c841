//! Rolodex core library: canonical contacts, adapters, reconciliation.
//!
//! Public API surface:
//! - [`contact`]: [`CanonicalContact`] and the destination write values
//! - [`source`] / [`destination`]: raw record shapes and their adapters
//! - [`reconcile()`]: classify source contacts into [`ChangeRequest`]s
//! - [`request`]: [`ChangeRequest`] and its write payload
//! - [`error`]: [`ContactError`]
//!
//! Everything here is pure and synchronous; fetching and applying writes
//! belongs to `rolodex-sync`.

pub mod contact;
pub mod destination;
pub mod error;
pub mod reconcile;
pub mod request;
pub mod source;

pub use contact::{CanonicalContact, Origin, PropertyValue, RawRecord};
pub use destination::DatabasePage;
pub use error::ContactError;
pub use reconcile::{reconcile, ReconcileSummary};
pub use request::{ChangeKind, ChangeRequest, PageParent, PageWrite};
pub use source::{is_eligible, PersonConnection};
