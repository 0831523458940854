//! SOICO CTA Records - affiliate records, settings and admin operations.
//!
//! Each record family (securities brokers, card-loan lenders) keeps its
//! records as one document in the option store. This crate sanitizes admin
//! input, serves sorted and filtered reads with resolved affiliate URLs, and
//! keeps the transient cache consistent with every write.
//!
//! # Architecture
//!
//! - **Families** ([`family`]): per-family keys, colours and defaults
//! - **Records** ([`record`]): the stored model and input sanitization
//! - **Store** ([`store`]): CRUD, ordering and cached reads
//! - **Settings** ([`settings`]): design and tracking documents
//! - **Admin** ([`admin`]): success/failure envelope for the admin screens
//! - **Defaults** ([`defaults`]): first-run seed data
//!
//! # Example
//!
//! ```ignore
//! use soico_records::{RecordFamily, RecordStore};
//!
//! let store = RecordStore::new(RecordFamily::Securities, db, transients, links);
//! for record in store.list_enabled(3).await? {
//!     println!("{} -> {:?}", record.record.name, record.affiliate_url);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod admin;
pub mod defaults;
pub mod error;
pub mod family;
mod input;
pub mod record;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use admin::{AdminResponse, AdminService};
pub use defaults::{default_records, seed_defaults};
pub use error::{RecordError, Result};
pub use family::RecordFamily;
pub use record::{BrokerRecord, LoanTerms, NewRecord, ResolvedRecord, DEFAULT_PRIORITY};
pub use settings::{DesignSettings, SettingsStore, TrackingSettings};
pub use store::RecordStore;
