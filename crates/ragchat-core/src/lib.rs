//! ragchat core — types, configuration, locale tables, the store contract,
//! and session bookkeeping shared by every other crate.

pub mod config;
pub mod locale;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;

pub use locale::{Locale, LocaleText};
pub use session::{derive_name, reconstruct, SessionDirectory};
pub use store::{ErrorKind, SessionStore, StoreError, StoreResult};
pub use types::{HistoryEntry, Message, Sender, SessionEntry, SessionName};
