//! Session bookkeeping — transcript reconstruction and the session directory.
//!
//! - [`history::reconstruct`] turns a session's stored history into a transcript.
//! - [`directory::SessionDirectory`] is the ordered list of known sessions,
//!   loaded from the store and updated optimistically on local activity.

pub mod directory;
pub mod history;

pub use directory::{derive_name, SessionDirectory};
pub use history::reconstruct;
