//! Message collection: matched sites become messages in a [`MessageStore`].
//!
//! ## Module Structure
//!
//! - `collector`: evaluates role arguments and upserts messages
//! - `comments`: extracted comments attached to a site
//! - `message`: `MessageKey`, `TranslatableMessage`, `SourceReference`, `MessageStore`

pub mod collector;
pub mod comments;
pub mod message;

pub use collector::{MessageCollector, Site, SiteCandidates};
pub use message::{MessageKey, MessageStore, SourceReference, TranslatableMessage};
