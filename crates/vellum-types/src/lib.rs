//! Foundation types for Vellum.
//!
//! Vellum resolves inline placeholders in a rich-text document into rendered
//! media whose bytes are encrypted at rest. This crate holds the data model
//! shared by every other Vellum crate.
//!
//! # Key Types
//!
//! - [`FileId`] -- Opaque identifier of an encrypted file
//! - [`PlaceholderRef`] -- A document marker awaiting resolution
//! - [`FileDescriptor`] -- Metadata driving download and decryption
//! - [`ResolvedFile`] -- Temporary handle plus media type, the cached end product
//! - [`MediaTypeMap`] -- Case-insensitive media type to [`MediaKind`] table
//! - [`StatusKey`] -- Key of a transient status element

pub mod descriptor;
pub mod error;
pub mod file;
pub mod media;
pub mod placeholder;
pub mod resolved;
pub mod status;

pub use descriptor::{DecryptedPayload, EncryptedItem, FileDescriptor};
pub use error::TypeError;
pub use file::FileId;
pub use media::{MediaKind, MediaTypeMap};
pub use placeholder::{display_name, NodeId, PlaceholderRef, RenderHints, DEFAULT_FALLBACK_NAME};
pub use resolved::{ResolvedFile, TempHandle};
pub use status::StatusKey;
