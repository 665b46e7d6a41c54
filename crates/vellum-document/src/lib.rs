//! Document host interface for Vellum.
//!
//! The loader never touches a concrete editor. It talks to a
//! [`DocumentHost`], places elements through a [`PlacementPolicy`], and
//! reports progress through a [`StatusReporter`].
//!
//! [`InMemoryDocument`] is an arena-backed host for tests and headless use.

pub mod attrs;
pub mod element;
pub mod error;
pub mod host;
pub mod memory;
pub mod placement;
pub mod status;

pub use element::Element;
pub use error::{DocumentError, DocumentResult};
pub use host::{Anchor, DocumentHost, InsertMode};
pub use memory::InMemoryDocument;
pub use placement::{NestingRule, PlacementPolicy};
pub use status::StatusReporter;
