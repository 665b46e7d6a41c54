//! Render dispatch for Vellum.
//!
//! A resolved file is turned into a document element by the
//! [`RenderStrategy`] registered for its [`vellum_types::MediaKind`], placed
//! next to the originating placeholder under the active
//! [`vellum_document::PlacementPolicy`], and the placeholder is removed.
//!
//! # Quick Start
//!
//! ```rust
//! use vellum_document::{attrs, DocumentHost, Element, InMemoryDocument, PlacementPolicy};
//! use vellum_render::{RenderConfig, RenderDispatcher};
//! use vellum_types::{ResolvedFile, TempHandle};
//!
//! let doc = InMemoryDocument::new();
//! doc.append(doc.root(), Element::new("span").attr(attrs::PLACEHOLDER, "true").attr(attrs::FILE_ID, "abc"))
//!     .unwrap();
//! let placeholder = doc.scan_placeholders().unwrap().remove(0);
//!
//! let dispatcher = RenderDispatcher::with_default_strategies(RenderConfig::default(), PlacementPolicy::default());
//! let file = ResolvedFile::new(TempHandle::new("blob:1"), "image/png", "cat.png");
//! let report = dispatcher.render(&doc, &file, &placeholder).unwrap();
//! assert!(doc.element(report.node).unwrap().is("img"));
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod strategies;
pub mod strategy;

pub use config::RenderConfig;
pub use dispatcher::{RenderDispatcher, RenderReport};
pub use error::{RenderError, RenderResult};
pub use strategies::{AudioStrategy, DownloadStrategy, ImageStrategy, VideoStrategy};
pub use strategy::{RenderRequest, RenderStrategy};
