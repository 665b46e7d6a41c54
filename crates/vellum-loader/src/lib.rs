//! The Vellum load pipeline.
//!
//! [`LoadPipeline::resolve`] turns one [`vellum_types::PlaceholderRef`] into
//! rendered media: cache check, in-flight check, descriptor lookup, collision
//! check, admission, download, decrypt, materialize, render. External
//! systems are reached only through the collaborator traits in [`collab`].
//!
//! # Key Types
//!
//! - [`LoadPipeline`] -- the state machine
//! - [`Collaborators`] -- lookup, download, decrypt, and materialize seams
//! - [`LoaderConfig`] -- serde/TOML configuration
//! - [`LoadReport`] / [`LoadOutcome`] -- result of one resolve call
//! - [`EventBus`] / [`LoadEvent`] -- broadcast progress notifications
//! - [`InMemoryDescriptorIndex`], [`BlobUrlMaterializer`] -- in-process
//!   collaborator implementations

pub mod blob;
pub mod collab;
pub mod config;
pub mod error;
pub mod event;
pub mod index;
pub mod outcome;
pub mod pipeline;

pub use blob::{Blob, BlobUrlMaterializer};
pub use collab::{Collaborators, Decryptor, DescriptorLookup, Downloader, Materializer};
pub use config::LoaderConfig;
pub use error::{LoaderError, LoaderResult};
pub use event::{EventBus, EventStream, LoadEvent, LoadEventKind};
pub use index::InMemoryDescriptorIndex;
pub use outcome::{
    FailureKind, LoadFailure, LoadOutcome, LoadPhase, LoadReport, PhaseRecord, RenderSource,
    SkipReason,
};
pub use pipeline::LoadPipeline;
