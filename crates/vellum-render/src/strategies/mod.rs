//! Built-in render strategies.

pub mod audio;
pub mod download;
pub mod image;
pub mod video;

pub use audio::AudioStrategy;
pub use download::DownloadStrategy;
pub use image::ImageStrategy;
pub use video::VideoStrategy;

use vellum_document::{attrs, Element};

use crate::strategy::RenderRequest;

/// Tag an element with the file identity and mark it collapsible. The
/// placeholder's raw name is carried over as-is; it is omitted when the
/// placeholder had none.
pub(crate) fn mark_collapsible(element: Element, request: &RenderRequest<'_>) -> Element {
    element
        .attr(attrs::FILE_ID, request.file_id().as_str())
        .attr_opt(attrs::FILE_NAME, request.placeholder.name.clone())
        .attr(attrs::COLLAPSIBLE, "true")
}

/// Copy explicit dimensions from the placeholder. Only applied when the
/// placeholder declares a width.
pub(crate) fn with_dimensions(element: Element, request: &RenderRequest<'_>) -> Element {
    let hints = &request.placeholder.hints;
    if !hints.has_dimensions() {
        return element;
    }
    element
        .attr_opt(attrs::WIDTH, hints.width.clone())
        .attr_opt(attrs::HEIGHT, hints.height.clone())
}

/// Wrap playable media in an editable, collapsible block container.
pub(crate) fn wrap_block(element: Element, tag: &str, request: &RenderRequest<'_>) -> Element {
    let container = mark_collapsible(Element::new(tag), request).attr(attrs::CONTENT_EDITABLE, "true");
    element.wrap(container)
}
