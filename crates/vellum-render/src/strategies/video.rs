use vellum_document::Element;
use vellum_types::MediaKind;

use super::{mark_collapsible, with_dimensions, wrap_block};
use crate::config::RenderConfig;
use crate::strategy::{RenderRequest, RenderStrategy};

/// Video with playback controls, pre-wrapped in a block container.
pub struct VideoStrategy;

impl RenderStrategy for VideoStrategy {
    fn name(&self) -> &str {
        "video"
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn build(&self, request: &RenderRequest<'_>, config: &RenderConfig) -> Element {
        let source = Element::new("source")
            .attr("src", request.url())
            .attr("type", request.file.media_type.as_str());
        let video = Element::new("video").attr("controls", "true");
        let video = with_dimensions(mark_collapsible(video, request), request).child(source);
        wrap_block(video, &config.wrapper_tag, request)
    }
}
