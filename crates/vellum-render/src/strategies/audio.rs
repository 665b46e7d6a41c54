use vellum_document::Element;
use vellum_types::MediaKind;

use super::{mark_collapsible, wrap_block};
use crate::config::RenderConfig;
use crate::strategy::{RenderRequest, RenderStrategy};

/// Audio with playback controls, pre-wrapped in a block container.
pub struct AudioStrategy;

impl RenderStrategy for AudioStrategy {
    fn name(&self) -> &str {
        "audio"
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Audio
    }

    fn build(&self, request: &RenderRequest<'_>, config: &RenderConfig) -> Element {
        let audio = Element::new("audio")
            .attr("src", request.url())
            .attr("controls", "true");
        wrap_block(mark_collapsible(audio, request), &config.wrapper_tag, request)
    }
}
