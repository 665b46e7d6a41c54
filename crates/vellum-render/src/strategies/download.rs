use vellum_document::{attrs, Element};
use vellum_types::MediaKind;

use super::mark_collapsible;
use crate::config::RenderConfig;
use crate::strategy::{RenderRequest, RenderStrategy};

/// Generic downloadable link, labeled with the display name.
pub struct DownloadStrategy;

impl RenderStrategy for DownloadStrategy {
    fn name(&self) -> &str {
        "download"
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Download
    }

    fn build(&self, request: &RenderRequest<'_>, _config: &RenderConfig) -> Element {
        mark_collapsible(Element::new("a"), request)
            .attr(attrs::GHOST, "true")
            .attr("href", request.url())
            .text(request.display_name())
    }
}
