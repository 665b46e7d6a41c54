use vellum_document::Element;
use vellum_types::MediaKind;

use super::{mark_collapsible, with_dimensions};
use crate::config::RenderConfig;
use crate::strategy::{RenderRequest, RenderStrategy};

/// Inline image.
pub struct ImageStrategy;

impl RenderStrategy for ImageStrategy {
    fn name(&self) -> &str {
        "image"
    }

    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn build(&self, request: &RenderRequest<'_>, config: &RenderConfig) -> Element {
        let mut img = Element::new("img").attr("src", request.url());
        if config.image_srcset {
            img = img.attr("srcset", format!("{} 2x", request.url()));
        }
        with_dimensions(mark_collapsible(img, request), request)
    }
}
