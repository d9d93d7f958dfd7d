//! The built-in markup widget toolkit.
//!
//! A deterministic, dependency-light stand-in for a real GUI toolkit: it
//! parses the document, packs a block layout, and rasterizes pseudo-glyph
//! cells. It exists so the render pipeline has a default backend and so the
//! golden tests have stable pixels; it is not a layout engine.

use image::RgbaImage;
use scraper::Html;

use super::layout::{self, BlockKind, GLYPH_HEIGHT};
use super::raster::{self, PaintCommand};
use super::{Toolkit, Widget};

const TITLE_INK: [u8; 4] = [16, 16, 48, 255];
const PARAGRAPH_INK: [u8; 4] = [48, 48, 48, 255];

/// Default widget backend rendering markup into blocky text surfaces.
#[derive(Debug, Default)]
pub struct MarkupToolkit;

impl MarkupToolkit {
    pub fn new() -> Self {
        MarkupToolkit
    }
}

struct MarkupWidget {
    width: u32,
    height: u32,
    commands: Vec<PaintCommand>,
}

impl Toolkit for MarkupToolkit {
    fn build(&self, document: &str) -> anyhow::Result<Box<dyn Widget>> {
        let parsed = Html::parse_document(document);
        let packed = layout::layout_document(&parsed);

        let mut commands = Vec::new();
        for block in &packed.blocks {
            let ink = match block.kind {
                BlockKind::Title => TITLE_INK,
                BlockKind::Paragraph => PARAGRAPH_INK,
            };
            for (row, line) in block.lines.iter().enumerate() {
                commands.push(PaintCommand::Glyphs {
                    x: block.rect.x,
                    y: block.rect.y + row as u32 * GLYPH_HEIGHT * block.scale,
                    text: line.clone(),
                    scale: block.scale,
                    rgba: ink,
                });
            }
        }

        Ok(Box::new(MarkupWidget {
            width: packed.width,
            height: packed.height,
            commands,
        }))
    }
}

impl Widget for MarkupWidget {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn paint(&self) -> anyhow::Result<RgbaImage> {
        Ok(raster::rasterize(self.width, self.height, &self.commands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::layout::GLYPH_WIDTH;

    #[test]
    fn widget_packs_to_content_and_paints_its_size() {
        let toolkit = MarkupToolkit::new();
        let widget = toolkit.build("<p>Hello</p>").expect("build widget");
        let (w, h) = widget.size();
        assert_eq!(w, 5 * GLYPH_WIDTH + 2 * layout::PAGE_PADDING);
        let image = widget.paint().expect("paint widget");
        assert_eq!(image.dimensions(), (w, h));
    }

    #[test]
    fn distinct_documents_paint_distinct_surfaces() {
        let toolkit = MarkupToolkit::new();
        let a = toolkit.build("<p>aa</p>").expect("build").paint().expect("paint");
        let b = toolkit.build("<p>bb</p>").expect("build").paint().expect("paint");
        assert_eq!(a.dimensions(), b.dimensions());
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn empty_document_still_builds_a_surface() {
        let toolkit = MarkupToolkit::new();
        let widget = toolkit.build("").expect("build widget");
        let (w, h) = widget.size();
        assert!(w > 0 && h > 0);
        assert!(widget
            .paint()
            .expect("paint widget")
            .pixels()
            .all(|p| *p == raster::BACKGROUND));
    }
}
