//! Packed block layout for the built-in markup widget.
//!
//! A deliberately small model: the document becomes a vertical stack of text
//! blocks (one title, then paragraphs), and the widget packs to the stack's
//! natural size instead of filling a viewport. Glyphs are fixed-size cells,
//! which keeps every measurement exact and reproducible.

use scraper::{Html, Selector};

/// Glyph cell width in pixels at scale 1.
pub const GLYPH_WIDTH: u32 = 8;
/// Glyph cell height in pixels at scale 1.
pub const GLYPH_HEIGHT: u32 = 12;

/// Padding around the whole page.
pub const PAGE_PADDING: u32 = 8;

/// Vertical gap between blocks.
const BLOCK_GAP: u32 = 6;

/// Paragraphs wrap at this many columns; shorter text packs tighter.
const MAX_COLUMNS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Title,
    Paragraph,
}

/// One laid-out text block: wrapped lines plus the cell rect they occupy.
#[derive(Debug, Clone)]
pub struct Block {
    pub rect: Rect,
    pub lines: Vec<String>,
    pub kind: BlockKind,
    pub scale: u32,
}

/// The packed result: final widget size and the blocks inside it.
#[derive(Debug, Clone)]
pub struct PackedLayout {
    pub width: u32,
    pub height: u32,
    pub blocks: Vec<Block>,
}

/// Compute the packed layout for a parsed document.
///
/// The title (first `<h1>`, else `<title>`) renders at scale 2, paragraphs at
/// scale 1. The widget width is the widest block plus page padding; an empty
/// document packs to bare padding.
pub fn layout_document(document: &Html) -> PackedLayout {
    let mut blocks = Vec::new();

    let h1_sel = Selector::parse("h1").unwrap();
    let title_text = if let Some(h1) = document.select(&h1_sel).next() {
        h1.text().collect::<String>()
    } else {
        let title_sel = Selector::parse("title").unwrap();
        document
            .select(&title_sel)
            .next()
            .map(|n| n.text().collect::<String>())
            .unwrap_or_default()
    };
    if !title_text.trim().is_empty() {
        blocks.push((BlockKind::Title, 2u32, wrap(title_text.trim(), MAX_COLUMNS)));
    }

    let p_sel = Selector::parse("p").unwrap();
    for p in document.select(&p_sel) {
        let text = p.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        blocks.push((BlockKind::Paragraph, 1, wrap(text, MAX_COLUMNS)));
    }

    // widest block decides the packed content width
    let content_width = blocks
        .iter()
        .map(|(_, scale, lines)| {
            let columns = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            columns as u32 * GLYPH_WIDTH * scale
        })
        .max()
        .unwrap_or(0);

    let mut y = PAGE_PADDING;
    let mut placed = Vec::with_capacity(blocks.len());
    for (kind, scale, lines) in blocks {
        let height = lines.len() as u32 * GLYPH_HEIGHT * scale;
        let width = lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u32
            * GLYPH_WIDTH
            * scale;
        placed.push(Block {
            rect: Rect {
                x: PAGE_PADDING,
                y,
                width,
                height,
            },
            lines,
            kind,
            scale,
        });
        y += height + BLOCK_GAP;
    }
    if !placed.is_empty() {
        y -= BLOCK_GAP;
    }

    PackedLayout {
        width: content_width + PAGE_PADDING * 2,
        height: y + PAGE_PADDING,
        blocks: placed,
    }
}

/// Greedy word wrap at `columns`; words longer than a line get a line of
/// their own.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_paragraph_packs_to_its_text() {
        let doc = Html::parse_document("<p>Hello</p>");
        let layout = layout_document(&doc);
        assert_eq!(layout.blocks.len(), 1);
        let block = &layout.blocks[0];
        assert_eq!(block.kind, BlockKind::Paragraph);
        assert_eq!(block.lines, vec!["Hello".to_string()]);
        assert_eq!(layout.width, 5 * GLYPH_WIDTH + 2 * PAGE_PADDING);
        assert_eq!(layout.height, GLYPH_HEIGHT + 2 * PAGE_PADDING);
    }

    #[test]
    fn title_is_scaled_and_placed_first() {
        let doc = Html::parse_document("<html><body><h1>Head</h1><p>Body</p></body></html>");
        let layout = layout_document(&doc);
        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.blocks[0].kind, BlockKind::Title);
        assert_eq!(layout.blocks[0].scale, 2);
        assert!(layout.blocks[1].rect.y > layout.blocks[0].rect.y);
        // the scaled title is the widest block here
        assert_eq!(layout.width, 4 * GLYPH_WIDTH * 2 + 2 * PAGE_PADDING);
    }

    #[test]
    fn title_falls_back_to_title_element() {
        let doc = Html::parse_document(
            "<html><head><title>Doc Title</title></head><body><p>x</p></body></html>",
        );
        let layout = layout_document(&doc);
        assert_eq!(layout.blocks[0].kind, BlockKind::Title);
        assert_eq!(layout.blocks[0].lines, vec!["Doc Title".to_string()]);
    }

    #[test]
    fn empty_document_packs_to_padding() {
        let doc = Html::parse_document("");
        let layout = layout_document(&doc);
        assert!(layout.blocks.is_empty());
        assert_eq!(layout.width, 2 * PAGE_PADDING);
        assert_eq!(layout.height, 2 * PAGE_PADDING);
    }

    #[test]
    fn long_paragraphs_wrap() {
        let text = "word ".repeat(40);
        let doc = Html::parse_document(&format!("<p>{text}</p>"));
        let layout = layout_document(&doc);
        let block = &layout.blocks[0];
        assert!(block.lines.len() > 1);
        assert!(block.lines.iter().all(|l| l.chars().count() <= MAX_COLUMNS));
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = wrap("tiny reallyquitelongword tiny", 8);
        assert_eq!(
            lines,
            vec!["tiny", "reallyquitelongword", "tiny"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }
}
