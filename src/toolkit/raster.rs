//! Rasterization of paint commands into pixel buffers.

use image::{Rgba, RgbaImage};

use super::layout::{GLYPH_HEIGHT, GLYPH_WIDTH};

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Paint command set for the built-in widget surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintCommand {
    Fill {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: [u8; 4],
    },
    /// One line of text drawn as fixed-size pseudo-glyph cells. Each
    /// character's cell gets a deterministic shade derived from the character
    /// itself, so distinct text yields distinct pixels.
    Glyphs {
        x: u32,
        y: u32,
        text: String,
        scale: u32,
        rgba: [u8; 4],
    },
}

/// Paint `commands` in order onto a fresh background of the given size.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand]) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width.max(1), height.max(1), BACKGROUND);
    for command in commands {
        match command {
            PaintCommand::Fill {
                x,
                y,
                width,
                height,
                rgba,
            } => fill_rect(&mut image, *x, *y, *width, *height, *rgba),
            PaintCommand::Glyphs {
                x,
                y,
                text,
                scale,
                rgba,
            } => draw_glyphs(&mut image, *x, *y, text, *scale, *rgba),
        }
    }
    image
}

fn fill_rect(image: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
    let x_end = (x + width).min(image.width());
    let y_end = (y + height).min(image.height());
    for py in y.min(image.height())..y_end {
        for px in x.min(image.width())..x_end {
            image.put_pixel(px, py, Rgba(rgba));
        }
    }
}

fn draw_glyphs(image: &mut RgbaImage, x: u32, y: u32, text: &str, scale: u32, rgba: [u8; 4]) {
    let scale = scale.max(1);
    for (i, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let cell_x = x + i as u32 * GLYPH_WIDTH * scale;
        // ink rect inset one unit on each side of the cell
        let inset = scale;
        let ink = shade_for(ch, rgba);
        fill_rect(
            image,
            cell_x + inset,
            y + inset,
            GLYPH_WIDTH * scale - 2 * inset,
            GLYPH_HEIGHT * scale - 2 * inset,
            ink,
        );
    }
}

// deterministic per-character tint so "ab" and "ba" rasterize differently
fn shade_for(ch: char, rgba: [u8; 4]) -> [u8; 4] {
    let bits = (ch as u32).wrapping_mul(37) as u8 % 96;
    [
        rgba[0].saturating_add(bits),
        rgba[1].saturating_add(bits),
        rgba[2].saturating_add(bits),
        rgba[3],
    ]
}
