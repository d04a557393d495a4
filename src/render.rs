use crate::backtracking_search::Assignment;
use crate::grid_config::GridConfig;

/// Character drawn for a blocked cell.
pub const BLOCK: char = '█';

/// Side length in pixels of one cell of an image rendering.
#[cfg(feature = "image")]
pub const CELL_SIZE: u32 = 100;

/// Width in pixels of the black border drawn inside each cell of an image rendering.
#[cfg(feature = "image")]
pub const CELL_BORDER: u32 = 2;

#[cfg(feature = "image")]
const FONT_SIZE: f32 = 80.0;

/// The letter in each cell of the grid, indexed as `[y][x]`. Blocked cells and open cells that no
/// assigned slot covers are `None`.
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut grid = vec![vec![None; config.width]; config.height];

    for (slot, word) in assignment.words(config) {
        for ((x, y), glyph) in slot.cell_coords().zip(word.chars()) {
            grid[y][x] = Some(glyph);
        }
    }

    grid
}

/// Render the grid as text, one line per row.
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    letter_grid(config, assignment)
        .iter()
        .enumerate()
        .map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(|(x, &glyph)| match glyph {
                    Some(glyph) => glyph,
                    None if config.is_open(x, y) => ' ',
                    None => BLOCK,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Draw the grid as an image: `CELL_SIZE` pixels per cell on a black canvas, open cells as white
/// squares inset by `CELL_BORDER`, and each letter centred in its cell. Letters are only drawn when
/// a font is given.
#[cfg(feature = "image")]
pub fn draw_grid_image(
    config: &GridConfig,
    assignment: &Assignment,
    font: Option<&ab_glyph::FontVec>,
) -> image::RgbaImage {
    use ab_glyph::PxScale;
    use image::{Rgba, RgbaImage};
    use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
    use imageproc::rect::Rect;

    let black = Rgba([0, 0, 0, 255]);
    let white = Rgba([255, 255, 255, 255]);
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;
    let scale = PxScale::from(FONT_SIZE);

    let mut canvas = RgbaImage::from_pixel(
        config.width as u32 * CELL_SIZE,
        config.height as u32 * CELL_SIZE,
        black,
    );

    for (y, row) in letter_grid(config, assignment).iter().enumerate() {
        for (x, &glyph) in row.iter().enumerate() {
            if !config.is_open(x, y) {
                continue;
            }

            let left = (x as u32 * CELL_SIZE + CELL_BORDER) as i32;
            let top = (y as u32 * CELL_SIZE + CELL_BORDER) as i32;
            draw_filled_rect_mut(
                &mut canvas,
                Rect::at(left, top).of_size(interior_size, interior_size),
                white,
            );

            if let (Some(glyph), Some(font)) = (glyph, font) {
                let text = glyph.to_string();
                let (text_width, text_height) = text_size(scale, font, &text);
                let text_x = left + (interior_size as i32 - text_width as i32) / 2;
                let text_y = top + (interior_size as i32 - text_height as i32) / 2;
                draw_text_mut(&mut canvas, black, text_x, text_y, scale, font, &text);
            }
        }
    }

    canvas
}
