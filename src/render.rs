//! Turning an assignment into something a person can look at: a text grid for the terminal, or a
//! PNG with one square per cell.

use std::path::Path;

use image::{Rgba, RgbaImage};
use log::{info, trace};

use crate::backtracking_search::Assignment;
use crate::error::RenderError;
use crate::puzzle::{Direction, Puzzle};

/// Size of each cell in the rendered image, in pixels.
pub const CELL_SIZE: u32 = 100;

/// Width of the black border around each cell, in pixels.
pub const CELL_BORDER: u32 = 2;

/// Size of one pixel of the bitmap font, in image pixels.
const FONT_SCALE: u32 = 10;
const FONT_WIDTH: u32 = 5;
const FONT_HEIGHT: u32 = 7;

/// A 5x7 bitmap font for A-Z. Each row is five bits wide, most significant bit on the left.
const FONT: [[u8; FONT_HEIGHT as usize]; 26] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Lay the assigned words out on the grid. Cells that no assigned word covers are `None`.
pub fn letter_grid(puzzle: &Puzzle, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; puzzle.width()]; puzzle.height()];

    for (slot_id, word_id) in assignment.iter() {
        let variable = puzzle.slot(slot_id);

        for (cell_idx, &glyph) in puzzle.word(word_id).glyphs.iter().enumerate() {
            let (row, col) = match variable.direction {
                Direction::Across => (variable.row, variable.col + cell_idx),
                Direction::Down => (variable.row + cell_idx, variable.col),
            };

            if let Some(cell) = letters.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *cell = Some(glyph);
            }
        }
    }

    letters
}

/// Render the grid as text, one line per row: blocks as `█`, letters as themselves, and fillable
/// cells without a letter as spaces.
pub fn render_text(puzzle: &Puzzle, assignment: &Assignment) -> String {
    let letters = letter_grid(puzzle, assignment);

    letters.iter().enumerate().map(|(row, cells)| {
        cells.iter().enumerate().map(|(col, &letter)| {
            if puzzle.is_fillable(row, col) {
                letter.unwrap_or(' ')
            } else {
                '█'
            }
        }).collect::<String>()
    }).collect::<Vec<_>>().join("\n")
}

/// Draw the grid into an image: white squares for fillable cells on a black background, with each
/// assigned letter drawn in black.
pub fn render_image(puzzle: &Puzzle, assignment: &Assignment) -> RgbaImage {
    let letters = letter_grid(puzzle, assignment);
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;

    let mut img = RgbaImage::from_pixel(
        puzzle.width() as u32 * CELL_SIZE,
        puzzle.height() as u32 * CELL_SIZE,
        BLACK,
    );

    for (row, cells) in letters.iter().enumerate() {
        for (col, &letter) in cells.iter().enumerate() {
            if !puzzle.is_fillable(row, col) {
                continue;
            }

            let left = col as u32 * CELL_SIZE + CELL_BORDER;
            let top = row as u32 * CELL_SIZE + CELL_BORDER;

            for y in top..top + interior_size {
                for x in left..left + interior_size {
                    img.put_pixel(x, y, WHITE);
                }
            }

            if let Some(letter) = letter {
                draw_glyph(&mut img, letter, left, top, interior_size);
            }
        }
    }

    img
}

/// Render the grid and write it to `path`, in whatever format the extension names.
pub fn save_image<P: AsRef<Path>>(
    puzzle: &Puzzle,
    assignment: &Assignment,
    path: P,
) -> Result<(), RenderError> {
    let img = render_image(puzzle, assignment);
    img.save(path.as_ref())?;

    info!("Saved {}x{} image to {}", img.width(), img.height(), path.as_ref().display());

    Ok(())
}

/// Draw a letter centered in the square whose top-left interior pixel is at (`left`, `top`).
fn draw_glyph(img: &mut RgbaImage, letter: char, left: u32, top: u32, interior_size: u32) {
    let bitmap = match letter.to_ascii_uppercase() {
        c @ 'A'..='Z' => &FONT[(c as u8 - b'A') as usize],
        other => {
            trace!(target: "render", "No bitmap for {:?}; leaving cell blank", other);
            return;
        }
    };

    let glyph_left = left + (interior_size - FONT_WIDTH * FONT_SCALE) / 2;
    let glyph_top = top + (interior_size - FONT_HEIGHT * FONT_SCALE) / 2;

    for (font_row, &bits) in bitmap.iter().enumerate() {
        for font_col in 0..FONT_WIDTH {
            if bits & (1 << (FONT_WIDTH - 1 - font_col)) == 0 {
                continue;
            }

            let x0 = glyph_left + font_col * FONT_SCALE;
            let y0 = glyph_top + font_row as u32 * FONT_SCALE;
            for y in y0..y0 + FONT_SCALE {
                for x in x0..x0 + FONT_SCALE {
                    img.put_pixel(x, y, BLACK);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backtracking_search::Assignment;
    use crate::puzzle::Puzzle;
    use crate::render::{letter_grid, render_image, render_text, save_image, CELL_SIZE};

    /// #_#
    /// ___
    /// #_#
    fn filled() -> (Puzzle, Assignment) {
        let puzzle = Puzzle::new("#_#\n___\n#_#", "cat\ncar").unwrap();
        let mut assignment = Assignment::new();
        assignment.insert(0, puzzle.find_word("car").unwrap());
        assignment.insert(1, puzzle.find_word("cat").unwrap());
        (puzzle, assignment)
    }

    #[test]
    fn test_letter_grid_places_words() {
        let (puzzle, assignment) = filled();

        let letters = letter_grid(&puzzle, &assignment);

        assert_eq!(letters[1], vec![Some('C'), Some('A'), Some('R')]);
        assert_eq!(letters[0], vec![None, Some('C'), None]);
        assert_eq!(letters[2], vec![None, Some('T'), None]);
    }

    #[test]
    fn test_render_text() {
        let (puzzle, assignment) = filled();

        assert_eq!(render_text(&puzzle, &assignment), "█C█\nCAR\n█T█");
    }

    #[test]
    fn test_render_text_with_partial_assignment() {
        let (puzzle, mut assignment) = filled();
        assignment.remove(1);

        assert_eq!(render_text(&puzzle, &assignment), "█ █\nCAR\n█ █");
    }

    #[test]
    fn test_render_image_colors_cells() {
        let (puzzle, assignment) = filled();

        let img = render_image(&puzzle, &assignment);

        assert_eq!(img.dimensions(), (3 * CELL_SIZE, 3 * CELL_SIZE));
        // Blocked corner cell stays black, fillable cell interiors are white near their edges.
        assert_eq!(img.get_pixel(50, 50).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(105, 105).0, [255, 255, 255, 255]);
        // Cell borders are black.
        assert_eq!(img.get_pixel(100, 150).0, [0, 0, 0, 255]);
        // The middle cell holds an A, whose crossbar runs through the center of the glyph.
        assert_eq!(img.get_pixel(150, 148).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_save_image_writes_png() {
        let (puzzle, assignment) = filled();
        let path = std::env::temp_dir().join(format!("crossfill-render-{}.png", std::process::id()));

        save_image(&puzzle, &assignment, &path).unwrap();

        let written = image::open(&path).unwrap();
        assert_eq!(written.width(), 3 * CELL_SIZE);
        std::fs::remove_file(&path).unwrap();
    }
}
