//! 5×7 bitmap font for axis labels.
//!
//! Each glyph is seven rows; in every row byte, bit 7 is the leftmost of the
//! five columns and bits 2..0 are unused. Only the characters the graph
//! needs are present: digits, the `K` unit suffix and the letters of the
//! captions (`TIME`, `PRESSURE`). Lookup is case-insensitive.

/// Glyph width in pixels
pub const GLYPH_WIDTH: usize = 5;

/// Glyph height in pixels
pub const GLYPH_HEIGHT: usize = 7;

/// One glyph: seven rows, MSB-first
pub type Glyph = [u8; GLYPH_HEIGHT];

const DIGITS: [Glyph; 10] = [
    // 0
    [0x70, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70],
    // 1
    [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70],
    // 2
    [0x70, 0x88, 0x08, 0x10, 0x20, 0x40, 0xF8],
    // 3
    [0x70, 0x88, 0x08, 0x30, 0x08, 0x88, 0x70],
    // 4
    [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10],
    // 5
    [0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70],
    // 6
    [0x70, 0x80, 0x80, 0xF0, 0x88, 0x88, 0x70],
    // 7
    [0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40],
    // 8
    [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70],
    // 9
    [0x70, 0x88, 0x88, 0x78, 0x08, 0x08, 0x70],
];

const LETTER_E: Glyph = [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0xF8];
const LETTER_I: Glyph = [0x70, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70];
const LETTER_K: Glyph = [0x88, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x88];
const LETTER_M: Glyph = [0x88, 0xD8, 0xA8, 0xA8, 0x88, 0x88, 0x88];
const LETTER_P: Glyph = [0xF0, 0x88, 0x88, 0xF0, 0x80, 0x80, 0x80];
const LETTER_R: Glyph = [0xF0, 0x88, 0x88, 0xF0, 0xA0, 0x90, 0x88];
const LETTER_S: Glyph = [0x78, 0x80, 0x80, 0x70, 0x08, 0x08, 0xF0];
const LETTER_T: Glyph = [0xF8, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20];
const LETTER_U: Glyph = [0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70];

/// Look up the glyph for `c`, or `None` if the font has no such character.
///
/// ```
/// use pressplot::render::font;
///
/// assert!(font::glyph('7').is_some());
/// assert_eq!(font::glyph('k'), font::glyph('K'));
/// assert!(font::glyph('?').is_none());
/// ```
pub fn glyph(c: char) -> Option<&'static Glyph> {
    match c.to_ascii_uppercase() {
        d @ '0'..='9' => Some(&DIGITS[d as usize - '0' as usize]),
        'E' => Some(&LETTER_E),
        'I' => Some(&LETTER_I),
        'K' => Some(&LETTER_K),
        'M' => Some(&LETTER_M),
        'P' => Some(&LETTER_P),
        'R' => Some(&LETTER_R),
        'S' => Some(&LETTER_S),
        'T' => Some(&LETTER_T),
        'U' => Some(&LETTER_U),
        _ => None,
    }
}

/// Whether bit (`col`, `row`) of the glyph is set.
#[inline]
pub fn is_set(glyph: &Glyph, col: usize, row: usize) -> bool {
    glyph[row] & (0x80 >> col) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_digits_present() {
        for c in '0'..='9' {
            assert!(glyph(c).is_some(), "missing digit {}", c);
        }
    }

    #[test]
    fn test_caption_letters_present() {
        for c in "TIMEPRESSUREK".chars() {
            assert!(glyph(c).is_some(), "missing letter {}", c);
        }
    }

    #[test]
    fn test_unsupported_characters() {
        for c in ['A', 'z', ' ', '-', '.', 'é'] {
            assert!(glyph(c).is_none(), "unexpected glyph for {:?}", c);
        }
    }

    #[test]
    fn test_glyphs_fit_five_columns() {
        for c in "0123456789EIKMPRSTU".chars() {
            let g = glyph(c).unwrap();
            for row in g {
                assert_eq!(row & 0x07, 0, "glyph {} uses columns past the fifth", c);
            }
        }
    }

    #[test]
    fn test_is_set() {
        let one = glyph('1').unwrap();
        // Top row of '1' is ..#..
        assert!(!is_set(one, 0, 0));
        assert!(is_set(one, 2, 0));
        // Bottom row is .###.
        assert!(is_set(one, 1, 6));
        assert!(is_set(one, 3, 6));
        assert!(!is_set(one, 4, 6));
    }
}
