//! Bitmap font for the large numerals.
//!
//! Each glyph is 5 rows tall and 5 columns wide. A non-space character in a
//! row means "filled"; a space means "empty".

pub const GLYPH_ROWS: usize = 5;
pub const GLYPH_COLUMNS: usize = 5;

/// Return the bitmap for `ch`, or `None` if the character is not in the
/// font.
pub fn glyph(ch: char) -> Option<[&'static str; GLYPH_ROWS]> {
    let g = match ch {
        '0' => [" ### ", "#   #", "#   #", "#   #", " ### "],
        '1' => ["  #  ", " ##  ", "  #  ", "  #  ", " ### "],
        '2' => [" ### ", "#   #", "  ## ", " #   ", "#####"],
        '3' => [" ### ", "#   #", "  ## ", "#   #", " ### "],
        '4' => ["#  # ", "#  # ", "#####", "   # ", "   # "],
        '5' => ["#####", "#    ", "#### ", "    #", "#### "],
        '6' => [" ### ", "#    ", "#### ", "#   #", " ### "],
        '7' => ["#####", "   # ", "  #  ", " #   ", " #   "],
        '8' => [" ### ", "#   #", " ### ", "#   #", " ### "],
        '9' => [" ### ", "#   #", " ####", "   # ", " ### "],
        '?' => [" ### ", "#   #", "  ## ", "     ", "  #  "],
        _ => return None,
    };
    debug_assert!(
        g.iter().all(|row| row.len() == GLYPH_COLUMNS),
        "glyph '{ch}' has inconsistent row widths",
    );
    Some(g)
}

/// Whether the glyph pixel at (`column`, `row`) is filled. Characters
/// missing from the font render as `?`.
pub fn is_filled(ch: char, column: usize, row: usize) -> bool {
    let Some(bitmap) = glyph(ch).or_else(|| glyph('?')) else {
        return false;
    };
    bitmap
        .get(row)
        .and_then(|line| line.as_bytes().get(column))
        .is_some_and(|b| *b != b' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_digit_is_present() {
        for d in '0'..='9' {
            assert!(glyph(d).is_some(), "missing {d}");
        }
    }

    #[test]
    fn unknown_characters_fall_back() {
        assert_eq!(is_filled('x', 2, 4), is_filled('?', 2, 4));
        assert!(!is_filled('1', 9, 0));
    }
}
