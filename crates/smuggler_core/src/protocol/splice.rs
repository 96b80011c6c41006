//! Note text mutation helpers.
//!
//! # Invariants
//! - Text outside the edited region is preserved byte-for-byte.
//! - Out-of-range or mid-character offsets are clamped, never panic.

/// Where a new block goes relative to existing note text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertPosition {
    Top,
    #[default]
    Bottom,
}

/// Joins `block` to `note` with a single newline.
pub fn insert_block(note: &str, block: &str, position: InsertPosition) -> String {
    let (first, second) = match position {
        InsertPosition::Top => (block, note),
        InsertPosition::Bottom => (note, block),
    };
    let mut joined = String::with_capacity(first.len() + second.len() + 1);
    joined.push_str(first);
    joined.push('\n');
    joined.push_str(second);
    joined
}

/// Replaces `length` bytes starting at `start` with `replacement`.
///
/// `length == 0` inserts, an empty `replacement` deletes. Stale offsets past
/// the end of `note` are clamped to its length, and offsets inside a
/// multi-byte character move back to that character's start.
pub fn splice_note(note: &str, start: usize, length: usize, replacement: &str) -> String {
    let start = floor_char_boundary(note, start);
    let end = floor_char_boundary(note, start.saturating_add(length)).max(start);

    let mut spliced = String::with_capacity(note.len() - (end - start) + replacement.len());
    spliced.push_str(&note[..start]);
    spliced.push_str(replacement);
    spliced.push_str(&note[end..]);
    spliced
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::{insert_block, splice_note, InsertPosition};

    #[test]
    fn insert_block_joins_with_one_newline() {
        assert_eq!(insert_block("X", "Y", InsertPosition::Top), "Y\nX");
        assert_eq!(insert_block("X", "Y", InsertPosition::Bottom), "X\nY");
        assert_eq!(insert_block("X", "Y", InsertPosition::default()), "X\nY");
    }

    #[test]
    fn splice_with_zero_length_and_empty_replacement_is_identity() {
        let note = "alpha\nbeta";
        for idx in 0..=note.len() {
            assert_eq!(splice_note(note, idx, 0, ""), note);
        }
    }

    #[test]
    fn removed_region_can_be_reinserted() {
        let note = "head [block] tail";
        let removed = &note[5..12];
        let without = splice_note(note, 5, 7, "");
        assert_eq!(without, "head  tail");
        assert_eq!(splice_note(&without, 5, 0, removed), note);
    }

    #[test]
    fn replacement_at_both_ends() {
        assert_eq!(splice_note("abc", 0, 1, "X"), "Xbc");
        assert_eq!(splice_note("abc", 2, 1, "X"), "abX");
        assert_eq!(splice_note("abc", 3, 0, "!"), "abc!");
    }

    #[test]
    fn stale_offsets_are_clamped() {
        assert_eq!(splice_note("abc", 10, 5, "X"), "abcX");
        assert_eq!(splice_note("abc", 1, 99, ""), "a");
        assert_eq!(splice_note("abc", 1, usize::MAX, "Z"), "aZ");
    }

    #[test]
    fn mid_character_offsets_snap_to_char_start() {
        // "é" occupies bytes 1..3.
        assert_eq!(splice_note("aéb", 2, 0, "X"), "aXéb");
        assert_eq!(splice_note("aéb", 0, 2, ""), "éb");
    }
}
