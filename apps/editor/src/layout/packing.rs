//! Row packing for the two-column grid.
//!
//! Blocks flow left to right in order; a block that does not fit in the space
//! left on the current row starts a new one. No row ever sums past two columns.

use std::ops::Range;

use tracing::warn;

use crate::models::{BlockType, Colspan, ContentBlock};

pub const GRID_COLUMNS: u8 = 2;

/// Logical rows as index ranges into `blocks`.
pub fn pack_rows(blocks: &[ContentBlock]) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut width = 0u8;

    for (i, block) in blocks.iter().enumerate() {
        let span = block.colspan.columns();
        if width > 0 && width + span > GRID_COLUMNS {
            rows.push(start..i);
            start = i;
            width = 0;
        }
        width += span;
    }
    if start < blocks.len() {
        rows.push(start..blocks.len());
    }
    rows
}

/// True when every row sums to at most two columns and holds at most one full-width block.
pub fn rows_are_valid(blocks: &[ContentBlock]) -> bool {
    pack_rows(blocks).into_iter().all(|row| {
        let row = &blocks[row];
        let width: u8 = row.iter().map(|b| b.colspan.columns()).sum();
        let full = row.iter().filter(|b| b.colspan == Colspan::Full).count();
        width <= GRID_COLUMNS && full <= 1
    })
}

/// Local enforcement of the layout contract on a service response.
///
/// Spacers become full width, and a half-width block left alone on its row is
/// widened so the grid has no holes. Returns the number of blocks changed.
pub fn repair_layout(blocks: &mut [ContentBlock]) -> usize {
    let mut changed = 0;

    for block in blocks.iter_mut() {
        if block.block_type == BlockType::Spacer && block.colspan != Colspan::Full {
            block.colspan = Colspan::Full;
            changed += 1;
        }
    }

    for row in pack_rows(blocks) {
        if row.len() == 1 && blocks[row.start].colspan == Colspan::Half {
            blocks[row.start].colspan = Colspan::Full;
            changed += 1;
        }
    }

    if changed > 0 {
        warn!("Layout response broke grid rules; adjusted {changed} block(s)");
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{create_block, BlockPatch};

    fn blocks(spans: &[(BlockType, Colspan)]) -> Vec<ContentBlock> {
        spans
            .iter()
            .map(|(t, c)| create_block(*t, BlockPatch::colspan(*c)))
            .collect()
    }

    fn widths(blocks: &[ContentBlock]) -> Vec<u8> {
        blocks.iter().map(|b| b.colspan.columns()).collect()
    }

    use BlockType::{Spacer, Text};
    use Colspan::{Full, Half};

    #[test]
    fn test_pack_rows_pairs_halves() {
        let b = blocks(&[(Text, Half), (Text, Half), (Text, Full), (Text, Half)]);
        assert_eq!(pack_rows(&b), vec![0..2, 2..3, 3..4]);
    }

    #[test]
    fn test_pack_rows_half_then_full_splits() {
        let b = blocks(&[(Text, Half), (Text, Full), (Text, Half), (Text, Half)]);
        assert_eq!(pack_rows(&b), vec![0..1, 1..2, 2..4]);
    }

    #[test]
    fn test_two_full_blocks_never_share_a_row() {
        let b = blocks(&[(Text, Full), (Text, Full)]);
        assert_eq!(pack_rows(&b).len(), 2);
        assert!(rows_are_valid(&b));
    }

    #[test]
    fn test_any_sequence_packs_validly() {
        let patterns: [&[Colspan]; 4] = [
            &[Half, Half, Half],
            &[Full, Half, Full, Half, Half],
            &[Half, Full, Full, Half],
            &[],
        ];
        for p in patterns {
            let b: Vec<_> = p.iter().map(|c| (Text, *c)).collect();
            assert!(rows_are_valid(&blocks(&b)));
        }
    }

    #[test]
    fn test_repair_forces_spacers_full() {
        let mut b = blocks(&[(Text, Half), (Spacer, Half), (Text, Half), (Text, Half)]);
        repair_layout(&mut b);
        assert_eq!(b[1].colspan, Full);
    }

    #[test]
    fn test_repair_widens_orphan_halves() {
        let mut b = blocks(&[(Text, Half), (Text, Full), (Text, Half), (Text, Half), (Text, Half)]);
        let changed = repair_layout(&mut b);
        assert_eq!(changed, 2);
        assert_eq!(widths(&b), vec![2, 2, 1, 1, 2]);
    }

    #[test]
    fn test_repair_leaves_valid_layout_alone() {
        let mut b = blocks(&[(Text, Full), (Text, Half), (Text, Half)]);
        assert_eq!(repair_layout(&mut b), 0);
    }
}
