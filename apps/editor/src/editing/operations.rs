//! Editing operations over a block collection.
//!
//! Every operation is pure: it reads the previous collection and returns a new one,
//! or `None` when the operation is a no-op (unknown id, boundary move, nothing
//! changed). A `Some` result is one unit of undo history.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{BlockPatch, BlockType, ContentBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Where a dragged block lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableOp {
    AddRow,
    RemoveRow(usize),
    AddColumn,
    RemoveColumn(usize),
    SetCell { row: usize, col: usize, value: String },
}

/// A single operator action on the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert {
        block: ContentBlock,
        at: Option<usize>,
    },
    InsertBeforeFooter(Vec<ContentBlock>),
    Update {
        id: String,
        patch: BlockPatch,
    },
    Delete {
        id: String,
    },
    Move {
        id: String,
        direction: Direction,
    },
    Reorder {
        id: String,
        target_id: String,
        position: DropPosition,
    },
    Table {
        id: String,
        op: TableOp,
    },
}

/// Applies `edit` to `blocks`. `Ok(None)` means nothing changed.
pub fn apply(blocks: &[ContentBlock], edit: &Edit) -> Result<Option<Vec<ContentBlock>>, AppError> {
    let next = match edit {
        Edit::Insert { block, at } => Some(insert(blocks, block.clone(), *at)),
        Edit::InsertBeforeFooter(new_blocks) => insert_before_footer(blocks, new_blocks.clone()),
        Edit::Update { id, patch } => update(blocks, id, patch),
        Edit::Delete { id } => delete(blocks, id),
        Edit::Move { id, direction } => move_block(blocks, id, *direction),
        Edit::Reorder {
            id,
            target_id,
            position,
        } => reorder(blocks, id, target_id, *position),
        Edit::Table { id, op } => edit_table(blocks, id, op)?,
    };
    Ok(next.filter(|n| n.as_slice() != blocks))
}

fn position_of(blocks: &[ContentBlock], id: &str) -> Option<usize> {
    blocks.iter().position(|b| b.id() == id)
}

/// Inserts at `at` (clamped to the end), appending when `at` is `None`.
pub fn insert(blocks: &[ContentBlock], block: ContentBlock, at: Option<usize>) -> Vec<ContentBlock> {
    let mut next = blocks.to_vec();
    let at = at.map_or(next.len(), |i| i.min(next.len()));
    next.insert(at, block);
    next
}

/// Inserts `new_blocks` immediately before the footer, or at the end without one.
pub fn insert_before_footer(
    blocks: &[ContentBlock],
    new_blocks: Vec<ContentBlock>,
) -> Option<Vec<ContentBlock>> {
    if new_blocks.is_empty() {
        return None;
    }
    let at = blocks
        .iter()
        .position(|b| b.block_type == BlockType::Footer)
        .unwrap_or(blocks.len());
    let mut next = blocks.to_vec();
    next.splice(at..at, new_blocks);
    Some(next)
}

pub fn update(blocks: &[ContentBlock], id: &str, patch: &BlockPatch) -> Option<Vec<ContentBlock>> {
    let idx = position_of(blocks, id)?;
    let mut next = blocks.to_vec();
    patch.apply(&mut next[idx]);
    Some(next)
}

pub fn delete(blocks: &[ContentBlock], id: &str) -> Option<Vec<ContentBlock>> {
    let idx = position_of(blocks, id)?;
    let mut next = blocks.to_vec();
    next.remove(idx);
    Some(next)
}

/// Swaps the block with its neighbour in `direction`; no-op at either boundary.
pub fn move_block(
    blocks: &[ContentBlock],
    id: &str,
    direction: Direction,
) -> Option<Vec<ContentBlock>> {
    let idx = position_of(blocks, id)?;
    let target = match direction {
        Direction::Up => idx.checked_sub(1)?,
        Direction::Down => idx + 1,
    };
    if target >= blocks.len() {
        return None;
    }
    let mut next = blocks.to_vec();
    next.swap(idx, target);
    Some(next)
}

/// Drag-and-drop: lifts `id` out and drops it before/after `target_id`.
pub fn reorder(
    blocks: &[ContentBlock],
    id: &str,
    target_id: &str,
    position: DropPosition,
) -> Option<Vec<ContentBlock>> {
    if id == target_id {
        return None;
    }
    let from = position_of(blocks, id)?;
    position_of(blocks, target_id)?;

    let mut next = blocks.to_vec();
    let moved = next.remove(from);
    let target = position_of(&next, target_id)?;
    let at = match position {
        DropPosition::Before => target,
        DropPosition::After => target + 1,
    };
    next.insert(at, moved);
    Some(next)
}

/// Table mutation on block `id`. Unknown id is a no-op; an invalid mutation is rejected.
pub fn edit_table(
    blocks: &[ContentBlock],
    id: &str,
    op: &TableOp,
) -> Result<Option<Vec<ContentBlock>>, AppError> {
    let Some(idx) = position_of(blocks, id) else {
        return Ok(None);
    };
    let mut next = blocks.to_vec();
    let block = &mut next[idx];
    if block.block_type != BlockType::Table {
        return Err(AppError::InvalidTableMutation(format!(
            "Block {id} is a {} block, not a table",
            block.block_type
        )));
    }
    let table = block.table_data.get_or_insert_with(Default::default);
    match op {
        TableOp::AddRow => table.add_row(),
        TableOp::RemoveRow(row) => table.remove_row(*row)?,
        TableOp::AddColumn => table.add_column(),
        TableOp::RemoveColumn(col) => table.remove_column(*col)?,
        TableOp::SetCell { row, col, value } => table.set_cell(*row, *col, value.clone())?,
    }
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{create_block, BlockPatch, BlockType};

    fn abc() -> Vec<ContentBlock> {
        ["A", "B", "C"]
            .iter()
            .map(|c| create_block(BlockType::Text, BlockPatch::content(*c)))
            .collect()
    }

    fn labels(blocks: &[ContentBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.content.as_str()).collect()
    }

    fn id_of(blocks: &[ContentBlock], label: &str) -> String {
        blocks
            .iter()
            .find(|b| b.content == label)
            .unwrap()
            .id()
            .to_string()
    }

    #[test]
    fn test_move_boundaries_are_noops() {
        let blocks = abc();
        let a = id_of(&blocks, "A");
        let c = id_of(&blocks, "C");
        assert!(move_block(&blocks, &a, Direction::Up).is_none());
        assert!(move_block(&blocks, &c, Direction::Down).is_none());
    }

    #[test]
    fn test_move_up_swaps_with_predecessor() {
        let blocks = abc();
        let b = id_of(&blocks, "B");
        let next = move_block(&blocks, &b, Direction::Up).unwrap();
        assert_eq!(labels(&next), vec!["B", "A", "C"]);
        // previous collection untouched
        assert_eq!(labels(&blocks), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let blocks = abc();
        let result = apply(&blocks, &Edit::Delete { id: "nope".into() }).unwrap();
        assert!(result.is_none());
        assert_eq!(labels(&blocks), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_delete_removes_block() {
        let blocks = abc();
        let b = id_of(&blocks, "B");
        let next = delete(&blocks, &b).unwrap();
        assert_eq!(labels(&next), vec!["A", "C"]);
    }

    #[test]
    fn test_update_merges_fields() {
        let blocks = abc();
        let a = id_of(&blocks, "A");
        let next = update(
            &blocks,
            &a,
            &BlockPatch {
                title: Some("Intro".into()),
                ..BlockPatch::content("A2")
            },
        )
        .unwrap();
        assert_eq!(next[0].content, "A2");
        assert_eq!(next[0].title.as_deref(), Some("Intro"));
        assert_eq!(next[0].id(), a);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        assert!(update(&abc(), "missing", &BlockPatch::content("x")).is_none());
    }

    #[test]
    fn test_update_without_change_is_noop() {
        let blocks = abc();
        let a = id_of(&blocks, "A");
        let edit = Edit::Update {
            id: a,
            patch: BlockPatch::content("A"),
        };
        assert!(apply(&blocks, &edit).unwrap().is_none());
    }

    #[test]
    fn test_insert_defaults_to_append_and_clamps() {
        let blocks = abc();
        let d = create_block(BlockType::Text, BlockPatch::content("D"));
        assert_eq!(labels(&insert(&blocks, d.clone(), None)), vec!["A", "B", "C", "D"]);
        assert_eq!(labels(&insert(&blocks, d.clone(), Some(1))), vec!["A", "D", "B", "C"]);
        assert_eq!(labels(&insert(&blocks, d, Some(42))), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_insert_before_footer() {
        let mut blocks = abc();
        blocks.push(create_block(BlockType::Footer, BlockPatch::content("F")));
        let new = vec![
            create_block(BlockType::Text, BlockPatch::content("X")),
            create_block(BlockType::Text, BlockPatch::content("Y")),
        ];
        let next = insert_before_footer(&blocks, new).unwrap();
        assert_eq!(labels(&next), vec!["A", "B", "C", "X", "Y", "F"]);
    }

    #[test]
    fn test_insert_before_footer_without_footer_appends() {
        let next =
            insert_before_footer(&abc(), vec![create_block(BlockType::Text, BlockPatch::content("X"))])
                .unwrap();
        assert_eq!(labels(&next), vec!["A", "B", "C", "X"]);
    }

    #[test]
    fn test_reorder_before_and_after() {
        let blocks = abc();
        let a = id_of(&blocks, "A");
        let c = id_of(&blocks, "C");
        let next = reorder(&blocks, &c, &a, DropPosition::Before).unwrap();
        assert_eq!(labels(&next), vec!["C", "A", "B"]);
        let next = reorder(&blocks, &a, &c, DropPosition::After).unwrap();
        assert_eq!(labels(&next), vec!["B", "C", "A"]);
        let next = reorder(&blocks, &a, &c, DropPosition::Before).unwrap();
        assert_eq!(labels(&next), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_reorder_noops() {
        let blocks = abc();
        let a = id_of(&blocks, "A");
        assert!(reorder(&blocks, &a, &a, DropPosition::After).is_none());
        assert!(reorder(&blocks, &a, "missing", DropPosition::After).is_none());
        assert!(reorder(&blocks, "missing", &a, DropPosition::After).is_none());
    }

    #[test]
    fn test_table_edit_rejects_last_row_removal() {
        let mut blocks = abc();
        let table = create_block(BlockType::Table, BlockPatch::default());
        let id = table.id().to_string();
        blocks.push(table);

        let next = apply(&blocks, &Edit::Table { id: id.clone(), op: TableOp::RemoveRow(2) })
            .unwrap()
            .unwrap();
        let err = apply(&next, &Edit::Table { id, op: TableOp::RemoveRow(1) });
        assert!(matches!(err, Err(AppError::InvalidTableMutation(_))));
    }

    #[test]
    fn test_table_edit_on_non_table_rejected() {
        let blocks = abc();
        let a = id_of(&blocks, "A");
        let result = edit_table(&blocks, &a, &TableOp::AddRow);
        assert!(matches!(result, Err(AppError::InvalidTableMutation(_))));
    }

    #[test]
    fn test_table_edit_unknown_id_is_noop() {
        assert!(edit_table(&abc(), "missing", &TableOp::AddRow).unwrap().is_none());
    }
}
