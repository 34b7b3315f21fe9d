// Block-collection editing core: pure operations plus undo/redo history.

pub mod history;
pub mod operations;

pub use history::{History, Snapshot};
pub use operations::{apply, Direction, DropPosition, Edit, TableOp};
