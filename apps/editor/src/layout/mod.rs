// Grid layout: AI-suggested colspans, local row-packing rules, header/footer anchoring.

pub mod assigner;
pub mod packing;
pub mod prompts;

pub use assigner::{
    assign_layout, LayoutBlock, LayoutRequest, LayoutResponse, LayoutSuggester,
};
pub use packing::{pack_rows, repair_layout, rows_are_valid};
