//! Fill crossword grids by treating them as a constraint satisfaction problem.
//!
//! Each slot in the grid is a variable whose domain starts out as the whole word list. Filling
//! runs in three stages:
//!
//! 1. node consistency drops words whose length doesn't match their slot (`domains`),
//! 2. AC-3 drops words that can't agree with any option of a crossing slot (`arc_consistency`),
//! 3. backtracking search with MRV slot selection and LCV word ordering looks for a complete fill
//!    in which no word is used twice (`backtracking_search`).
//!
//! `fill::find_fill` runs all three; `fill::CrosswordSolver` exposes them one at a time.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod fill;
pub mod grid_config;
pub mod render;
pub mod word_list;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the grid config's `slots`.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the grid config's word list.
pub type WordId = usize;

pub use backtracking_search::{Assignment, FillOptions, Statistics, ValueOrdering, VariableOrdering};
pub use fill::{find_fill, CrosswordSolver, FillFailure, FillSuccess};
pub use grid_config::{
    generate_grid_config, generate_grid_config_from_structure,
    generate_grid_config_from_template_string, generate_square_grid_config, Direction, GridConfig,
    GridEntry, GridError,
};
pub use render::render_grid;
pub use word_list::WordList;
