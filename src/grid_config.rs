use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

use smallvec::SmallVec;
use thiserror::Error;

use crate::word_list::{Word, WordList};
use crate::{SlotId, MAX_SLOT_LENGTH};

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Cells covered by a run of `len` cells starting at `loc` and heading in `dir`.
fn cell_coords(loc: GridCoord, len: usize, dir: Direction) -> impl Iterator<Item = GridCoord> {
    (0..len).map(move |cell_idx| match dir {
        Direction::Across => (loc.0 + cell_idx, loc.1),
        Direction::Down => (loc.0, loc.1 + cell_idx),
    })
}

/// An across or down entry in the input to `generate_grid_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridEntry {
    pub loc: GridCoord,
    pub len: usize,
    pub dir: Direction,
}

impl GridEntry {
    /// Generate the coords for each cell of this entry.
    fn cell_coords(&self) -> Vec<GridCoord> {
        cell_coords(self.loc, self.len, self.dir).collect()
    }
}

impl Display for GridEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-cell {} entry at ({}, {})", self.len, self.dir, self.loc.0, self.loc.1)
    }
}

/// A slot in the grid, i.e. one variable of the constraint problem. Slots never change once the
/// grid config has been generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> {
        cell_coords(self.start_cell, self.length, self.direction)
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "slot {} ({} {} at ({}, {}))",
            self.id, self.length, self.direction, self.start_cell.0, self.start_cell.1,
        )
    }
}

/// The shared cell between two crossing slots: the character at `cell_idx` of the first slot's
/// word must equal the character at `other_cell_idx` of the second slot's word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overlap {
    pub cell_idx: usize,
    pub other_cell_idx: usize,
}

impl Overlap {
    /// The same overlap seen from the other slot.
    pub fn reversed(self) -> Overlap {
        Overlap {
            cell_idx: self.other_cell_idx,
            other_cell_idx: self.cell_idx,
        }
    }

    /// Do these two words put the same character in the shared cell? A word too short to reach
    /// the cell never agrees.
    pub fn agrees(&self, word: &Word, other_word: &Word) -> bool {
        match (word.char_at(self.cell_idx), other_word.char_at(self.other_cell_idx)) {
            (Some(glyph), Some(other_glyph)) => glyph == other_glyph,
            _ => false,
        }
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and where the two slots meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub overlap: Overlap,
}

/// Reasons a set of entries or a template can't be turned into a grid config.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("the grid doesn't contain any slots")]
    NoSlots,
    #[error("the {entry} doesn't cover any cells")]
    EmptyEntry { entry: GridEntry },
    #[error("the {entry} appears more than once")]
    DuplicateEntry { entry: GridEntry },
    #[error(
        "slots {slot} and {other_slot} share {shared_cells} cells, but crossing slots can share \
         only one"
    )]
    AmbiguousCrossing {
        slot: SlotId,
        other_slot: SlotId,
        shared_cells: usize,
    },
}

/// A struct representing the aspects of a grid that are static during filling: its geometry, its
/// slots, the crossings between them and the word list.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// Indexed as `[y][x]`; `true` for cells that take a letter.
    open_cells: Vec<Vec<bool>>,

    slots: Vec<Slot>,
    words: WordList,

    /// For each slot, the slots it crosses, ordered by `other_slot_id`.
    crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slots", &self.slots)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl GridConfig {
    pub fn is_open(&self, x: usize, y: usize) -> bool {
        self.open_cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Crossing] {
        &self.crossings[slot_id]
    }

    /// The overlap between `slot_id` and `other_slot_id`, or `None` if they don't cross.
    pub fn overlap(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<Overlap> {
        let crossings = &self.crossings[slot_id];

        crossings
            .binary_search_by_key(&other_slot_id, |crossing| crossing.other_slot_id)
            .ok()
            .map(|idx| crossings[idx].overlap)
    }

    /// Ids of every slot crossing `slot_id`, in ascending order.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.crossings[slot_id].iter().map(|crossing| crossing.other_slot_id)
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.crossings[slot_id].len()
    }

    /// Can `word` sit in `slot_id` while `other_word` sits in `other_slot_id`, as far as their
    /// shared cell is concerned? Slots that don't cross are always compatible. This is the one
    /// place overlap compatibility is decided; consistency checking and value ordering both go
    /// through it.
    pub fn words_compatible(
        &self,
        slot_id: SlotId,
        other_slot_id: SlotId,
        word: &Word,
        other_word: &Word,
    ) -> bool {
        match self.overlap(slot_id, other_slot_id) {
            Some(overlap) => overlap.agrees(word, other_word),
            None => true,
        }
    }
}

/// Generate a GridConfig representing a grid with specified entries. Slot ids follow the order of
/// `entries`.
pub fn generate_grid_config(
    word_list: WordList,
    entries: &[GridEntry],
) -> Result<GridConfig, GridError> {
    if entries.is_empty() {
        return Err(GridError::NoSlots);
    }

    for (entry_idx, entry) in entries.iter().enumerate() {
        if entry.len == 0 {
            return Err(GridError::EmptyEntry { entry: entry.clone() });
        }
        if entries[..entry_idx].contains(entry) {
            return Err(GridError::DuplicateEntry { entry: entry.clone() });
        }
    }

    let width = entries
        .iter()
        .flat_map(|entry| entry.cell_coords())
        .map(|(x, _)| x + 1)
        .max()
        .unwrap_or(0);
    let height = entries
        .iter()
        .flat_map(|entry| entry.cell_coords())
        .map(|(_, y)| y + 1)
        .max()
        .unwrap_or(0);

    let mut open_cells = vec![vec![false; width]; height];
    for entry in entries {
        for (x, y) in entry.cell_coords() {
            open_cells[y][x] = true;
        }
    }

    build_grid_config(word_list, entries, width, height, open_cells)
}

/// Generate a GridConfig representing a square grid with no blocks.
pub fn generate_square_grid_config(
    word_list: WordList,
    square_size: usize,
) -> Result<GridConfig, GridError> {
    let across = (0..square_size).map(|idx| GridEntry {
        loc: (0, idx),
        len: square_size,
        dir: Direction::Across,
    });
    let down = (0..square_size).map(|idx| GridEntry {
        loc: (idx, 0),
        len: square_size,
        dir: Direction::Down,
    });
    let entries: Vec<GridEntry> = across.chain(down).collect();

    generate_grid_config(word_list, &entries)
}

/// Generate a grid config from a string template, with `_` or `.` representing open cells and any
/// other character representing a block. Lines are trimmed and blank lines are ignored; rows
/// shorter than the widest one are treated as blocked past their end.
///
/// Across slots get the lowest ids (row by row), followed by down slots (column by column).
pub fn generate_grid_config_from_template_string(
    word_list: WordList,
    template: &str,
) -> Result<GridConfig, GridError> {
    let rows: Vec<Vec<bool>> = template
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.chars().map(|c| c == '_' || c == '.').collect())
            }
        })
        .collect();

    generate_grid_config_from_open_cells(word_list, rows)
}

/// Generate a grid config from the contents of a structure file. Every line is one row, read
/// exactly as written: `_` is an open cell and anything else, including a space, is a block. A
/// blank line is a row of blocks. Slot ids are assigned as in
/// `generate_grid_config_from_template_string`.
pub fn generate_grid_config_from_structure(
    word_list: WordList,
    structure: &str,
) -> Result<GridConfig, GridError> {
    let rows: Vec<Vec<bool>> = structure
        .lines()
        .map(|line| line.chars().map(|c| c == '_').collect())
        .collect();

    generate_grid_config_from_open_cells(word_list, rows)
}

/// Turn rows of open/blocked cells into a grid config, padding short rows with blocks.
fn generate_grid_config_from_open_cells(
    word_list: WordList,
    rows: Vec<Vec<bool>>,
) -> Result<GridConfig, GridError> {
    let height = rows.len();
    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let open_cells: Vec<Vec<bool>> = rows
        .into_iter()
        .map(|mut row| {
            row.resize(width, false);
            row
        })
        .collect();

    /// Find every run of at least two open cells in each line, as (line index, start, length).
    fn build_runs(lines: &[Vec<bool>]) -> Vec<(usize, usize, usize)> {
        let mut result = vec![];

        for (line_idx, line) in lines.iter().enumerate() {
            let mut run_start = 0;
            let mut run_length = 0;

            for (cell_idx, &open) in line.iter().enumerate() {
                if open {
                    if run_length == 0 {
                        run_start = cell_idx;
                    }
                    run_length += 1;
                } else {
                    if run_length > 1 {
                        result.push((line_idx, run_start, run_length));
                    }
                    run_length = 0;
                }
            }

            if run_length > 1 {
                result.push((line_idx, run_start, run_length));
            }
        }

        result
    }

    let mut entries: Vec<GridEntry> = vec![];

    for (y, x, len) in build_runs(&open_cells) {
        entries.push(GridEntry {
            loc: (x, y),
            len,
            dir: Direction::Across,
        });
    }

    let transposed: Vec<Vec<bool>> = (0..width)
        .map(|x| (0..height).map(|y| open_cells[y][x]).collect())
        .collect();

    for (x, y, len) in build_runs(&transposed) {
        entries.push(GridEntry {
            loc: (x, y),
            len,
            dir: Direction::Down,
        });
    }

    if entries.is_empty() {
        return Err(GridError::NoSlots);
    }

    build_grid_config(word_list, &entries, width, height, open_cells)
}

/// Derive slots and crossings from validated entries.
fn build_grid_config(
    word_list: WordList,
    entries: &[GridEntry],
    width: usize,
    height: usize,
    open_cells: Vec<Vec<bool>>,
) -> Result<GridConfig, GridError> {
    // Build a map from cell location to the (entry index, cell index within entry) pairs covering
    // it, which we can then use to calculate crossings.
    let mut entries_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();
    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, loc) in entry.cell_coords().into_iter().enumerate() {
            entries_by_loc.entry(loc).or_default().push((entry_idx, cell_idx));
        }
    }

    // Every shared cell between two slots, keyed by the ordered pair of slot ids.
    let mut shared_cells: HashMap<(SlotId, SlotId), Vec<Overlap>> = HashMap::new();
    for covering in entries_by_loc.values() {
        for &(slot_id, cell_idx) in covering {
            for &(other_slot_id, other_cell_idx) in covering {
                if slot_id != other_slot_id {
                    shared_cells
                        .entry((slot_id, other_slot_id))
                        .or_default()
                        .push(Overlap { cell_idx, other_cell_idx });
                }
            }
        }
    }

    let mut crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>> =
        entries.iter().map(|_| SmallVec::new()).collect();

    let mut pairs: Vec<(SlotId, SlotId)> = shared_cells.keys().copied().collect();
    pairs.sort_unstable();

    for (slot_id, other_slot_id) in pairs {
        let overlaps = &shared_cells[&(slot_id, other_slot_id)];

        if overlaps.len() > 1 {
            return Err(GridError::AmbiguousCrossing {
                slot: slot_id.min(other_slot_id),
                other_slot: slot_id.max(other_slot_id),
                shared_cells: overlaps.len(),
            });
        }

        crossings[slot_id].push(Crossing {
            other_slot_id,
            overlap: overlaps[0],
        });
    }

    let slots = entries
        .iter()
        .enumerate()
        .map(|(id, entry)| Slot {
            id,
            start_cell: entry.loc,
            direction: entry.dir,
            length: entry.len,
        })
        .collect();

    Ok(GridConfig {
        width,
        height,
        open_cells,
        slots,
        words: word_list,
        crossings,
    })
}
