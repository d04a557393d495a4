//! An implementation of the AC-3 algorithm for crossword grids. A grid is arc-consistent when every
//! option left for a slot puts, in each cell it shares with a crossing slot, a letter that at least
//! one of the crossing slot's options also puts there.
//!
//! We keep a FIFO worklist of arcs (ordered slot pairs). Revising an arc removes unsupported
//! options from its first slot; whenever that removes anything, every other slot crossing it has
//! to be re-checked against it. We stop when the worklist drains or some slot runs out of options.

use std::collections::{HashSet, VecDeque};

use bit_set::BitSet;
use log::debug;

use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::{SlotId, WordId};

/// A directed constraint between two slots: the options of `slot_id` need support in the options
/// of `other_slot_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintArc {
    pub slot_id: SlotId,
    pub other_slot_id: SlotId,
}

impl ConstraintArc {
    pub fn new(slot_id: SlotId, other_slot_id: SlotId) -> ConstraintArc {
        ConstraintArc { slot_id, other_slot_id }
    }
}

/// Result from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs actually removed something.
    pub revisions: usize,

    /// How many options were removed in total.
    pub eliminations: usize,
}

/// Result from a failed call to `enforce_arc_consistency`: the slot whose options ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Worklist of arcs waiting to be revised. An arc that is already waiting isn't added a second
/// time.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<ConstraintArc>,
    queued: BitSet,
    slot_count: usize,
}

impl ArcQueue {
    fn new(slot_count: usize) -> ArcQueue {
        ArcQueue {
            queue: VecDeque::new(),
            queued: BitSet::with_capacity(slot_count * slot_count),
            slot_count,
        }
    }

    fn key(&self, arc: ConstraintArc) -> usize {
        arc.slot_id * self.slot_count + arc.other_slot_id
    }

    fn pop_front(&mut self) -> Option<ConstraintArc> {
        let arc = self.queue.pop_front()?;
        let key = self.key(arc);
        self.queued.remove(key);

        Some(arc)
    }

    fn enqueue(&mut self, arc: ConstraintArc) {
        let key = self.key(arc);
        if self.queued.insert(key) {
            self.queue.push_back(arc);
        }
    }
}

/// Every ordered pair of distinct crossing slots, ordered by first slot and then second slot.
pub fn all_arcs(config: &GridConfig) -> Vec<ConstraintArc> {
    config
        .slots()
        .iter()
        .flat_map(|slot| {
            config
                .neighbors(slot.id)
                .map(move |other_slot_id| ConstraintArc::new(slot.id, other_slot_id))
        })
        .collect()
}

/// Make `arc.slot_id` arc-consistent with `arc.other_slot_id` by removing each of its options
/// that no option of the other slot agrees with in their shared cell. Returns whether anything was
/// removed. Slots that don't cross never revise each other.
pub fn revise(config: &GridConfig, domains: &mut Domains, arc: ConstraintArc) -> bool {
    let overlap = match config.overlap(arc.slot_id, arc.other_slot_id) {
        Some(overlap) => overlap,
        None => return false,
    };
    let words = config.words();

    // Which letters can the crossing slot still put in the shared cell?
    let supported_glyphs: HashSet<char> = domains
        .iter(arc.other_slot_id)
        .filter_map(|word_id| words[word_id].char_at(overlap.other_cell_idx))
        .collect();

    let unsupported: Vec<WordId> = domains
        .iter(arc.slot_id)
        .filter(|&word_id| {
            words[word_id]
                .char_at(overlap.cell_idx)
                .map_or(true, |glyph| !supported_glyphs.contains(&glyph))
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(arc.slot_id, word_id);
    }

    !unsupported.is_empty()
}

/// Run AC-3 over `domains`. If `arcs` is `None` the worklist starts with every arc in the grid;
/// otherwise it starts with just the given arcs, which must refer to slots of `config`.
pub fn enforce_arc_consistency(
    config: &GridConfig,
    domains: &mut Domains,
    arcs: Option<&[ConstraintArc]>,
) -> ArcConsistencyResult {
    let mut queue = ArcQueue::new(config.slot_count());

    match arcs {
        Some(arcs) => arcs.iter().for_each(|&arc| queue.enqueue(arc)),
        None => all_arcs(config).into_iter().for_each(|arc| queue.enqueue(arc)),
    }

    let mut revisions = 0;
    let mut eliminations = 0;

    while let Some(arc) = queue.pop_front() {
        let option_count = domains.len(arc.slot_id);

        if !revise(config, domains, arc) {
            continue;
        }

        revisions += 1;
        eliminations += option_count - domains.len(arc.slot_id);

        if domains.is_empty(arc.slot_id) {
            debug!(
                "Arc consistency emptied {} while revising it against {}",
                config.slot(arc.slot_id),
                config.slot(arc.other_slot_id),
            );
            return Err(ArcConsistencyFailure { slot_id: arc.slot_id });
        }

        // The slot lost options, so its other crossings may have lost their support.
        for neighbor in config.neighbors(arc.slot_id) {
            if neighbor != arc.other_slot_id {
                queue.enqueue(ConstraintArc::new(neighbor, arc.slot_id));
            }
        }
    }

    debug!(
        "Arc consistency made {} revisions removing {} options, {} remain",
        revisions,
        eliminations,
        domains.total_len()
    );

    Ok(ArcConsistencySuccess { revisions, eliminations })
}
