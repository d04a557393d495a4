//! The domain store: for every slot, the set of words that could still go there.
//!
//! Domains start out holding the whole word list and only ever shrink. Node consistency removes
//! words of the wrong length; arc consistency (see `arc_consistency.rs`) removes words that can't
//! agree with any option of a crossing slot.

use bit_set::BitSet;
use log::debug;

use crate::grid_config::GridConfig;
use crate::{SlotId, WordId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    /// Indexed by `SlotId`; each set holds `WordId`s into the grid's word list.
    domains: Vec<BitSet>,
}

impl Domains {
    /// Seed every slot with every word in the list.
    pub fn full(config: &GridConfig) -> Domains {
        let all_words: BitSet = (0..config.words().len()).collect();

        Domains {
            domains: vec![all_words; config.slot_count()],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.domains.len()
    }

    /// How many options remain for this slot?
    pub fn len(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// Remaining options for this slot, in word list order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    /// Remove a word from a slot's domain, returning whether it was there.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    /// Total number of options across all slots.
    pub fn total_len(&self) -> usize {
        self.domains.iter().map(|domain| domain.len()).sum()
    }
}

/// Make every slot node-consistent by removing options whose length doesn't match the slot.
/// Returns the number of options removed; a second call always returns 0.
pub fn enforce_node_consistency(config: &GridConfig, domains: &mut Domains) -> usize {
    let words = config.words();
    let mut removed = 0;

    for slot in config.slots() {
        let mismatched: Vec<WordId> = domains
            .iter(slot.id)
            .filter(|&word_id| words[word_id].len() != slot.length)
            .collect();

        for word_id in mismatched {
            domains.remove(slot.id, word_id);
            removed += 1;
        }
    }

    debug!(
        "Node consistency removed {} options, {} remain",
        removed,
        domains.total_len()
    );

    removed
}
