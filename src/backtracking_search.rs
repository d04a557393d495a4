//! Depth-first search for a complete fill over domains that node and arc consistency have already
//! pruned. Domains are only read here; each candidate word is tried on its own and undone if it
//! leads nowhere.

use std::cmp::Reverse;
use std::collections::HashSet;

use instant::Duration;
use log::trace;

use crate::domains::Domains;
use crate::grid_config::{GridConfig, Slot};
use crate::{SlotId, WordId};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Indexed by `SlotId`.
    choices: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An assignment for a grid with `slot_count` slots, none of them bound yet.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            choices: vec![None; slot_count],
            assigned_count: 0,
        }
    }

    /// Bind a slot, returning the word it was bound to before (if any).
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.choices[slot_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    /// Remove a slot's binding, returning the word it was bound to.
    pub fn unassign(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.choices[slot_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.choices.get(slot_id).copied().flatten()
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    /// Number of bound slots.
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// Does this bind every slot of the grid, each to a non-empty word?
    pub fn is_complete(&self, config: &GridConfig) -> bool {
        self.choices.len() == config.slot_count()
            && self.assigned_count == config.slot_count()
            && self.iter().all(|choice| !config.words()[choice.word_id].is_empty())
    }

    /// Bound slots in `SlotId` order.
    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| Choice { slot_id, word_id }))
    }

    /// Resolve the bound slots and words against the grid config.
    pub fn words<'a>(&self, config: &'a GridConfig) -> Vec<(&'a Slot, &'a str)> {
        self.iter()
            .map(|choice| {
                (
                    config.slot(choice.slot_id),
                    config.words()[choice.word_id].string.as_str(),
                )
            })
            .collect()
    }
}

/// How to pick the next slot to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum VariableOrdering {
    /// The slot with the fewest remaining options, preferring slots with more crossings on ties.
    #[default]
    MinimumRemainingValues,
    /// The unfilled slot with the lowest id.
    SlotOrder,
}

/// How to order the options of the slot being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ValueOrdering {
    /// Options that rule out the fewest options of unfilled crossing slots come first.
    #[default]
    LeastConstraining,
    /// Options in word list order.
    DomainOrder,
}

/// Settings for a fill. The orderings only change which fill is found and how quickly, never
/// whether one is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillOptions {
    pub variable_ordering: VariableOrdering,
    pub value_ordering: ValueOrdering,

    /// Give up after visiting this many search states.
    pub max_states: Option<u64>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Calls to `backtrack`, i.e. partial assignments visited.
    pub states: u64,

    /// Candidate words tentatively bound to a slot.
    pub words_tested: u64,

    /// Slots whose every candidate failed.
    pub backtracks: u64,

    pub duration: Duration,
}

/// Outcome of one call to `backtrack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The assignment is now complete and consistent.
    Complete,
    /// No completion exists from the assignment that was passed in; it has been left unchanged.
    Exhausted,
    /// `FillOptions::max_states` was reached; the assignment has been left unchanged.
    BudgetExhausted,
}

/// Is this (partial) assignment free of conflicts? That means no word is used twice, every word
/// has its slot's length, and every pair of filled crossing slots agrees in their shared cell.
pub fn consistent(config: &GridConfig, assignment: &Assignment) -> bool {
    let words = config.words();
    let mut used: HashSet<WordId> = HashSet::with_capacity(assignment.len());

    for choice in assignment.iter() {
        if !used.insert(choice.word_id) {
            return false;
        }

        let word = &words[choice.word_id];
        if word.len() != config.slot(choice.slot_id).length {
            return false;
        }

        for neighbor in config.neighbors(choice.slot_id) {
            if let Some(other_word_id) = assignment.get(neighbor) {
                if !config.words_compatible(choice.slot_id, neighbor, word, &words[other_word_id]) {
                    return false;
                }
            }
        }
    }

    true
}

/// Choose the next slot to fill, or `None` if every slot is already filled.
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
    ordering: VariableOrdering,
) -> Option<SlotId> {
    let mut unassigned =
        (0..config.slot_count()).filter(|&slot_id| !assignment.is_assigned(slot_id));

    match ordering {
        VariableOrdering::MinimumRemainingValues => unassigned.min_by_key(|&slot_id| {
            (domains.len(slot_id), Reverse(config.degree(slot_id)), slot_id)
        }),
        VariableOrdering::SlotOrder => unassigned.next(),
    }
}

/// Order the options for `slot_id`. With `LeastConstraining`, each option is scored by how many
/// options of unfilled crossing slots it is incompatible with, lowest first; ties keep word list
/// order.
pub fn order_domain_values(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
    ordering: ValueOrdering,
) -> Vec<WordId> {
    let mut options: Vec<WordId> = domains.iter(slot_id).collect();

    if ordering == ValueOrdering::LeastConstraining {
        let words = config.words();
        let unassigned_neighbors: Vec<SlotId> = config
            .neighbors(slot_id)
            .filter(|&neighbor| !assignment.is_assigned(neighbor))
            .collect();

        // `BitSet` iterators under-report their upper size bound; don't `count` them.
        options.sort_by_cached_key(|&word_id| {
            unassigned_neighbors
                .iter()
                .map(|&neighbor| {
                    domains.iter(neighbor).fold(0, |conflicts, other_word_id| {
                        let compatible = config.words_compatible(
                            slot_id,
                            neighbor,
                            &words[word_id],
                            &words[other_word_id],
                        );
                        if compatible {
                            conflicts
                        } else {
                            conflicts + 1
                        }
                    })
                })
                .sum::<usize>()
        });
    }

    options
}

/// Try to extend `assignment` into a complete, consistent fill. On `Complete` the assignment holds
/// the fill; on any other outcome it is exactly as it was passed in.
pub fn backtrack(
    config: &GridConfig,
    domains: &Domains,
    options: &FillOptions,
    assignment: &mut Assignment,
    statistics: &mut Statistics,
) -> SearchOutcome {
    statistics.states += 1;

    if assignment.is_complete(config) {
        return SearchOutcome::Complete;
    }

    if let Some(max_states) = options.max_states {
        if statistics.states > max_states {
            return SearchOutcome::BudgetExhausted;
        }
    }

    let slot_id =
        match select_unassigned_slot(config, domains, assignment, options.variable_ordering) {
            Some(slot_id) => slot_id,
            None => return SearchOutcome::Exhausted,
        };

    let ordered_options =
        order_domain_values(config, domains, assignment, slot_id, options.value_ordering);

    for word_id in ordered_options {
        statistics.words_tested += 1;
        assignment.assign(slot_id, word_id);

        if consistent(config, assignment) {
            match backtrack(config, domains, options, assignment, statistics) {
                SearchOutcome::Complete => return SearchOutcome::Complete,
                SearchOutcome::BudgetExhausted => {
                    assignment.unassign(slot_id);
                    return SearchOutcome::BudgetExhausted;
                }
                SearchOutcome::Exhausted => {}
            }
        }

        assignment.unassign(slot_id);
    }

    statistics.backtracks += 1;
    trace!("No option fits {}, backtracking", config.slot(slot_id));

    SearchOutcome::Exhausted
}

#[cfg(test)]
mod tests {
    use super::{
        backtrack, consistent, order_domain_values, select_unassigned_slot, Assignment, Choice,
        FillOptions, SearchOutcome, Statistics, ValueOrdering, VariableOrdering,
    };
    use crate::domains::{enforce_node_consistency, Domains};
    use crate::grid_config::{
        generate_grid_config, generate_grid_config_from_template_string, Direction, GridConfig,
        GridEntry,
    };
    use crate::word_list::WordList;

    /// A 3-letter across whose last cell starts a 4-letter down.
    fn crossing_config(words: &[&str]) -> GridConfig {
        generate_grid_config(
            WordList::new(words.iter().copied()),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (2, 0), len: 4, dir: Direction::Down },
            ],
        )
        .unwrap()
    }

    /// ___
    /// _#_
    /// ___
    fn ring_config(words: &[&str]) -> GridConfig {
        generate_grid_config_from_template_string(
            WordList::new(words.iter().copied()),
            "
            ___
            _#_
            ___
            ",
        )
        .unwrap()
    }

    fn node_consistent_domains(config: &GridConfig) -> Domains {
        let mut domains = Domains::full(config);
        enforce_node_consistency(config, &mut domains);
        domains
    }

    fn id(config: &GridConfig, word: &str) -> usize {
        config.words().position(word).unwrap()
    }

    #[test]
    fn assignment_tracks_bindings() {
        let mut assignment = Assignment::new(3);
        assert!(assignment.is_empty());

        assert_eq!(assignment.assign(1, 7), None);
        assert_eq!(assignment.assign(1, 8), Some(7));
        assert_eq!(assignment.assign(2, 3), None);
        assert_eq!(assignment.len(), 2);
        assert_eq!(
            assignment.iter().collect::<Vec<_>>(),
            vec![Choice { slot_id: 1, word_id: 8 }, Choice { slot_id: 2, word_id: 3 }]
        );

        assert_eq!(assignment.unassign(1), Some(8));
        assert_eq!(assignment.unassign(1), None);
        assert_eq!(assignment.len(), 1);
        assert_eq!(assignment.get(0), None);
        assert_eq!(assignment.get(2), Some(3));
        assert_eq!(assignment.get(99), None);
    }

    #[test]
    fn consistent_accepts_agreeing_partial_and_complete_assignments() {
        let config = crossing_config(&["CAT", "TIDE", "DOG"]);
        let mut assignment = Assignment::new(2);

        assert!(consistent(&config, &assignment));

        assignment.assign(0, id(&config, "CAT"));
        assert!(consistent(&config, &assignment));
        assert!(!assignment.is_complete(&config));

        assignment.assign(1, id(&config, "TIDE"));
        assert!(consistent(&config, &assignment));
        assert!(assignment.is_complete(&config));
        assert_eq!(
            assignment
                .words(&config)
                .iter()
                .map(|(slot, word)| (slot.id, *word))
                .collect::<Vec<_>>(),
            vec![(0, "CAT"), (1, "TIDE")]
        );
    }

    #[test]
    fn consistent_rejects_each_kind_of_violation() {
        let config = crossing_config(&["CAT", "TIDE", "DOME", "TOE"]);

        // Crossing letters disagree.
        let mut assignment = Assignment::new(2);
        assignment.assign(0, id(&config, "CAT"));
        assignment.assign(1, id(&config, "DOME"));
        assert!(!consistent(&config, &assignment));

        // Wrong length.
        let mut assignment = Assignment::new(2);
        assignment.assign(1, id(&config, "TOE"));
        assert!(!consistent(&config, &assignment));

        // The same word twice.
        let config = generate_grid_config(
            WordList::new(["CAT"]),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (0, 2), len: 3, dir: Direction::Across },
            ],
        )
        .unwrap();
        let mut assignment = Assignment::new(2);
        assignment.assign(0, 0);
        assignment.assign(1, 0);
        assert!(!consistent(&config, &assignment));
    }

    #[test]
    fn minimum_remaining_values_breaks_ties_by_degree() {
        // Slot 0: 3 across (1 crossing), slot 1: 5 across (2 crossings), slot 2: 3 down
        // (1 crossing), slot 3: 4 down (2 crossings).
        let config = generate_grid_config_from_template_string(
            WordList::new(["AAA", "BBB", "CCCCC", "DDDDD", "EEEE", "FFFF", "GGGG"]),
            "
            #___#
            _##_#
            _##_#
            _____
            ",
        )
        .unwrap();
        let domains = node_consistent_domains(&config);
        let mut assignment = Assignment::new(config.slot_count());

        let mrv = VariableOrdering::MinimumRemainingValues;
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment, mrv), Some(1));

        assignment.assign(1, id(&config, "CCCCC"));
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment, mrv), Some(0));

        assignment.assign(0, id(&config, "AAA"));
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment, mrv), Some(2));

        assignment.assign(2, id(&config, "BBB"));
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment, mrv), Some(3));

        assignment.assign(3, id(&config, "EEEE"));
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment, mrv), None);
    }

    #[test]
    fn slot_order_picks_the_lowest_unfilled_id() {
        let config = ring_config(&["ABC"]);
        let domains = node_consistent_domains(&config);
        let mut assignment = Assignment::new(config.slot_count());
        assignment.assign(0, 0);

        assert_eq!(
            select_unassigned_slot(&config, &domains, &assignment, VariableOrdering::SlotOrder),
            Some(1)
        );
    }

    #[test]
    fn least_constraining_value_comes_first() {
        let config = crossing_config(&["DOG", "CAT", "TIDE", "TAME", "GATE"]);
        let domains = node_consistent_domains(&config);
        let mut assignment = Assignment::new(2);

        // DOG rules out TIDE and TAME; CAT only rules out GATE.
        assert_eq!(
            order_domain_values(
                &config,
                &domains,
                &assignment,
                0,
                ValueOrdering::LeastConstraining,
            ),
            vec![id(&config, "CAT"), id(&config, "DOG")]
        );
        assert_eq!(
            order_domain_values(&config, &domains, &assignment, 0, ValueOrdering::DomainOrder),
            vec![id(&config, "DOG"), id(&config, "CAT")]
        );

        // Filled neighbors don't count, so every option ties and word list order is kept.
        assignment.assign(1, id(&config, "GATE"));
        assert_eq!(
            order_domain_values(
                &config,
                &domains,
                &assignment,
                0,
                ValueOrdering::LeastConstraining,
            ),
            vec![id(&config, "DOG"), id(&config, "CAT")]
        );
    }

    #[test]
    fn least_constraining_value_handles_domains_spanning_several_blocks() {
        // Forty 4-letter words, half starting with T and half with G, plus TIDE.
        let mut words: Vec<String> = vec!["CAT".into(), "DOG".into(), "TIDE".into()];
        for idx in 0..40u8 {
            let first = if idx % 2 == 0 { 'T' } else { 'G' };
            let (second, third) = ((b'A' + idx / 26) as char, (b'A' + idx % 26) as char);
            words.push(format!("{first}{second}{third}E"));
        }
        let config = generate_grid_config(
            WordList::new(words),
            &[
                GridEntry { loc: (0, 0), len: 3, dir: Direction::Across },
                GridEntry { loc: (2, 0), len: 4, dir: Direction::Down },
            ],
        )
        .unwrap();
        let domains = node_consistent_domains(&config);
        let assignment = Assignment::new(2);
        assert_eq!(domains.len(1), 41);

        // DOG rules out all 21 T words; CAT only rules out the 20 G words.
        assert_eq!(
            order_domain_values(
                &config,
                &domains,
                &assignment,
                0,
                ValueOrdering::LeastConstraining,
            ),
            vec![id(&config, "CAT"), id(&config, "DOG")]
        );
    }

    #[test]
    fn backtrack_finds_a_complete_consistent_fill() {
        let config = ring_config(&["ABC", "CDE", "EFG", "XYZ", "AXE", "BYE", "CEG", "GEE"]);
        let domains = node_consistent_domains(&config);
        let mut assignment = Assignment::new(config.slot_count());
        let mut statistics = Statistics::default();

        let outcome = backtrack(
            &config,
            &domains,
            &FillOptions::default(),
            &mut assignment,
            &mut statistics,
        );

        assert_eq!(outcome, SearchOutcome::Complete);
        assert!(assignment.is_complete(&config));
        assert!(consistent(&config, &assignment));
        assert!(statistics.states >= 5);
        assert!(statistics.words_tested >= 4);
    }

    #[test]
    fn backtrack_leaves_the_assignment_untouched_when_exhausted() {
        // Every 3-letter word would have to be reused in the ring.
        let config = ring_config(&["AAA"]);
        let domains = node_consistent_domains(&config);
        let mut assignment = Assignment::new(config.slot_count());
        let mut statistics = Statistics::default();

        let outcome = backtrack(
            &config,
            &domains,
            &FillOptions::default(),
            &mut assignment,
            &mut statistics,
        );

        assert_eq!(outcome, SearchOutcome::Exhausted);
        assert!(assignment.is_empty());
        assert!(statistics.backtracks >= 1);
    }

    #[test]
    fn backtrack_respects_the_state_budget() {
        let config = ring_config(&["ABC", "CDE", "EFG", "XYZ", "AXE", "BYE", "CEG", "GEE"]);
        let domains = node_consistent_domains(&config);
        let mut assignment = Assignment::new(config.slot_count());
        let mut statistics = Statistics::default();
        let options = FillOptions {
            max_states: Some(2),
            ..FillOptions::default()
        };

        let outcome = backtrack(&config, &domains, &options, &mut assignment, &mut statistics);

        assert_eq!(outcome, SearchOutcome::BudgetExhausted);
        assert!(assignment.is_empty());
        assert_eq!(statistics.states, 3);
    }
}
