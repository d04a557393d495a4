use instant::Instant;
use log::{debug, info};
use thiserror::Error;

use crate::arc_consistency::{self, ArcConsistencyFailure, ArcConsistencyResult, ConstraintArc};
use crate::backtracking_search::{self, Assignment, FillOptions, SearchOutcome, Statistics};
use crate::domains::{self, Domains};
use crate::grid_config::GridConfig;
use crate::SlotId;

/// A struct representing the results of a fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Why a fill wasn't found. The first two variants both mean the grid has no fill with this word
/// list; they differ only in which stage noticed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    /// Constraint propagation left a slot without options, so search never started.
    #[error("slot {slot_id} has no options left after constraint propagation")]
    DomainWipeout { slot_id: SlotId },
    /// Search tried every option without finding a fill.
    #[error("no fill exists for this grid and word list")]
    HardFailure,
    #[error("gave up after visiting {states} search states")]
    ExhaustedStateBudget { states: u64 },
}

impl FillFailure {
    /// Is this a proof that no fill exists, as opposed to giving up early?
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, FillFailure::DomainWipeout { .. } | FillFailure::HardFailure)
    }
}

/// Solver state for a single fill: the grid and the domain store it prunes. Each solver starts
/// from a fresh copy of the word list for every slot.
#[derive(Debug)]
pub struct CrosswordSolver<'a> {
    config: &'a GridConfig,
    domains: Domains,
    options: FillOptions,
}

impl<'a> CrosswordSolver<'a> {
    pub fn new(config: &'a GridConfig, options: FillOptions) -> CrosswordSolver<'a> {
        CrosswordSolver {
            config,
            domains: Domains::full(config),
            options,
        }
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Remove options of the wrong length from every slot.
    pub fn enforce_node_consistency(&mut self) -> usize {
        domains::enforce_node_consistency(self.config, &mut self.domains)
    }

    /// Run AC-3, starting from `arcs` or from every arc in the grid.
    pub fn enforce_arc_consistency(
        &mut self,
        arcs: Option<&[ConstraintArc]>,
    ) -> ArcConsistencyResult {
        arc_consistency::enforce_arc_consistency(self.config, &mut self.domains, arcs)
    }

    /// Search for a completion of `assignment` over the current domains.
    pub fn backtrack(
        &self,
        assignment: &mut Assignment,
        statistics: &mut Statistics,
    ) -> SearchOutcome {
        backtracking_search::backtrack(
            self.config,
            &self.domains,
            &self.options,
            assignment,
            statistics,
        )
    }

    /// Node consistency, then arc consistency, then backtracking search from an empty assignment.
    pub fn solve(mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();

        self.enforce_node_consistency();

        // A slot with no word of its length is already a wipeout, even if nothing crosses it.
        if let Some(slot) = self
            .config
            .slots()
            .iter()
            .find(|slot| self.domains.is_empty(slot.id))
        {
            debug!("No words fit {}", slot);
            return Err(FillFailure::DomainWipeout { slot_id: slot.id });
        }

        if let Err(ArcConsistencyFailure { slot_id }) = self.enforce_arc_consistency(None) {
            return Err(FillFailure::DomainWipeout { slot_id });
        }

        let mut assignment = Assignment::new(self.config.slot_count());
        let mut statistics = Statistics::default();
        let outcome = self.backtrack(&mut assignment, &mut statistics);
        statistics.duration = start.elapsed();

        match outcome {
            SearchOutcome::Complete => {
                info!(
                    "Filled {} slots after {} states and {} backtracks in {:?}",
                    self.config.slot_count(),
                    statistics.states,
                    statistics.backtracks,
                    statistics.duration,
                );
                Ok(FillSuccess { statistics, assignment })
            }
            SearchOutcome::Exhausted => {
                info!(
                    "Search exhausted after {} states in {:?}",
                    statistics.states, statistics.duration,
                );
                Err(FillFailure::HardFailure)
            }
            SearchOutcome::BudgetExhausted => Err(FillFailure::ExhaustedStateBudget {
                states: statistics.states,
            }),
        }
    }
}

/// Search for a valid fill for the given grid.
pub fn find_fill(config: &GridConfig, options: &FillOptions) -> Result<FillSuccess, FillFailure> {
    CrosswordSolver::new(config, *options).solve()
}
