use std::collections::HashMap;

use crossfill::backtracking_search::consistent;
use crossfill::grid_config::GridCoord;
use crossfill::{
    find_fill, generate_grid_config_from_template_string, FillFailure, FillOptions, GridConfig,
    ValueOrdering, VariableOrdering, WordList,
};

const SQUARE: &str = "
    __
    __
";

const RING: &str = "
    ___
    _#_
    ___
";

const CORNER: &str = "
    ___
    _##
    _##
";

/// Every string of `len` letters drawn from `alphabet`, in lexicographic order.
fn all_strings(alphabet: &[char], len: usize) -> Vec<String> {
    if len == 0 {
        return vec![String::new()];
    }

    all_strings(alphabet, len - 1)
        .into_iter()
        .flat_map(|prefix| alphabet.iter().map(move |&c| format!("{prefix}{c}")))
        .collect()
}

/// The subset of `words` selected by the bits of `mask`.
fn subset(words: &[String], mask: usize) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .filter(|&(idx, _)| mask & (1usize << idx) != 0)
        .map(|(_, word)| word.clone())
        .collect()
}

/// Does any fill exist? Checked by trying every word in every slot, with letters compared cell by
/// cell rather than through the crate's overlap tables.
fn brute_force_fill_exists(config: &GridConfig) -> bool {
    fn extend(
        config: &GridConfig,
        slot_id: usize,
        used: &mut [bool],
        letters: &mut HashMap<GridCoord, Vec<char>>,
    ) -> bool {
        if slot_id == config.slot_count() {
            return true;
        }
        let slot = config.slot(slot_id);

        for (word_id, word) in config.words().iter() {
            if used[word_id] || word.len() != slot.length {
                continue;
            }

            let fits = slot.cell_coords().zip(word.string.chars()).all(|(loc, c)| {
                match letters.get(&loc).and_then(|stack| stack.last()) {
                    Some(&placed) => placed == c,
                    None => true,
                }
            });
            if !fits {
                continue;
            }

            used[word_id] = true;
            for (loc, c) in slot.cell_coords().zip(word.string.chars()) {
                letters.entry(loc).or_default().push(c);
            }

            let found = extend(config, slot_id + 1, used, letters);

            for loc in slot.cell_coords() {
                if let Some(stack) = letters.get_mut(&loc) {
                    stack.pop();
                }
            }
            used[word_id] = false;

            if found {
                return true;
            }
        }

        false
    }

    let mut used = vec![false; config.words().len()];
    extend(config, 0, &mut used, &mut HashMap::new())
}

fn all_option_combinations() -> Vec<FillOptions> {
    let mut result = vec![];
    let variable_orderings =
        [VariableOrdering::MinimumRemainingValues, VariableOrdering::SlotOrder];
    for variable_ordering in variable_orderings {
        for value_ordering in [ValueOrdering::LeastConstraining, ValueOrdering::DomainOrder] {
            result.push(FillOptions {
                variable_ordering,
                value_ordering,
                max_states: None,
            });
        }
    }
    result
}

/// Check `find_fill` against the brute-force search under every ordering.
fn check_against_brute_force(template: &str, words: Vec<String>) {
    let config = generate_grid_config_from_template_string(WordList::new(words.clone()), template)
        .expect("template should have slots");
    let expected = brute_force_fill_exists(&config);

    for options in all_option_combinations() {
        match find_fill(&config, &options) {
            Ok(result) => {
                assert!(expected, "found a fill the brute force missed for {:?}", words);
                assert!(result.assignment.is_complete(&config));
                assert!(consistent(&config, &result.assignment));
            }
            Err(failure) => {
                assert!(
                    !expected,
                    "missed a fill for {:?} with {:?}: {}",
                    words, options, failure
                );
                assert!(failure.is_unsatisfiable());
            }
        }
    }
}

#[test]
fn square_grids_match_brute_force() {
    let words = all_strings(&['A', 'B'], 2);

    for mask in 0..(1usize << words.len()) {
        check_against_brute_force(SQUARE, subset(&words, mask));
    }
}

#[test]
fn ring_grids_match_brute_force() {
    let words = all_strings(&['A', 'B'], 3);

    for mask in 0..(1usize << words.len()) {
        check_against_brute_force(RING, subset(&words, mask));
    }
}

#[test]
fn corner_grids_match_brute_force() {
    let words = all_strings(&['A', 'B', 'C'], 3);

    // Every window of five consecutive words, so the word list isn't just a prefix.
    for start in 0..words.len() - 5 {
        check_against_brute_force(CORNER, words[start..start + 5].to_vec());
    }
}

#[test]
fn a_solvable_ring_is_always_solved() {
    let words = ["ABC", "CDE", "EFG", "XYZ", "AXE", "BYE", "CEG", "GEE"]
        .iter()
        .map(|word| word.to_string())
        .collect();

    check_against_brute_force(RING, words);
}

#[test]
fn unsolvable_grid_reports_no_solution_under_every_ordering() {
    let config = generate_grid_config_from_template_string(WordList::new(["AAA"]), RING).unwrap();

    for options in all_option_combinations() {
        assert_eq!(find_fill(&config, &options).unwrap_err(), FillFailure::HardFailure);
    }
}
