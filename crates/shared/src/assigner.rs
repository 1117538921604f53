//! Greedy page balancing of case digests across groups.
//!
//! Cases are placed longest-first onto whichever group currently carries the
//! fewest pages (the LPT heuristic). With no initial load the largest group
//! is within 4/3 - 1/(3g) of the optimum for `g` groups. Groups that start
//! with an initial load are never rebalanced, so that bound does not carry
//! over to seeded runs.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InvalidItemError};

/// A case to be digested, weighted by its page count.
///
/// Names are labels only; two cases may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub weight: i64,
}

impl Item {
    pub fn new(name: impl Into<String>, weight: i64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// One group of the final assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// 1-based group number.
    pub id: usize,
    pub initial_load: i64,
    pub total: i64,
    /// Cases in the order they were assigned.
    pub items: Vec<Item>,
}

/// Outcome of one `assign_cases` call, ordered by group id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    groups: Vec<Group>,
}

impl AssignmentResult {
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: usize) -> Option<&Group> {
        id.checked_sub(1).and_then(|idx| self.groups.get(idx))
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    /// Sum of every group's final total.
    pub fn total_weight(&self) -> i64 {
        self.groups.iter().map(|g| g.total).sum()
    }

    /// The heaviest group's total.
    pub fn makespan(&self) -> i64 {
        self.groups.iter().map(|g| g.total).max().unwrap_or(0)
    }

    /// Final totals in group order, usable as the initial loads of a later run.
    pub fn carry_forward_loads(&self) -> Vec<i64> {
        self.groups.iter().map(|g| g.total).collect()
    }

    /// Check that ids run 1..=n and every total equals its initial load plus
    /// its cases. Totals that cannot be summed without overflow are inconsistent.
    pub fn is_consistent(&self) -> bool {
        let groups_add_up = self.groups.iter().enumerate().all(|(idx, g)| {
            let summed = g.items.iter().try_fold(g.initial_load, |acc, item| {
                if item.weight < 0 {
                    None
                } else {
                    acc.checked_add(item.weight)
                }
            });
            g.id == idx + 1 && g.initial_load >= 0 && summed == Some(g.total)
        });

        let grand_total = self
            .groups
            .iter()
            .try_fold(0i64, |acc, g| acc.checked_add(g.total));

        !self.groups.is_empty() && groups_add_up && grand_total.is_some()
    }
}

/// Distributes cases across a fixed number of groups.
///
/// Holds only its construction parameters, so one instance can serve any
/// number of independent `assign_cases` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assigner {
    initial_loads: Vec<i64>,
}

impl Assigner {
    pub fn new(num_groups: usize, initial_loads: Option<Vec<i64>>) -> Result<Self, ConfigError> {
        if num_groups < 1 {
            return Err(ConfigError::NoGroups);
        }

        let initial_loads = match initial_loads {
            Some(loads) => {
                if loads.len() != num_groups {
                    return Err(ConfigError::LoadCountMismatch {
                        expected: num_groups,
                        actual: loads.len(),
                    });
                }
                if let Some((idx, &load)) = loads.iter().enumerate().find(|&(_, &l)| l < 0) {
                    return Err(ConfigError::NegativeLoad {
                        group: idx + 1,
                        load,
                    });
                }
                if loads.iter().try_fold(0i64, |acc, &l| acc.checked_add(l)).is_none() {
                    return Err(ConfigError::LoadTotalOverflow);
                }
                loads
            }
            None => vec![0; num_groups],
        };

        Ok(Self { initial_loads })
    }

    pub fn num_groups(&self) -> usize {
        self.initial_loads.len()
    }

    pub fn initial_loads(&self) -> &[i64] {
        &self.initial_loads
    }

    pub fn assign_cases(&self, items: &[Item]) -> Result<AssignmentResult, InvalidItemError> {
        self.validate(items)?;

        // Stable, so equal page counts keep their input order
        let mut order: Vec<&Item> = items.iter().collect();
        order.sort_by(|a, b| b.weight.cmp(&a.weight));

        let mut groups: Vec<Group> = self
            .initial_loads
            .iter()
            .enumerate()
            .map(|(idx, &load)| Group {
                id: idx + 1,
                initial_load: load,
                total: load,
                items: Vec::new(),
            })
            .collect();

        // Min-heap on (total, id): ties go to the lowest group id
        let mut heap: BinaryHeap<Reverse<(i64, usize)>> =
            groups.iter().map(|g| Reverse((g.total, g.id))).collect();

        for item in order {
            // `new` rejects zero groups, so there is always a lightest group
            let Some(mut lightest) = heap.peek_mut() else {
                unreachable!("assigner has at least one group");
            };
            let Reverse((total, id)) = *lightest;
            let group = &mut groups[id - 1];
            group.items.push(item.clone());
            // Cannot overflow: `validate` bounded the sum of every load and case
            group.total = total + item.weight;
            tracing::debug!(
                case = %item.name,
                pages = item.weight,
                group = id,
                total = group.total,
                "assigned case"
            );
            *lightest = Reverse((group.total, id));
        }

        let result = AssignmentResult { groups };
        tracing::info!(
            cases = items.len(),
            groups = result.num_groups(),
            makespan = result.makespan(),
            "assignment complete"
        );

        Ok(result)
    }

    /// Reject the whole batch before anything is placed: every page count must
    /// be non-negative and the pages of all groups together must stay countable.
    fn validate(&self, items: &[Item]) -> Result<(), InvalidItemError> {
        if let Some((position, item)) = items.iter().enumerate().find(|(_, i)| i.weight < 0) {
            return Err(InvalidItemError::NegativeWeight {
                position,
                name: item.name.clone(),
                weight: item.weight,
            });
        }

        // `new` already checked that the loads alone fit
        let mut running: i64 = self.initial_loads.iter().sum();
        for (position, item) in items.iter().enumerate() {
            running = running.checked_add(item.weight).ok_or_else(|| {
                InvalidItemError::TotalOverflow {
                    position,
                    name: item.name.clone(),
                }
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(pairs: &[(&str, i64)]) -> Vec<Item> {
        pairs.iter().map(|&(n, w)| Item::new(n, w)).collect()
    }

    fn names(group: &Group) -> Vec<&str> {
        group.items.iter().map(|i| i.name.as_str()).collect()
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_new_rejects_zero_groups() {
        assert_eq!(Assigner::new(0, None), Err(ConfigError::NoGroups));
    }

    #[test]
    fn test_new_rejects_load_count_mismatch() {
        assert_eq!(
            Assigner::new(3, Some(vec![1, 2])),
            Err(ConfigError::LoadCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_new_rejects_negative_load() {
        assert_eq!(
            Assigner::new(2, Some(vec![0, -4])),
            Err(ConfigError::NegativeLoad { group: 2, load: -4 })
        );
    }

    #[test]
    fn test_new_defaults_to_zero_loads() {
        let assigner = Assigner::new(4, None).unwrap();
        assert_eq!(assigner.num_groups(), 4);
        assert_eq!(assigner.initial_loads(), &[0, 0, 0, 0]);
    }

    // ==================== Assignment Tests ====================

    #[test]
    fn test_equal_cases_spread_one_per_group() {
        let assigner = Assigner::new(3, Some(vec![0, 0, 0])).unwrap();
        let result = assigner
            .assign_cases(&items(&[("A", 10), ("B", 10), ("C", 10)]))
            .unwrap();

        for group in result.groups() {
            assert_eq!(group.items.len(), 1);
            assert_eq!(group.total, 10);
        }
        assert_eq!(names(result.group(1).unwrap()), vec!["A"]);
        assert_eq!(names(result.group(2).unwrap()), vec!["B"]);
        assert_eq!(names(result.group(3).unwrap()), vec!["C"]);
    }

    #[test]
    fn test_initial_loads_steer_placement() {
        let assigner = Assigner::new(2, Some(vec![5, 0])).unwrap();
        let result = assigner
            .assign_cases(&items(&[("X", 8), ("Y", 2)]))
            .unwrap();

        let g1 = result.group(1).unwrap();
        let g2 = result.group(2).unwrap();
        assert_eq!(g1.items, vec![Item::new("Y", 2)]);
        assert_eq!(g1.total, 7);
        assert_eq!(g2.items, vec![Item::new("X", 8)]);
        assert_eq!(g2.total, 8);
    }

    #[test]
    fn test_empty_batch_keeps_initial_loads() {
        let assigner = Assigner::new(3, Some(vec![4, 0, 9])).unwrap();
        let result = assigner.assign_cases(&[]).unwrap();

        assert_eq!(result.num_groups(), 3);
        assert_eq!(result.carry_forward_loads(), vec![4, 0, 9]);
        assert!(result.groups().iter().all(|g| g.items.is_empty()));
    }

    #[test]
    fn test_single_group_takes_everything() {
        let assigner = Assigner::new(1, Some(vec![3])).unwrap();
        let result = assigner
            .assign_cases(&items(&[("A", 1), ("B", 20), ("C", 7)]))
            .unwrap();

        let g = result.group(1).unwrap();
        assert_eq!(g.total, 31);
        assert_eq!(names(g), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_negative_weight_rejects_batch() {
        let assigner = Assigner::new(2, None).unwrap();
        let err = assigner
            .assign_cases(&items(&[("Good", 5), ("Bad", -1), ("Worse", -2)]))
            .unwrap_err();

        assert_eq!(
            err,
            InvalidItemError::NegativeWeight {
                position: 1,
                name: "Bad".to_string(),
                weight: -1
            }
        );
    }

    #[test]
    fn test_huge_page_counts_are_rejected_not_wrapped() {
        let assigner = Assigner::new(1, None).unwrap();
        let err = assigner
            .assign_cases(&items(&[("a", i64::MAX), ("b", 1)]))
            .unwrap_err();

        assert_eq!(
            err,
            InvalidItemError::TotalOverflow {
                position: 1,
                name: "b".to_string()
            }
        );
    }

    #[test]
    fn test_huge_initial_load_plus_case_is_rejected() {
        let assigner = Assigner::new(1, Some(vec![i64::MAX])).unwrap();
        let err = assigner.assign_cases(&items(&[("a", 1)])).unwrap_err();

        assert_eq!(
            err,
            InvalidItemError::TotalOverflow {
                position: 0,
                name: "a".to_string()
            }
        );
        // Nothing to add is still fine
        assert_eq!(
            assigner.assign_cases(&[]).unwrap().carry_forward_loads(),
            vec![i64::MAX]
        );
    }

    #[test]
    fn test_largest_countable_total_is_accepted() {
        let assigner = Assigner::new(2, None).unwrap();
        let result = assigner
            .assign_cases(&items(&[("a", i64::MAX - 1), ("b", 1)]))
            .unwrap();

        assert_eq!(result.total_weight(), i64::MAX);
        assert!(result.is_consistent());
    }

    #[test]
    fn test_new_rejects_loads_that_overflow() {
        assert_eq!(
            Assigner::new(2, Some(vec![i64::MAX, 1])),
            Err(ConfigError::LoadTotalOverflow)
        );
    }

    #[test]
    fn test_tie_goes_to_lower_group_id() {
        let assigner = Assigner::new(3, Some(vec![2, 1, 1])).unwrap();
        let result = assigner.assign_cases(&items(&[("Only", 4)])).unwrap();

        assert_eq!(names(result.group(2).unwrap()), vec!["Only"]);
        assert!(result.group(1).unwrap().items.is_empty());
        assert!(result.group(3).unwrap().items.is_empty());
    }

    #[test]
    fn test_equal_weights_keep_input_order() {
        let assigner = Assigner::new(1, None).unwrap();
        let result = assigner
            .assign_cases(&items(&[("first", 5), ("big", 9), ("second", 5), ("third", 5)]))
            .unwrap();

        assert_eq!(
            names(result.group(1).unwrap()),
            vec!["big", "first", "second", "third"]
        );
    }

    #[test]
    fn test_zero_weight_cases_are_placed() {
        let assigner = Assigner::new(2, None).unwrap();
        let result = assigner
            .assign_cases(&items(&[("Empty", 0), ("Short", 1)]))
            .unwrap();

        assert_eq!(names(result.group(1).unwrap()), vec!["Short"]);
        assert_eq!(names(result.group(2).unwrap()), vec!["Empty"]);
        assert_eq!(result.item_count(), 2);
    }

    #[test]
    fn test_duplicate_names_are_both_kept() {
        let assigner = Assigner::new(2, None).unwrap();
        let result = assigner
            .assign_cases(&items(&[("People v. Doe", 3), ("People v. Doe", 3)]))
            .unwrap();

        assert_eq!(result.item_count(), 2);
        assert_eq!(result.carry_forward_loads(), vec![3, 3]);
    }

    #[test]
    fn test_textbook_lpt_schedule() {
        // Optimum is 6 pages each (3+3 | 2+2+2); LPT lands one group on 7
        let assigner = Assigner::new(2, None).unwrap();
        let result = assigner
            .assign_cases(&items(&[("a", 3), ("b", 3), ("c", 2), ("d", 2), ("e", 2)]))
            .unwrap();

        assert_eq!(names(result.group(1).unwrap()), vec!["a", "c", "e"]);
        assert_eq!(names(result.group(2).unwrap()), vec!["b", "d"]);
        assert_eq!(result.makespan(), 7);
    }

    // ==================== Invariant Tests ====================

    fn sample_batches() -> Vec<(usize, Option<Vec<i64>>, Vec<Item>)> {
        vec![
            (6, None, items(&[("A", 12), ("B", 40), ("C", 7), ("D", 7), ("E", 33), ("F", 1), ("G", 19), ("H", 25)])),
            (3, Some(vec![10, 0, 50]), items(&[("A", 5), ("B", 5), ("C", 60), ("D", 2)])),
            (4, Some(vec![1, 1, 1, 1]), items(&[("A", 0), ("A", 0), ("B", 100)])),
            (5, None, (0..40).map(|n| Item::new(format!("Case {n}"), (n * 37 % 23) as i64)).collect()),
        ]
    }

    #[test]
    fn test_conservation_of_pages() {
        for (n, loads, batch) in sample_batches() {
            let assigner = Assigner::new(n, loads.clone()).unwrap();
            let result = assigner.assign_cases(&batch).unwrap();

            let loads_sum: i64 = loads.unwrap_or_default().iter().sum();
            let items_sum: i64 = batch.iter().map(|i| i.weight).sum();
            assert_eq!(result.total_weight(), loads_sum + items_sum);
            assert!(result.is_consistent());
        }
    }

    #[test]
    fn test_every_case_appears_exactly_once() {
        for (n, loads, batch) in sample_batches() {
            let result = Assigner::new(n, loads).unwrap().assign_cases(&batch).unwrap();

            let mut placed: Vec<Item> = result
                .groups()
                .iter()
                .flat_map(|g| g.items.iter().cloned())
                .collect();
            let mut expected = batch.clone();
            placed.sort_by(|a, b| (&a.name, a.weight).cmp(&(&b.name, b.weight)));
            expected.sort_by(|a, b| (&a.name, a.weight).cmp(&(&b.name, b.weight)));
            assert_eq!(placed, expected);
        }
    }

    #[test]
    fn test_identical_assigners_agree() {
        for (n, loads, batch) in sample_batches() {
            let first = Assigner::new(n, loads.clone()).unwrap();
            let second = Assigner::new(n, loads).unwrap();
            assert_eq!(
                first.assign_cases(&batch).unwrap(),
                second.assign_cases(&batch).unwrap()
            );
            // Repeated calls on one instance carry nothing over
            assert_eq!(
                first.assign_cases(&batch).unwrap(),
                first.assign_cases(&batch).unwrap()
            );
        }
    }

    #[test]
    fn test_input_is_not_modified() {
        let batch = items(&[("small", 1), ("large", 9)]);
        let before = batch.clone();
        Assigner::new(2, None).unwrap().assign_cases(&batch).unwrap();
        assert_eq!(batch, before);
    }

    #[test]
    fn test_is_consistent_detects_tampering() {
        let mut result = Assigner::new(2, None)
            .unwrap()
            .assign_cases(&items(&[("A", 4)]))
            .unwrap();
        assert!(result.is_consistent());

        result.groups[0].total += 1;
        assert!(!result.is_consistent());
    }

    #[test]
    fn test_is_consistent_rejects_overflowing_totals() {
        let big = |id| Group {
            id,
            initial_load: i64::MAX,
            total: i64::MAX,
            items: Vec::new(),
        };

        // Each group adds up on its own but the groups together do not
        let result = AssignmentResult {
            groups: vec![big(1), big(2)],
        };
        assert!(!result.is_consistent());

        // A case on top of a full load cannot be summed at all
        let mut group = big(1);
        group.items.push(Item::new("extra", 1));
        let result = AssignmentResult {
            groups: vec![group],
        };
        assert!(!result.is_consistent());
    }
}
