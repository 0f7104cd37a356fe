//! Move resolution.
//!
//! The resolver turns comparisons into moves under a strict one-to-one rule:
//! a resource planned for deletion is moved to a resource planned for
//! creation if and only if the two match each other and only each other.
//! When several resources could plausibly be the same object, the resolver
//! declines to guess and leaves them all out of the move set; the summary
//! layer reports the ambiguity to the operator instead.

use std::collections::HashMap;

use crate::engine::compare::Comparison;

/// A resolved decision to move a resource from one address to another,
/// possibly across modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    /// The module the resource is being moved from.
    pub source_module: String,

    /// The module the resource is being moved to. Equal to `source_module`
    /// when the resource moves within the same module.
    pub destination_module: String,

    /// The resource's address before the move.
    pub source_address: String,

    /// The resource's address after the move.
    pub destination_address: String,
}

impl Move {
    /// Returns true if the move stays within a single module's state.
    #[must_use]
    pub fn is_within_module(&self) -> bool {
        self.source_module == self.destination_module
    }
}

/// Applies the one-to-one safety rule over all comparisons and returns the
/// authoritative move set.
///
/// A comparison becomes a move only when it is a match, its create-side
/// resource matches no other delete-side resource, and its delete-side
/// resource matches no other create-side resource. The result is sorted so
/// that identical inputs always yield identically ordered moves.
#[must_use]
pub fn determine_moves(comparisons: &[Comparison]) -> Vec<Move> {
    let mut match_count_by_creation: HashMap<String, usize> = HashMap::new();
    let mut match_count_by_deletion: HashMap<String, usize> = HashMap::new();
    for comparison in comparisons {
        if comparison.is_match() {
            *match_count_by_creation
                .entry(comparison.planned_for_creation.id())
                .or_default() += 1;
            *match_count_by_deletion
                .entry(comparison.planned_for_deletion.id())
                .or_default() += 1;
        }
    }

    let mut moves = Vec::new();

    for comparison in comparisons {
        if !comparison.is_match() {
            continue;
        }

        if match_count_by_creation[&comparison.planned_for_creation.id()] != 1 {
            continue;
        }

        if match_count_by_deletion[&comparison.planned_for_deletion.id()] != 1 {
            continue;
        }

        moves.push(Move {
            source_module: comparison.planned_for_deletion.module_id.clone(),
            destination_module: comparison.planned_for_creation.module_id.clone(),
            source_address: comparison.planned_for_deletion.address.clone(),
            destination_address: comparison.planned_for_creation.address.clone(),
        });
    }

    moves.sort_by(|a, b| {
        (
            &a.source_module,
            &a.destination_module,
            &a.source_address,
            &a.destination_address,
        )
            .cmp(&(
                &b.source_module,
                &b.destination_module,
                &b.source_address,
                &b.destination_address,
            ))
    });

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::flatten::Attributes;
    use crate::engine::resource::Resource;

    fn resource(module_id: &str, address: &str) -> Resource {
        Resource {
            module_id: module_id.to_owned(),
            resource_type: String::from("pet"),
            address: address.to_owned(),
            attributes: Attributes::new(),
        }
    }

    fn comparison(create: Resource, delete: Resource, mismatching: &[&str]) -> Comparison {
        Comparison {
            planned_for_creation: create,
            planned_for_deletion: delete,
            matching: vec![],
            mismatching: mismatching.iter().map(|s| (*s).to_owned()).collect(),
            ignored: vec![],
        }
    }

    #[test]
    fn test_unique_matches_become_moves() {
        let comparisons = vec![
            comparison(resource(".", "pet.new_a"), resource(".", "pet.old_a"), &[]),
            comparison(resource(".", "pet.new_a"), resource(".", "pet.old_b"), &["name"]),
            comparison(resource(".", "pet.new_b"), resource(".", "pet.old_a"), &["name"]),
            comparison(resource(".", "pet.new_b"), resource(".", "pet.old_b"), &[]),
        ];

        let moves = determine_moves(&comparisons);

        assert_eq!(
            moves,
            vec![
                Move {
                    source_module: String::from("."),
                    destination_module: String::from("."),
                    source_address: String::from("pet.old_a"),
                    destination_address: String::from("pet.new_a"),
                },
                Move {
                    source_module: String::from("."),
                    destination_module: String::from("."),
                    source_address: String::from("pet.old_b"),
                    destination_address: String::from("pet.new_b"),
                },
            ]
        );
    }

    #[test]
    fn test_ambiguous_deletion_yields_no_moves() {
        // Two identical creations both match the same single deletion. None
        // of the three resources may move.
        let comparisons = vec![
            comparison(resource(".", "pet.new_a"), resource(".", "pet.old"), &[]),
            comparison(resource(".", "pet.new_b"), resource(".", "pet.old"), &[]),
        ];

        let moves = determine_moves(&comparisons);

        assert!(moves.is_empty());
    }

    #[test]
    fn test_ambiguous_creation_yields_no_moves() {
        let comparisons = vec![
            comparison(resource(".", "pet.new"), resource(".", "pet.old_a"), &[]),
            comparison(resource(".", "pet.new"), resource(".", "pet.old_b"), &[]),
        ];

        let moves = determine_moves(&comparisons);

        assert!(moves.is_empty());
    }

    #[test]
    fn test_cross_module_matches_move_between_modules() {
        let comparisons = vec![comparison(
            resource("module-b", "pet.renamed"),
            resource("module-a", "pet.original"),
            &[],
        )];

        let moves = determine_moves(&comparisons);

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].source_module, "module-a");
        assert_eq!(moves[0].destination_module, "module-b");
        assert!(!moves[0].is_within_module());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        // Comparisons arrive sorted by the matcher; the resolver's output
        // order must not depend on anything else.
        let comparisons = vec![
            comparison(resource("b", "pet.y"), resource("a", "pet.x"), &[]),
            comparison(resource("a", "pet.w"), resource("a", "pet.v"), &[]),
        ];

        let first = determine_moves(&comparisons);
        let second = determine_moves(&comparisons);

        assert_eq!(first, second);
        assert_eq!(first[0].source_module, "a");
        assert_eq!(first[0].destination_module, "a");
    }

    #[test]
    fn test_same_address_resources_in_two_modules_do_not_collide() {
        // The uniqueness rule counts by (module, address), not address alone.
        let comparisons = vec![
            comparison(resource("module-a", "pet.same"), resource("module-a", "pet.old"), &[]),
            comparison(resource("module-b", "pet.same"), resource("module-b", "pet.old"), &[]),
        ];

        let moves = determine_moves(&comparisons);

        assert_eq!(moves.len(), 2);
    }
}
