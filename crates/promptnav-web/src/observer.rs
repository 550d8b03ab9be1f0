#![forbid(unsafe_code)]

//! Conversion of DOM `MutationRecord`s into core records.

use promptnav_core::{MutationKind, MutationRecord};

/// Map a `MutationRecord.type` string to a [`MutationKind`].
#[must_use]
pub fn mutation_kind(type_name: &str) -> Option<MutationKind> {
    match type_name {
        "childList" => Some(MutationKind::ChildList),
        "attributes" => Some(MutationKind::Attributes),
        "characterData" => Some(MutationKind::CharacterData),
        _ => None,
    }
}

/// Build a core record from the DOM record's type and added-node count.
/// Unknown types are dropped.
#[must_use]
pub fn mutation_record(type_name: &str, added_nodes: u32) -> Option<MutationRecord> {
    mutation_kind(type_name).map(|kind| MutationRecord { kind, added_nodes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_types_map() {
        assert_eq!(mutation_kind("childList"), Some(MutationKind::ChildList));
        assert_eq!(mutation_kind("attributes"), Some(MutationKind::Attributes));
        assert_eq!(
            mutation_kind("characterData"),
            Some(MutationKind::CharacterData)
        );
        assert_eq!(mutation_kind("subtree"), None);
    }

    #[test]
    fn child_list_with_nodes_adds() {
        let record = mutation_record("childList", 2).expect("known type");
        assert!(record.adds_nodes());
        let record = mutation_record("attributes", 0).expect("known type");
        assert!(!record.adds_nodes());
        assert_eq!(mutation_record("bogus", 3), None);
    }
}
