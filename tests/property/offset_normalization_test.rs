//! Property-based tests for drag-and-drop offset normalization.
//!
//! An insertion offset counts the gaps between rows before the dragged row
//! is removed. Normalizing it must give the index the row ends up at.

use dashboard::managers::service_registry::normalize_offset;
use proptest::prelude::*;

/// A list length plus a valid source row and insertion offset for it.
fn arb_drag() -> impl Strategy<Value = (usize, usize, usize)> {
    (1..30usize).prop_flat_map(|len| (Just(len), 0..len, 0..=len))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Removing the source and inserting at the normalized index puts the
    /// row between the same two neighbours the offset pointed at.
    #[test]
    fn normalized_index_matches_insertion_gap((len, source, offset) in arb_drag()) {
        let original: Vec<usize> = (0..len).collect();

        // Insert a copy at the raw gap, then drop the original row.
        let mut by_gap: Vec<Option<usize>> = original.iter().copied().map(Some).collect();
        by_gap.insert(offset, None);
        let by_gap: Vec<usize> = by_gap
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != if offset <= source { source + 1 } else { source })
            .map(|(_, v)| v.unwrap_or(source))
            .collect();

        let mut by_index = original.clone();
        let row = by_index.remove(source);
        by_index.insert(normalize_offset(source, offset), row);

        prop_assert_eq!(by_index, by_gap);
    }

    /// The normalized index is always a valid position in the list.
    #[test]
    fn normalized_index_in_bounds((len, source, offset) in arb_drag()) {
        prop_assert!(normalize_offset(source, offset) < len);
    }

    /// Offsets at or before the source are used unchanged.
    #[test]
    fn offsets_up_to_source_unchanged((len, source, _offset) in arb_drag(), pick in 0..30usize) {
        let offset = pick % (source + 1);
        prop_assert!(offset <= source && source < len);
        prop_assert_eq!(normalize_offset(source, offset), offset);
    }
}
