use proptest::prelude::*;
use samspeak_core::layout::{total_slots, visible_count};
use samspeak_core::{Layout, PadMapping, SharedDocument, PADS_PER_PAGE};
use samspeak_storage::{MemoryBackend, SharedPadStore};
use std::sync::Arc;

fn mapping_strategy() -> impl Strategy<Value = PadMapping> {
    prop::collection::btree_map(0usize..200, "[a-zA-Z ]{0,12}", 0..40)
        .prop_map(|entries| entries.into_iter().collect::<PadMapping>())
}

fn sorted_texts(pads: &PadMapping) -> Vec<String> {
    let mut texts: Vec<String> = pads.texts().map(str::to_string).collect();
    texts.sort();
    texts
}

proptest! {
    #[test]
    fn test_total_slots_property(pads in mapping_strategy()) {
        let slots = total_slots(&pads);
        prop_assert!(slots >= PADS_PER_PAGE);
        let expected = pads.max_index().map(|m| (m + 1).max(PADS_PER_PAGE)).unwrap_or(PADS_PER_PAGE);
        prop_assert_eq!(slots, expected);

        let layout = Layout::derive(&pads);
        prop_assert_eq!(layout.total_pages, (slots + PADS_PER_PAGE - 1) / PADS_PER_PAGE);
        prop_assert_eq!(layout.shows_page_indicators(), layout.total_pages > 1);
    }

    #[test]
    fn test_visible_count_property(pads in mapping_strategy(), page in 0usize..40) {
        let count = visible_count(&pads, page);
        prop_assert!(count <= PADS_PER_PAGE);
        if pads.is_empty() {
            prop_assert_eq!(count, PADS_PER_PAGE);
        }
    }

    #[test]
    fn test_reorder_property(pads in mapping_strategy(), from in 0usize..45, to in 0usize..45) {
        let mut reordered = pads.clone();
        let moved = reordered.reorder(from, to);

        if from == to || from >= pads.len() {
            prop_assert!(!moved);
            prop_assert_eq!(&reordered, &pads);
        } else {
            prop_assert!(moved);
            // Same multiset of texts, keys contiguous from 0
            prop_assert_eq!(sorted_texts(&reordered), sorted_texts(&pads));
            let keys: Vec<usize> = reordered.iter().map(|(i, _)| i).collect();
            prop_assert_eq!(keys, (0..pads.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_delete_property(pads in mapping_strategy(), index in 0usize..200) {
        let mut after = pads.clone();
        let removed = after.delete_pad(index);

        prop_assert_eq!(removed.as_deref(), pads.get(index));
        prop_assert!(!after.contains(index));
        for (i, text) in pads.iter().filter(|(i, _)| *i != index) {
            prop_assert_eq!(after.get(i), Some(text));
        }
        prop_assert_eq!(after.len(), pads.len() - usize::from(pads.contains(index)));
    }

    #[test]
    fn test_add_pad_property(pads in mapping_strategy()) {
        let mut after = pads.clone();
        let index = after.add_pad();
        prop_assert_eq!(index, pads.max_index().map(|m| m + 1).unwrap_or(0));
        prop_assert_eq!(after.get(index), Some(""));
        prop_assert_eq!(after.len(), pads.len() + 1);
    }

    #[test]
    fn test_document_json_property(pads in mapping_strategy()) {
        let document = SharedDocument::stamp(pads);
        let json = document.to_json().unwrap();
        prop_assert_eq!(SharedDocument::from_json(&json).unwrap(), document);
    }

    #[test]
    fn test_save_load_property(pads in mapping_strategy()) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let loaded = runtime.block_on(async {
            let store = SharedPadStore::new(Arc::new(MemoryBackend::new()));
            assert!(store.save(&pads).await);
            store.load().await
        });
        prop_assert_eq!(loaded, Some(pads));
    }
}
