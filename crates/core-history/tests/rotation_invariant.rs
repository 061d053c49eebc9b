use core_history::HistoryStore;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn counts_never_exceed_cap(max in 1usize..6, appends in 0usize..40) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::with_limits(
            [dir.path().join("a"), dir.path().join("b")],
            max,
            usize::MAX,
        );
        for i in 0..appends {
            store.append(&format!("line {i}"));
            let [c0, c1] = store.counts();
            prop_assert!(c0 <= max && c1 <= max);
            prop_assert!(c0 + c1 <= 2 * max);
        }

        // the on-disk files agree with the counters and keep the newest lines
        let [c0, c1] = store.counts();
        let mut reloaded = HistoryStore::with_limits(
            [dir.path().join("a"), dir.path().join("b")],
            max,
            usize::MAX,
        );
        let lines = reloaded.load();
        prop_assert_eq!(reloaded.counts(), [c0, c1]);
        prop_assert_eq!(lines.len(), c0 + c1);
        if let Some(last) = lines.last() {
            prop_assert_eq!(last, &format!("line {}", appends - 1));
        }
    }
}
