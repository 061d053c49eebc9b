use std::sync::Arc;

use core_actions::completion::FINISHED_FOOTER;
use core_actions::{CompletionEngine, CompletionSettings, CompletionSource, IdentityTranslator};
use proptest::prelude::*;

struct Many(usize);

impl CompletionSource for Many {
    fn has_command(&self, name: &str) -> bool {
        name == "info"
    }
    fn command_names(&self) -> Vec<String> {
        vec!["info".into()]
    }
    fn complete(&self, _command: &str, _partial: &str) -> Vec<String> {
        (0..self.0).map(|i| format!("t{i:04}")).collect()
    }
}

fn engine(page_size: usize, third_tab_lists_all: bool) -> CompletionEngine {
    CompletionEngine::new(
        CompletionSettings {
            page_size,
            third_tab_lists_all,
        },
        Arc::new(IdentityTranslator),
    )
}

/// Press Tab from streak 2 until the engine resets the streak; collect the
/// listed candidates and the number of presses.
fn drain(engine: &CompletionEngine, src: &Many) -> (Vec<String>, usize, Vec<String>) {
    let mut listed = Vec::new();
    let mut streak = 2;
    loop {
        let c = engine.complete("info t", 6, streak, src);
        assert_eq!(c.line, "info t");
        listed.extend(c.output.iter().filter(|l| l.starts_with('t')).cloned());
        if c.reset_streak {
            return (listed, streak - 1, c.output);
        }
        streak += 1;
        assert!(streak < 10_000, "listing never finished");
    }
}

proptest! {
    #[test]
    fn paged_listing_shows_every_candidate_once(total in 2usize..120, page in 1usize..20) {
        let src = Many(total);
        let (listed, presses, last) = drain(&engine(page, false), &src);
        prop_assert_eq!(listed, src.complete("info", "t"));
        prop_assert_eq!(presses, total.div_ceil(page));
        if presses > 1 {
            let pages = total.div_ceil(page);
            let footer = FINISHED_FOOTER
                .replace("{count}", &total.to_string())
                .replace("{page}", &pages.to_string())
                .replace("{pages}", &pages.to_string());
            prop_assert_eq!(last.last().cloned(), Some(footer));
        }
    }

    #[test]
    fn lists_all_finishes_by_third_tab(total in 2usize..120, page in 1usize..20) {
        let src = Many(total);
        let (listed, presses, _) = drain(&engine(page, true), &src);
        prop_assert_eq!(listed, src.complete("info", "t"));
        prop_assert_eq!(presses, if total > page { 2 } else { 1 });
    }
}
