use core_text::markup::{self, render_markup};
use core_text::width::str_width;
use core_text::wrap::wrap;
use proptest::prelude::*;

fn tagged_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z ]{0,8}",
        Just("{!info!}".to_string()),
        Just("{!red,black,bold!}".to_string()),
        Just("{!+underline!}".to_string()),
        Just("日本".to_string()),
    ];
    prop::collection::vec(piece, 0..10).prop_map(|v| {
        // modifier-only tags need a preceding style
        let mut s = String::from("{!normal!}");
        s.extend(v);
        s
    })
}

proptest! {
    #[test]
    fn strip_after_reparse_matches_strip(text in tagged_text()) {
        let segs = markup::parse(&text).unwrap();
        let rejoined = render_markup(&segs);
        prop_assert_eq!(markup::strip(&rejoined).unwrap(), markup::strip(&text).unwrap());
    }

    #[test]
    fn wrapped_lines_fit_width(text in "[a-z 日本語]{0,60}", width in 2usize..30) {
        for line in wrap(&text, width).unwrap() {
            prop_assert!(str_width(&markup::strip(&line).unwrap()) <= width);
        }
    }

    #[test]
    fn wrap_keeps_every_char(text in "[a-z ]{0,60}", width in 1usize..20) {
        let joined: String = wrap(&text, width).unwrap().concat();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn wrap_bound_exceeded_only_by_forced_wide_char(text in "[日本語]{1,10}") {
        for line in wrap(&text, 1).unwrap() {
            prop_assert!(str_width(&line) <= 2);
        }
    }
}
