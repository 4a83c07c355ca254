//! Property tests for parsing and variable resolution.

use httpfile::parser::parse;
use httpfile::variables::{detect_circular_references, resolve_variables, VariableContext};
use indexmap::IndexMap;
use proptest::prelude::*;
use std::collections::HashMap;

fn empty() -> HashMap<String, String> {
    HashMap::new()
}

proptest! {
    #[test]
    fn prop_resolve_is_identity_without_placeholders(text in "[^{}$\\\\]*") {
        let file_vars: HashMap<String, String> =
            [("a".to_string(), "1".to_string())].into_iter().collect();
        prop_assert_eq!(resolve_variables(&text, &file_vars, &empty()), text);
    }

    #[test]
    fn prop_resolve_is_idempotent(
        values in prop::collection::vec("[a-z0-9/:._-]{0,12}", 1..5),
        template in prop::collection::vec(0usize..6, 0..8),
    ) {
        let mut context = VariableContext::new();
        for (i, value) in values.iter().enumerate() {
            context.file_variables.insert(format!("v{}", i), value.clone());
        }

        // Index 5 never exists, so some placeholders stay unresolved.
        let text: String = template
            .iter()
            .map(|i| format!("/{{{{v{}}}}}", i))
            .collect();

        let once = context.resolve(&text);
        prop_assert_eq!(context.resolve(&once), once);
    }

    #[test]
    fn prop_random_int_in_range(a in -1000i64..1000, b in -1000i64..1000) {
        let text = format!("{{{{$randomInt {} {}}}}}", a, b);
        let value: i64 = resolve_variables(&text, &empty(), &empty()).parse().unwrap();
        prop_assert!(value >= a.min(b) && value <= a.max(b));
    }

    #[test]
    fn prop_guid_is_uuid(_seed in 0u8..16) {
        let value = resolve_variables("{{$guid}}", &empty(), &empty());
        prop_assert!(uuid::Uuid::parse_str(&value).is_ok());
    }

    #[test]
    fn prop_ring_detected_exactly(ring in 1usize..8, outsiders in 0usize..5) {
        let mut vars = IndexMap::new();
        for i in 0..ring {
            vars.insert(format!("r{}", i), format!("x{{{{r{}}}}}", (i + 1) % ring));
        }
        for i in 0..outsiders {
            vars.insert(format!("o{}", i), format!("{{{{r0}}}}-{{{{o{}}}}}", i + 1));
        }

        let cyclic = detect_circular_references(&vars);
        prop_assert_eq!(cyclic.len(), ring);
        prop_assert!(cyclic.iter().all(|name| name.starts_with('r')));
    }

    #[test]
    fn prop_request_order_matches_source(paths in prop::collection::vec("[a-z]{1,8}", 1..10)) {
        let content: String = paths
            .iter()
            .map(|p| format!("GET https://example.com/{}\n\n###\n\n", p))
            .collect();

        let document = parse(&content).unwrap();
        let urls: Vec<String> = document.requests().iter().map(|r| r.url.clone()).collect();
        let expected: Vec<String> = paths
            .iter()
            .map(|p| format!("https://example.com/{}", p))
            .collect();
        prop_assert_eq!(urls, expected);

        let lines: Vec<usize> = document.requests().iter().map(|r| r.source_line).collect();
        prop_assert!(lines.windows(2).all(|w| w[0] < w[1]));
    }
}
