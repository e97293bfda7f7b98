use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use serde_json::json;
use showcase_core::{NavigationError, Showcase, ShowcaseContext, ShowcaseState, Step};

fn schema_a() -> Showcase {
    Showcase::new("schemaA").with_hidden_field("scid", "1")
}

fn schema_b() -> Showcase {
    Showcase::new("schemaB").with_hidden_field("scid", "2")
}

#[test]
fn forward_complete_undo_and_back() {
    let marker = Utc.with_ymd_and_hms(2024, 5, 4, 9, 30, 0).single().expect("valid timestamp");
    let mut context = ShowcaseContext::new(schema_a(), "https://x/1", marker);
    assert_eq!(context.state(), ShowcaseState::Unknown);
    assert_eq!(context.history_size(), 0);

    context.push_current_step(Step::new(schema_b(), "https://x/2")).expect("push");
    context.set_state(ShowcaseState::HasNextStep);
    assert_eq!(context.history_size(), 1);
    assert_eq!(context.current_step().showcase.as_ref(), Some(&schema_b()));

    context.set_params(&json!({ "params": { "amount": "10" } })).expect("params");
    context.set_state(ShowcaseState::Completed);
    let expected: BTreeMap<String, String> =
        [("amount".to_owned(), "10".to_owned())].into_iter().collect();
    assert_eq!(context.params(), &expected);
    assert_eq!(context.state(), ShowcaseState::Completed);

    context.pop_step();
    assert!(context.params().is_empty());
    assert_eq!(context.state(), ShowcaseState::HasNextStep);
    assert_eq!(context.current_step().showcase.as_ref(), Some(&schema_b()));
    assert_eq!(context.history_size(), 1);

    context.pop_step();
    assert_eq!(context.history_size(), 0);
    assert_eq!(context.current_step(), &Step::new(schema_a(), "https://x/1"));

    let request = context.create_request().expect("first step is usable");
    assert_eq!(request.url, "https://x/1");
    assert_eq!(request.if_modified_since_header(), "Sat, 04 May 2024 09:30:00 GMT");
}

#[test]
fn request_construction_rejects_unusable_submit_urls() {
    let marker = Utc::now();

    let missing = ShowcaseContext::<Showcase>::resume(
        Some(Default::default()),
        Some(marker),
        Some(Step::from_parts(Some(schema_a()), None)),
        Some(BTreeMap::new()),
        ShowcaseState::HasNextStep,
    )
    .expect("resume");
    assert!(matches!(missing.create_request(), Err(NavigationError::InvalidState(_))));

    let blank = ShowcaseContext::new(schema_a(), "", marker);
    assert!(matches!(blank.create_request(), Err(NavigationError::InvalidState(_))));
}

#[test]
fn deep_history_unwinds_in_reverse_order() {
    let mut context = ShowcaseContext::new(Showcase::new("0"), "https://x/0", Utc::now());
    for index in 1..=5 {
        let step = Step::new(Showcase::new(index.to_string()), format!("https://x/{index}"));
        context.push_current_step(step).expect("push");
    }
    assert_eq!(context.history_size(), 5);

    let mut visited = Vec::new();
    while context.history_size() > 0 {
        let step = context.pop_step();
        visited.push(step.submit_url.clone().unwrap_or_default());
    }

    assert_eq!(
        visited,
        vec!["https://x/4", "https://x/3", "https://x/2", "https://x/1", "https://x/0"]
    );
    // exhausted: further back actions change nothing
    let before = context.clone();
    context.pop_step();
    assert_eq!(context, before);
}
