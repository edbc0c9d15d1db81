use billsearch::prelude::*;
use billsearch::{bills_from_value, SharedBill};
use serde_json::json;
use std::time::Duration;

fn numbers(bills: &[SharedBill]) -> Vec<&str> {
    bills.iter().map(|b| b.bill_number.as_str()).collect()
}

fn two_bill_controller() -> FilterController {
    let bills = bills_from_value(&json!([
        { "billNumber": "SB1", "status": "Filed", "topics": ["Tax"] },
        { "billNumber": "SB2", "status": "Passed", "topics": ["Health"] }
    ]));
    let mut controller = FilterController::default();
    controller.set_bill_collection(bills);
    controller
}

/// 25 bills: even ones about tax, every third one passed, sponsors rotate
fn numbered_bills() -> Vec<Bill> {
    (1..=25)
        .map(|i| {
            Bill::new(BillRecord {
                id: format!("hb-{}", i),
                bill_number: format!("HB {}", i),
                short_title: if i % 2 == 0 {
                    "Relating to property tax relief".to_string()
                } else {
                    "Relating to rural road maintenance".to_string()
                },
                status: if i % 3 == 0 {
                    BillStatus::Passed
                } else {
                    BillStatus::Filed
                },
                sponsors: vec![Sponsor::named(["Ana Ruiz", "Ben Cho", "Carla Diaz"][i % 3])],
                topics: if i % 2 == 0 {
                    vec!["Tax".to_string()]
                } else {
                    vec!["Transportation".to_string()]
                },
                ..Default::default()
            })
        })
        .collect()
}

fn numbered_controller(page_size: usize) -> FilterController {
    let config = EngineConfigBuilder::new().page_size(page_size).build().unwrap();
    let mut controller = FilterController::new(&config);
    controller.set_bill_collection(numbered_bills());
    controller
}

#[test]
fn test_status_facet_example() {
    let mut controller = two_bill_controller();

    controller.set_status(Some(BillStatus::from("Passed")));
    assert_eq!(controller.filtered_count(), 1);
    assert_eq!(numbers(controller.visible_slice()), vec!["SB2"]);
}

#[test]
fn test_text_query_example() {
    let mut controller = two_bill_controller();
    controller.set_status(Some(BillStatus::Passed));

    controller.clear_all();
    assert_eq!(controller.filtered_count(), 2);

    assert!(controller.apply_text_query("sb1"));
    assert_eq!(controller.filtered_count(), 1);
    assert_eq!(numbers(controller.visible_slice()), vec!["SB1"]);
}

#[test]
fn test_empty_collection_is_not_an_error() {
    let controller = FilterController::default();
    assert_eq!(controller.total_count(), 0);
    assert_eq!(controller.filtered_count(), 0);
    assert_eq!(controller.visible_count(), 0);
    assert!(controller.visible_slice().is_empty());
    assert!(!controller.has_more());
}

#[test]
fn test_no_match_is_distinguishable_from_empty_collection() {
    let mut controller = two_bill_controller();
    controller.apply_text_query("nothing like this");

    assert_eq!(controller.total_count(), 2);
    assert_eq!(controller.filtered_count(), 0);
    assert_eq!(controller.visible_count(), 0);
}

#[test]
fn test_adding_constraints_never_grows_results() {
    let mut controller = numbered_controller(10);
    let mut previous = controller.filtered_count();

    controller.set_facet(Facet::Topics, ["Tax"]);
    assert!(controller.filtered_count() <= previous);
    previous = controller.filtered_count();

    controller.apply_text_query("property");
    assert!(controller.filtered_count() <= previous);
    previous = controller.filtered_count();

    controller.apply_text_query("property relief");
    assert!(controller.filtered_count() <= previous);
    previous = controller.filtered_count();

    controller.set_status(Some(BillStatus::Passed));
    assert!(controller.filtered_count() <= previous);
    previous = controller.filtered_count();

    controller.set_facet(Facet::Sponsors, ["Ana Ruiz"]);
    assert!(controller.filtered_count() <= previous);

    // even numbers divisible by 3 with sponsor index 0: 6, 12, 18, 24
    assert_eq!(
        numbers(controller.filtered().bills()),
        vec!["HB 6", "HB 12", "HB 18", "HB 24"]
    );
}

#[test]
fn test_or_within_facet_and_across_facets() {
    let mut controller = numbered_controller(50);

    controller.set_facet(Facet::Topics, ["Tax", "Transportation"]);
    assert_eq!(controller.filtered_count(), 25);

    controller.set_facet(Facet::Sponsors, ["Ben Cho", "Carla Diaz"]);
    assert!(controller
        .visible_slice()
        .iter()
        .all(|b| b.sponsors[0].name != "Ana Ruiz"));

    controller.set_status(Some(BillStatus::Passed));
    assert_eq!(controller.filtered_count(), 0);
}

#[test]
fn test_repeated_state_hits_cache() {
    let mut controller = numbered_controller(10);

    controller.set_facet(Facet::Topics, ["Tax"]);
    let first = controller.filtered().clone();
    let misses = controller.cache_stats().misses;

    controller.set_facet(Facet::Topics, ["Tax"]);
    let stats = controller.cache_stats();

    assert_eq!(stats.misses, misses);
    assert!(stats.hits >= 1);
    assert!(first.ptr_eq(controller.filtered()));
    assert_eq!(
        numbers(first.bills()),
        numbers(controller.filtered().bills())
    );
}

#[test]
fn test_clear_all_reuses_empty_state_entry() {
    let mut controller = numbered_controller(10);
    let before = controller.cache_stats();

    controller.set_facet(Facet::Topics, ["Tax"]);
    controller.clear_all();

    let after = controller.cache_stats();
    assert_eq!(after.misses, before.misses + 1);
    assert_eq!(after.hits, before.hits + 1);
    assert_eq!(controller.filtered_count(), 25);
}

#[test]
fn test_facet_selection_order_does_not_matter() {
    let mut controller = numbered_controller(10);

    controller.set_facet(Facet::Topics, ["Transportation", "Tax"]);
    let first = controller.filtered().clone();
    let entries = controller.cache_stats().entries;

    controller.set_facet(Facet::Topics, ["Tax", "Transportation"]);
    assert_eq!(controller.cache_stats().entries, entries);
    assert!(first.ptr_eq(controller.filtered()));
}

#[test]
fn test_load_more_grows_prefix() {
    let mut controller = numbered_controller(10);
    let all = numbers(controller.filtered().bills())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut previous = numbers(controller.visible_slice())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    assert_eq!(previous.len(), 10);

    while controller.has_more() {
        let misses = controller.cache_stats().misses;
        assert!(controller.load_more());
        assert_eq!(controller.cache_stats().misses, misses);

        let current = numbers(controller.visible_slice())
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        assert!(current.len() > previous.len());
        assert_eq!(&current[..previous.len()], &previous[..]);
        assert_eq!(&all[..current.len()], &current[..]);
        previous = current;
    }

    assert_eq!(controller.visible_count(), 25);
    assert_eq!(controller.current_page(), 3);
    assert!(!controller.load_more());
    assert_eq!(controller.current_page(), 3);
}

#[test]
fn test_every_filter_change_resets_pagination() {
    let mut controller = numbered_controller(5);

    let mutations: Vec<Box<dyn Fn(&mut FilterController)>> = vec![
        Box::new(|c: &mut FilterController| c.set_facet(Facet::Topics, ["Tax"])),
        Box::new(|c: &mut FilterController| c.set_facet(Facet::Topics, ["Tax"])),
        Box::new(|c: &mut FilterController| c.set_facet(Facet::Sponsors, ["Ben Cho"])),
        Box::new(|c: &mut FilterController| c.set_status(None)),
        Box::new(|c: &mut FilterController| {
            c.apply_text_query("hb");
        }),
        Box::new(|c: &mut FilterController| c.clear_all()),
    ];

    for mutate in mutations {
        controller.clear_all();
        controller.load_more();
        controller.load_more();
        assert_eq!(controller.current_page(), 3);

        mutate(&mut controller);
        assert_eq!(controller.current_page(), 1);
        assert!(controller.visible_count() <= controller.filtered_count());
    }
}

#[test]
fn test_page_size_from_viewport() {
    let mut controller = numbered_controller(10);
    controller.set_page_size(6);
    assert_eq!(controller.visible_count(), 6);
    controller.load_more();
    assert_eq!(controller.visible_count(), 12);
}

#[test]
fn test_bounded_cache_still_serves_results() {
    let config = EngineConfigBuilder::new().cache_capacity(1).build().unwrap();
    let mut controller = FilterController::new(&config);
    controller.set_bill_collection(numbered_bills());

    controller.set_facet(Facet::Topics, ["Tax"]);
    controller.set_facet(Facet::Topics, ["Transportation"]);
    controller.set_facet(Facet::Topics, ["Tax"]);

    assert_eq!(controller.cache_stats().entries, 1);
    assert_eq!(controller.filtered_count(), 12);
}

#[test]
fn test_facet_options() {
    let mut controller = two_bill_controller();
    controller.set_bill_collection(bills_from_value(&json!([
        {
            "billNumber": "SB1",
            "status": "Filed",
            "topics": ["Tax", "Budget"],
            "sponsors": ["Zed", "Amy"]
        },
        {
            "billNumber": "SB2",
            "status": "Passed",
            "topics": ["Health", "Tax"],
            "sponsors": [{ "name": "Amy" }]
        },
        { "billNumber": "SB3" }
    ])));

    insta::assert_json_snapshot!(controller.facet_options(), @r###"
    {
      "topics": [
        "Budget",
        "Health",
        "Tax"
      ],
      "sponsors": [
        "Amy",
        "Zed"
      ],
      "statuses": [
        "Filed",
        "Passed"
      ]
    }
    "###);
}

#[test]
fn test_new_collection_resets_filters() {
    let mut controller = two_bill_controller();
    controller.set_status(Some(BillStatus::Passed));
    assert_eq!(controller.filtered_count(), 1);

    controller.set_bill_collection(numbered_bills());
    assert!(controller.state().is_empty());
    assert_eq!(controller.total_count(), 25);
    assert_eq!(controller.filtered_count(), 25);
    assert_eq!(controller.current_page(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_typing_commits_once_after_pause() {
    let mut controller = numbered_controller(10);
    let misses = controller.cache_stats().misses;

    for partial in ["p", "pr", "prop", "property"] {
        controller.set_text_query(partial);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(controller.has_pending_text());
    assert_eq!(controller.state().search(), "");

    assert_eq!(controller.next_text_commit().await, Some(true));
    assert_eq!(controller.state().search(), "property");
    assert_eq!(controller.filtered_count(), 12);
    assert_eq!(controller.cache_stats().misses, misses + 1);

    assert!(!controller.has_pending_text());
    assert_eq!(controller.next_text_commit().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_text_commit_waits_for_quiet_period() {
    let mut controller = numbered_controller(10);
    let start = tokio::time::Instant::now();

    controller.set_text_query("Tax");
    assert_eq!(controller.next_text_commit().await, Some(true));
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(controller.state().search(), "tax");
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_text_keeps_page() {
    let mut controller = numbered_controller(10);
    controller.apply_text_query("hb");
    controller.load_more();
    assert_eq!(controller.current_page(), 2);

    controller.set_text_query("  HB ");
    assert_eq!(controller.next_text_commit().await, Some(false));
    assert_eq!(controller.current_page(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_facet_changes_are_not_debounced() {
    let mut controller = numbered_controller(10);

    controller.set_text_query("property");
    controller.set_facet(Facet::Topics, ["Transportation"]);
    assert_eq!(controller.filtered_count(), 13);
    assert!(controller.has_pending_text());

    assert_eq!(controller.next_text_commit().await, Some(true));
    assert_eq!(controller.filtered_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_supersedes_pending_text() {
    let mut controller = numbered_controller(10);

    controller.set_text_query("property");
    controller.clear_all();
    assert!(!controller.has_pending_text());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(controller.next_text_commit().await, None);
    assert_eq!(controller.state().search(), "");
    assert_eq!(controller.filtered_count(), 25);
}

#[tokio::test(start_paused = true)]
async fn test_fired_but_uncommitted_text_is_superseded() {
    let mut controller = numbered_controller(10);

    controller.set_text_query("road");
    tokio::time::sleep(Duration::from_secs(1)).await;
    controller.set_text_query("property");

    assert_eq!(controller.next_text_commit().await, Some(true));
    assert_eq!(controller.state().search(), "property");
    assert_eq!(controller.next_text_commit().await, None);
}
