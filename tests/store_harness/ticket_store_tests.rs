//! Macro-generated test suite for `TicketStore` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use tickets::storage::InMemoryTicketStore;
//!
//! ticket_store_tests!(InMemoryTicketStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_save_and_find`: save then retrieve, verify all fields
//! - `test_find_nonexistent`: unknown id returns None
//! - `test_duplicate_ticket_number`: second save with the same number conflicts
//! - `test_update_existing`: editable fields persisted, identity fields kept
//! - `test_update_nonexistent`: NotFound
//! - `test_delete_existing` / `test_delete_nonexistent`
//!
//! ## Listing
//! - text, status, currency, cost and date criteria
//! - total count independent of the page window
//! - sort direction and id tie-break
//! - pages past the end, including offsets too large for the database
//!
//! ## Concurrency
//! - `test_concurrent_saves`: parallel saves from spawned tasks get distinct ids

/// Generate a full `TicketStore` conformance test suite.
///
/// `$factory` must evaluate to a fresh, empty store. It is re-evaluated for each
/// test. For the concurrency test the store must also be `Clone + 'static`.
#[macro_export]
macro_rules! ticket_store_tests {
    ($factory:expr) => {
        mod ticket_store_contract_tests {
            use super::*;
            use rust_decimal_macros::dec;
            use tickets::core::entity::{Currency, SupportTicket, TicketStatus};
            use tickets::core::error::TicketError;
            use tickets::core::filter::{Criterion, TicketFilter, TicketPredicate};
            use tickets::core::query::{PageRequest, Sort, SortDirection, SortField};
            use tickets::core::store::TicketStore;

            async fn seed<S: TicketStore>(store: &S) -> Vec<SupportTicket> {
                let drafts = vec![
                    draft("ST-AAA00001", "Ana Torres", dec!(100.00), at(1, 9)),
                    draft("ST-BBB00002", "Luis Santana", dec!(50.00), at(2, 9)),
                    tickets::core::entity::TicketDraft {
                        status: TicketStatus::Closed,
                        currency: Currency::Eur,
                        ..draft("ST-CCC00003", "Mariana Ruiz", dec!(250.50), at(3, 9))
                    },
                    tickets::core::entity::TicketDraft {
                        currency: Currency::Pen,
                        ..draft("ST-DDD00004", "Pedro", dec!(0), at(4, 9))
                    },
                    draft("ST-EEE00005", "Julia", dec!(50.00), at(5, 9)),
                ];
                let mut saved = Vec::new();
                for d in drafts {
                    saved.push(store.save(d).await.unwrap());
                }
                saved
            }

            fn numbers(tickets: &[SupportTicket]) -> Vec<&str> {
                tickets.iter().map(|t| t.ticket_number.as_str()).collect()
            }

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_save_and_find() {
                let store = $factory;
                let d = draft("ST-0000000A", "Ana", dec!(100.00), at(1, 10));

                let saved = store.save(d.clone()).await.unwrap();
                assert!(saved.id > 0);
                assert_eq!(saved.ticket_number, d.ticket_number);
                assert_eq!(saved.created_at, d.created_at);
                assert_eq!(saved.estimated_cost, dec!(100.00));

                let found = store.find_by_id(saved.id).await.unwrap();
                assert_eq!(found, Some(saved.clone()));
                assert!(store.exists_by_id(saved.id).await.unwrap());
            }

            #[tokio::test]
            async fn test_find_nonexistent() {
                let store = $factory;
                assert_eq!(store.find_by_id(999_999).await.unwrap(), None);
                assert!(!store.exists_by_id(999_999).await.unwrap());
            }

            #[tokio::test]
            async fn test_duplicate_ticket_number() {
                let store = $factory;
                store
                    .save(draft("ST-DUP00001", "Ana", dec!(1), at(1, 1)))
                    .await
                    .unwrap();

                let result = store
                    .save(draft("ST-DUP00001", "Luis", dec!(2), at(1, 2)))
                    .await;
                match result {
                    Err(TicketError::Conflict { ticket_number }) => {
                        assert_eq!(ticket_number, "ST-DUP00001")
                    }
                    other => panic!("expected conflict, got {:?}", other),
                }

                let (_, total) = store
                    .find_page(&TicketPredicate::all(), &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(total, 1);
            }

            #[tokio::test]
            async fn test_update_existing() {
                let store = $factory;
                let saved = store
                    .save(draft("ST-UPD00001", "Ana", dec!(10), at(1, 1)))
                    .await
                    .unwrap();

                let mut changed = saved.clone();
                changed.requester_name = "Ana Maria".to_string();
                changed.status = TicketStatus::Resolved;
                changed.estimated_cost = dec!(12.75);
                changed.ticket_number = "ST-HIJACKED".to_string();
                changed.created_at = at(20, 0);

                let updated = store.update(changed).await.unwrap();
                assert_eq!(updated.requester_name, "Ana Maria");
                assert_eq!(updated.status, TicketStatus::Resolved);
                assert_eq!(updated.estimated_cost, dec!(12.75));
                assert_eq!(updated.ticket_number, saved.ticket_number);
                assert_eq!(updated.created_at, saved.created_at);

                let found = store.find_by_id(saved.id).await.unwrap().unwrap();
                assert_eq!(found, updated);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let ghost = draft("ST-GHOST001", "Nobody", dec!(1), at(1, 1)).into_ticket(999_999);

                assert!(matches!(
                    store.update(ghost).await,
                    Err(TicketError::NotFound { id: 999_999 })
                ));
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let store = $factory;
                let saved = store
                    .save(draft("ST-DEL00001", "Ana", dec!(1), at(1, 1)))
                    .await
                    .unwrap();

                store.delete_by_id(saved.id).await.unwrap();
                assert_eq!(store.find_by_id(saved.id).await.unwrap(), None);
                assert!(!store.exists_by_id(saved.id).await.unwrap());
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = $factory;
                assert!(matches!(
                    store.delete_by_id(999_999).await,
                    Err(TicketError::NotFound { .. })
                ));
            }

            // ==================================================================
            // Listing
            // ==================================================================

            #[tokio::test]
            async fn test_default_order_is_created_at_ascending() {
                let store = $factory;
                seed(&store).await;

                let (page, total) = store
                    .find_page(&TicketPredicate::all(), &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(total, 5);
                assert_eq!(
                    numbers(&page),
                    vec![
                        "ST-AAA00001",
                        "ST-BBB00002",
                        "ST-CCC00003",
                        "ST-DDD00004",
                        "ST-EEE00005"
                    ]
                );
            }

            #[tokio::test]
            async fn test_text_search_is_case_insensitive() {
                let store = $factory;
                seed(&store).await;

                let predicate = TicketFilter {
                    q: Some("ANA".to_string()),
                    ..Default::default()
                }
                .to_predicate();
                let (page, total) = store
                    .find_page(&predicate, &PageRequest::default())
                    .await
                    .unwrap();

                // "Ana Torres", "Luis Santana", "Mariana Ruiz"
                assert_eq!(total, 3);
                assert_eq!(
                    numbers(&page),
                    vec!["ST-AAA00001", "ST-BBB00002", "ST-CCC00003"]
                );

                let by_number = TicketPredicate::all().and(Criterion::Text("ddd0".to_string()));
                let (page, _) = store
                    .find_page(&by_number, &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(numbers(&page), vec!["ST-DDD00004"]);
            }

            #[tokio::test]
            async fn test_status_and_currency_filters() {
                let store = $factory;
                seed(&store).await;

                let closed = TicketPredicate::all().and(Criterion::Status(TicketStatus::Closed));
                let (page, total) = store
                    .find_page(&closed, &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(total, 1);
                assert_eq!(page[0].ticket_number, "ST-CCC00003");

                let open_usd = TicketPredicate::all()
                    .and(Criterion::Status(TicketStatus::Open))
                    .and(Criterion::Currency(Currency::Usd));
                let (_, total) = store
                    .find_page(&open_usd, &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(total, 3);
            }

            #[tokio::test]
            async fn test_cost_range_is_inclusive() {
                let store = $factory;
                seed(&store).await;

                let predicate = TicketFilter {
                    min_cost: Some(dec!(50)),
                    max_cost: Some(dec!(100)),
                    ..Default::default()
                }
                .to_predicate();
                let (page, total) = store
                    .find_page(&predicate, &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(total, 3);
                assert!(page
                    .iter()
                    .all(|t| t.estimated_cost >= dec!(50) && t.estimated_cost <= dec!(100)));
            }

            #[tokio::test]
            async fn test_inverted_cost_range_is_empty() {
                let store = $factory;
                seed(&store).await;

                let predicate = TicketFilter {
                    min_cost: Some(dec!(200)),
                    max_cost: Some(dec!(10)),
                    ..Default::default()
                }
                .to_predicate();
                let (page, total) = store
                    .find_page(&predicate, &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(total, 0);
                assert!(page.is_empty());
            }

            #[tokio::test]
            async fn test_created_at_range() {
                let store = $factory;
                seed(&store).await;

                let between = TicketFilter {
                    from: Some(at(2, 9)),
                    to: Some(at(4, 9)),
                    ..Default::default()
                }
                .to_predicate();
                let (page, _) = store
                    .find_page(&between, &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(
                    numbers(&page),
                    vec!["ST-BBB00002", "ST-CCC00003", "ST-DDD00004"]
                );

                let until = TicketFilter {
                    to: Some(at(1, 9)),
                    ..Default::default()
                }
                .to_predicate();
                let (page, _) = store
                    .find_page(&until, &PageRequest::default())
                    .await
                    .unwrap();
                assert_eq!(numbers(&page), vec!["ST-AAA00001"]);
            }

            #[tokio::test]
            async fn test_paging_window_and_total() {
                let store = $factory;
                seed(&store).await;

                let (page, total) = store
                    .find_page(&TicketPredicate::all(), &PageRequest::of(1, 2))
                    .await
                    .unwrap();
                assert_eq!(total, 5);
                assert_eq!(numbers(&page), vec!["ST-CCC00003", "ST-DDD00004"]);

                let (page, total) = store
                    .find_page(&TicketPredicate::all(), &PageRequest::of(10, 2))
                    .await
                    .unwrap();
                assert_eq!(total, 5);
                assert!(page.is_empty());
            }

            #[tokio::test]
            async fn test_page_with_overflowing_offset_is_empty() {
                let store = $factory;
                seed(&store).await;

                let (page, total) = store
                    .find_page(
                        &TicketPredicate::all(),
                        &PageRequest::of(100_000_000_000_000_000, 100),
                    )
                    .await
                    .unwrap();
                assert_eq!(total, 5);
                assert!(page.is_empty());
            }

            #[tokio::test]
            async fn test_sort_descending_with_id_tie_break() {
                let store = $factory;
                let saved = seed(&store).await;

                let request = PageRequest::new(
                    0,
                    10,
                    Sort::new(SortField::EstimatedCost, SortDirection::Desc),
                );
                let (page, _) = store
                    .find_page(&TicketPredicate::all(), &request)
                    .await
                    .unwrap();

                // two tickets cost 50.00; the lower id comes first
                assert_eq!(
                    numbers(&page),
                    vec![
                        "ST-CCC00003",
                        "ST-AAA00001",
                        "ST-BBB00002",
                        "ST-EEE00005",
                        "ST-DDD00004"
                    ]
                );
                assert!(saved[1].id < saved[4].id);
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_saves() {
                let store = $factory;
                let mut handles = Vec::new();

                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store
                            .save(draft(&format!("ST-CONC{:04}", i), "Ana", dec!(1), at(1, 1)))
                            .await
                            .unwrap()
                            .id
                    }));
                }

                let mut ids = Vec::new();
                for handle in handles {
                    ids.push(handle.await.unwrap());
                }
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), 10);
            }
        }
    };
}
