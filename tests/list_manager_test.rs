//! List screen behavior against an in-memory backend.

mod common;

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::narcotics_payload;
use evidence_catalog::catalog::{DiscoveryDraft, DiscoveryRecord, Narcotic, UserAccount};
use evidence_catalog::error::{CatalogError, Result};
use evidence_catalog::list::{
    DeletionCoordinator, DeletionPhase, ItemId, ListManager, LoadState, NotificationKind,
    PageState, SaveTarget, SortDirection, SortOrder, submit_draft,
};
use evidence_catalog::remote::{ApiError, CatalogApi, Endpoint, decode_collection};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Serves one collection; deletes answer with the queued outcomes in order.
/// Saves echo the body back with an id: 900 for creates, the path id for
/// updates, unless a failure is queued.
struct MemoryApi {
    collection: Value,
    delete_outcomes: Mutex<Vec<Result<()>>>,
    save_failures: Mutex<Vec<CatalogError>>,
    gets: AtomicUsize,
    deletes: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryApi {
    fn new(collection: Value) -> Self {
        Self {
            collection,
            delete_outcomes: Mutex::new(Vec::new()),
            save_failures: Mutex::new(Vec::new()),
            gets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    fn failing_delete(self, err: CatalogError) -> Self {
        self.delete_outcomes.lock().unwrap().push(Err(err));
        self
    }

    fn failing_save(self, err: CatalogError) -> Self {
        self.save_failures.lock().unwrap().push(err);
        self
    }

    fn save(&self, id: i64, body: &Value) -> Result<Value> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut failures = self.save_failures.lock().unwrap();
        if !failures.is_empty() {
            return Err(failures.remove(0));
        }
        let mut saved = body.clone();
        saved["id"] = json!(id);
        Ok(saved)
    }
}

impl CatalogApi for MemoryApi {
    async fn get(&self, _endpoint: &Endpoint) -> Result<Value> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.collection.clone())
    }

    async fn post(&self, _endpoint: &Endpoint, body: &Value) -> Result<Value> {
        self.save(900, body)
    }

    async fn put(&self, endpoint: &Endpoint, body: &Value) -> Result<Value> {
        let id = endpoint
            .path
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
            .unwrap_or_default();
        self.save(id, body)
    }

    async fn delete(&self, _endpoint: &Endpoint) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut outcomes = self.delete_outcomes.lock().unwrap();
        if outcomes.is_empty() {
            Ok(())
        } else {
            outcomes.remove(0)
        }
    }
}

fn numbered_narcotics(count: i64) -> Value {
    Value::Array(
        (1..=count)
            .map(|i| json!({"id": i, "drug_type": format!("sample-{i:02}"), "drug_category": "test"}))
            .collect(),
    )
}

fn users_payload() -> Value {
    json!([
        {"user_id": 1, "firstname": "Anong", "lastname": "K", "department": "A", "role": {"role_name": "admin"}},
        {"user_id": 2, "firstname": "Boon", "lastname": "S", "department": "B", "role": {"role_name": "admin"}},
        {"user_id": 3, "firstname": "Chai", "lastname": "T", "department": "A", "role": {"role_name": "user"}},
        {"user_id": 4, "firstname": "Dara", "lastname": "P", "department": "A", "role": {"role_name": "admin"}}
    ])
}

async fn loaded<T: evidence_catalog::catalog::Resource>(
    api: &MemoryApi,
    page_size: usize,
) -> ListManager<T> {
    let mut manager = ListManager::new(PageState::new(page_size).unwrap());
    assert!(manager.load(api).await);
    assert_eq!(*manager.load_state(), LoadState::Loaded);
    manager
}

fn ids<T: evidence_catalog::list::Listable>(items: &[T]) -> Vec<i64> {
    items.iter().map(|item| item.item_id().0).collect()
}

#[tokio::test]
async fn test_deleting_only_item_on_last_page_moves_back_a_page() {
    let api = MemoryApi::new(numbered_narcotics(11));
    let mut manager: ListManager<Narcotic> = loaded(&api, 10).await;
    assert!(manager.go_to_page(2));
    assert_eq!(ids(&manager.view().page_items), vec![11]);

    let mut coordinator = DeletionCoordinator::new();
    coordinator.request_delete(ItemId(11));
    let notification = coordinator
        .confirm_delete(&api, &mut manager)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(notification.kind, NotificationKind::Success);
    let view = manager.view();
    assert_eq!(view.current_page, 1);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.page_items.len(), 10);
}

#[tokio::test]
async fn test_thai_search_matches_substrings() {
    let api = MemoryApi::new(narcotics_payload());
    let mut manager: ListManager<Narcotic> = loaded(&api, 10).await;

    manager.set_search("ยาบ้า");
    let view = manager.view();
    assert_eq!(view.filtered_count, 2);
    assert_eq!(view.total_count, 5);
    assert_eq!(ids(&view.page_items), vec![1, 4]);

    // Same input, same result
    manager.set_search("ยาบ้า");
    assert_eq!(manager.view(), view);
}

#[tokio::test]
async fn test_filters_are_conjunctive_across_categories() {
    let api = MemoryApi::new(users_payload());
    let mut manager: ListManager<UserAccount> = loaded(&api, 10).await;

    manager.select("role", "admin");
    assert_eq!(ids(&manager.view().page_items), vec![1, 2, 4]);

    manager.select("department", "A");
    assert_eq!(ids(&manager.view().page_items), vec![1, 4]);

    manager.select("department", "B");
    assert_eq!(ids(&manager.view().page_items), vec![1, 2, 4]);

    manager.clear_filters();
    assert_eq!(manager.view().filtered_count, 4);
}

#[tokio::test]
async fn test_sort_does_not_reorder_raw_collection() {
    let api = MemoryApi::new(users_payload());
    let mut manager: ListManager<UserAccount> = loaded(&api, 10).await;

    manager.set_sort(SortOrder::new(SortDirection::Descending, "firstname"));
    assert_eq!(ids(&manager.view().page_items), vec![4, 3, 2, 1]);
    assert_eq!(ids(manager.items()), vec![1, 2, 3, 4]);

    manager.set_sort(SortOrder::None);
    assert_eq!(ids(&manager.view().page_items), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_failed_delete_leaves_collection_unchanged() {
    let api = MemoryApi::new(numbered_narcotics(3)).failing_delete(
        ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail": "database busy"}"#)
            .into(),
    );
    let mut manager: ListManager<Narcotic> = loaded(&api, 10).await;
    let before = manager.view();

    let mut coordinator = DeletionCoordinator::new();
    coordinator.request_delete(ItemId(2));
    let notification = coordinator
        .confirm_delete(&api, &mut manager)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "database busy");
    assert_eq!(manager.view(), before);
    assert_eq!(
        coordinator.phase(),
        DeletionPhase::Settled {
            item_id: ItemId(2),
            succeeded: false
        }
    );
}

#[tokio::test]
async fn test_delete_without_detail_uses_generic_message() {
    let api = MemoryApi::new(numbered_narcotics(1)).failing_delete(
        ApiError::from_status(StatusCode::BAD_GATEWAY, "").into(),
    );
    let mut manager: ListManager<Narcotic> = loaded(&api, 10).await;

    let mut coordinator = DeletionCoordinator::new();
    coordinator.request_delete(ItemId(1));
    let notification = coordinator
        .confirm_delete(&api, &mut manager)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        notification.message,
        evidence_catalog::remote::GENERIC_MUTATION_FAILURE
    );
    assert_eq!(manager.items().len(), 1);
}

#[tokio::test]
async fn test_confirm_issues_exactly_one_request() {
    let api = MemoryApi::new(numbered_narcotics(2));
    let mut manager: ListManager<Narcotic> = loaded(&api, 10).await;

    let mut coordinator = DeletionCoordinator::new();
    coordinator.request_delete(ItemId(1));
    coordinator
        .confirm_delete(&api, &mut manager)
        .await
        .unwrap();
    // A second confirm after the first settled has nothing to act on
    let again = coordinator
        .confirm_delete(&api, &mut manager)
        .await
        .unwrap();

    assert!(again.is_none());
    assert_eq!(api.deletes.load(Ordering::SeqCst), 1);
    assert_eq!(ids(manager.items()), vec![2]);
}

#[tokio::test]
async fn test_cancel_issues_no_request() {
    let api = MemoryApi::new(numbered_narcotics(2));
    let mut manager: ListManager<Narcotic> = loaded(&api, 10).await;

    let mut coordinator = DeletionCoordinator::new();
    coordinator.request_delete(ItemId(1));
    assert!(coordinator.cancel());
    let outcome = coordinator
        .confirm_delete(&api, &mut manager)
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(api.deletes.load(Ordering::SeqCst), 0);
    assert_eq!(manager.items().len(), 2);
}

#[tokio::test]
async fn test_stale_load_result_is_discarded() {
    let mut manager: ListManager<Narcotic> = ListManager::new(PageState::default());
    let first = manager.begin_load();
    let second = manager.begin_load();

    let newer = decode_collection::<Narcotic>(numbered_narcotics(3)).unwrap();
    let older = decode_collection::<Narcotic>(numbered_narcotics(7)).unwrap();

    assert!(manager.complete_load(second, Ok(newer)));
    assert!(!manager.complete_load(first, Ok(older)));
    assert_eq!(manager.items().len(), 3);
}

#[tokio::test]
async fn test_result_after_unmount_is_discarded() {
    let api = MemoryApi::new(numbered_narcotics(4));
    let mut manager: ListManager<Narcotic> = ListManager::new(PageState::default());
    manager.unmount();

    assert!(!manager.load(&api).await);
    assert_eq!(api.gets.load(Ordering::SeqCst), 1);
    assert!(manager.items().is_empty());
}

#[tokio::test]
async fn test_filter_change_clamps_page() {
    let api = MemoryApi::new(numbered_narcotics(25));
    let mut manager: ListManager<Narcotic> = loaded(&api, 10).await;
    assert!(manager.go_to_page(3));

    manager.set_search("sample-0");
    let view = manager.view();
    assert_eq!(view.filtered_count, 9);
    assert_eq!(view.current_page, 1);
    assert_eq!(view.page_items.len(), 9);
}

#[tokio::test]
async fn test_non_array_payload_fails_load() {
    let api = MemoryApi::new(json!({"items": []}));
    let mut manager: ListManager<Narcotic> = ListManager::new(PageState::default());
    manager.load(&api).await;

    assert!(matches!(
        manager.load_state(),
        LoadState::Failed { status: None, .. }
    ));
}

#[tokio::test]
async fn test_weight_sort_ignores_non_numeric_weights() {
    let payload = Value::Array(
        (1..=200)
            .map(|i| {
                let weight = if i % 7 == 0 {
                    json!("NaN")
                } else {
                    json!(format!("{}.5", (i * 53) % 97))
                };
                json!({"id": i, "drug_type": "sample", "weight_grams": weight})
            })
            .collect(),
    );
    let api = MemoryApi::new(payload);
    let mut manager: ListManager<Narcotic> = loaded(&api, 100).await;
    manager.set_sort(SortOrder::Ascending("weight_grams".to_string()));

    let mut sorted = Vec::new();
    for page in 1..=2 {
        assert!(manager.go_to_page(page));
        sorted.extend(manager.view().page_items);
    }
    let weights: Vec<f64> = sorted.iter().filter_map(|n| n.weight_grams).collect();

    assert_eq!(weights.len(), 200 - 200 / 7);
    assert!(weights.windows(2).all(|pair| pair[0] <= pair[1]));
    // Unparseable weights sort as missing, after every number
    assert!(sorted[weights.len()..].iter().all(|n| n.weight_grams.is_none()));
}

fn history_payload() -> Value {
    json!([
        {"id": 101, "discovery_date": "2024-03-09", "province_name": "เชียงใหม่", "quantity": "3"},
        {"id": 102, "discovery_date": "2024-04-01", "province_name": "ลำปาง", "quantity": 1}
    ])
}

fn located_draft() -> DiscoveryDraft {
    DiscoveryDraft {
        subdistrict_id: Some(500101),
        latitude: Some(18.79),
        longitude: Some(98.98),
        quantity: Some(4.0),
        ..DiscoveryDraft::default()
    }
}

#[tokio::test]
async fn test_invalid_draft_sends_no_request() {
    let api = MemoryApi::new(history_payload());
    let mut manager: ListManager<DiscoveryRecord> = loaded(&api, 10).await;
    let draft = DiscoveryDraft {
        latitude: None,
        ..located_draft()
    };

    let err = submit_draft(&api, &mut manager, &draft, SaveTarget::New)
        .await
        .unwrap_err();

    match err {
        CatalogError::Validation { field, .. } => assert_eq!(field, "latitude"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(api.saves.load(Ordering::SeqCst), 0);
    assert_eq!(manager.items().len(), 2);
}

#[tokio::test]
async fn test_created_record_joins_collection() {
    let api = MemoryApi::new(history_payload());
    let mut manager: ListManager<DiscoveryRecord> = loaded(&api, 10).await;

    let notification = submit_draft(&api, &mut manager, &located_draft(), SaveTarget::New)
        .await
        .unwrap();

    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.message, "Item 900 was created.");
    assert_eq!(api.saves.load(Ordering::SeqCst), 1);
    assert_eq!(ids(manager.items()), vec![101, 102, 900]);
    assert_eq!(manager.find(ItemId(900)).unwrap().quantity, Some(4.0));
}

#[tokio::test]
async fn test_updated_record_replaces_existing() {
    let api = MemoryApi::new(history_payload());
    let mut manager: ListManager<DiscoveryRecord> = loaded(&api, 10).await;
    let draft = DiscoveryDraft {
        quantity: Some(7.0),
        ..DiscoveryDraft::default()
    };

    let notification = submit_draft(&api, &mut manager, &draft, SaveTarget::Existing(ItemId(102)))
        .await
        .unwrap();

    assert!(notification.is_success());
    assert_eq!(manager.items().len(), 2);
    assert_eq!(manager.find(ItemId(102)).unwrap().quantity, Some(7.0));
}

#[tokio::test]
async fn test_rejected_save_shows_server_detail() {
    let api = MemoryApi::new(history_payload()).failing_save(CatalogError::Api(
        ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"msg": "Subdistrict not found"}]}"#,
        ),
    ));
    let mut manager: ListManager<DiscoveryRecord> = loaded(&api, 10).await;

    let notification = submit_draft(&api, &mut manager, &located_draft(), SaveTarget::New)
        .await
        .unwrap();

    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "Subdistrict not found");
    assert_eq!(ids(manager.items()), vec![101, 102]);
}

#[tokio::test]
async fn test_expired_session_during_save_is_an_error() {
    let api = MemoryApi::new(history_payload()).failing_save(CatalogError::SessionExpired);
    let mut manager: ListManager<DiscoveryRecord> = loaded(&api, 10).await;

    let err = submit_draft(&api, &mut manager, &located_draft(), SaveTarget::New)
        .await
        .unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(manager.items().len(), 2);
}
