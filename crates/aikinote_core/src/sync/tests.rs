use super::*;
use crate::models::tag::{PageTag, TagCategory};
use crate::models::page::TrainingPage;
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

type Scripted<T> = Mutex<VecDeque<Result<ApiResponse<T>, SyncError>>>;

fn next<T>(script: &Scripted<T>) -> Result<ApiResponse<T>, SyncError> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(SyncError::Transport("unscripted call".to_string())))
}

#[derive(Default)]
struct MockBackend {
    pages: Scripted<TrainingPagesList>,
    creates: Scripted<TrainingPageWithTags>,
    updates: Scripted<TrainingPageWithTags>,
    deletes: Scripted<bool>,
    queries: Mutex<Vec<ListPagesQuery>>,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    /// Consumed one per gated call, in call order.
    gates: Mutex<VecDeque<Arc<Notify>>>,
}

impl MockBackend {
    fn push_pages(&self, response: Result<ApiResponse<TrainingPagesList>, SyncError>) {
        self.pages.lock().unwrap().push_back(response);
    }

    /// Hold the next backend call until the returned gate is notified.
    fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    async fn wait_gate(&self) {
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

impl PagesBackend for MockBackend {
    async fn get_pages(
        &self,
        query: &ListPagesQuery,
    ) -> Result<ApiResponse<TrainingPagesList>, SyncError> {
        self.queries.lock().unwrap().push(query.clone());
        let response = next(&self.pages);
        self.wait_gate().await;
        response
    }

    async fn create_page(
        &self,
        _request: &CreatePageRequest,
    ) -> Result<ApiResponse<TrainingPageWithTags>, SyncError> {
        next(&self.creates)
    }

    async fn update_page(
        &self,
        request: &UpdatePageRequest,
    ) -> Result<ApiResponse<TrainingPageWithTags>, SyncError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        // Unscripted updates echo the request back as the saved page.
        let response = self
            .updates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::Success(remote(&request.id, &request.title))));
        self.wait_gate().await;
        response
    }

    async fn delete_page(
        &self,
        _page_id: &str,
        _user_id: &str,
    ) -> Result<ApiResponse<bool>, SyncError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let response = next(&self.deletes);
        self.wait_gate().await;
        response
    }
}

#[derive(Default, Clone)]
struct RecordingAlerts(Arc<Mutex<Vec<String>>>);

impl RecordingAlerts {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

fn remote(id: &str, title: &str) -> TrainingPageWithTags {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    TrainingPageWithTags {
        page: TrainingPage {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            title: title.to_string(),
            content: format!("{title} content"),
            comment: String::new(),
            created_at: created,
            updated_at: created,
        },
        tags: vec![PageTag {
            name: "kotegaeshi".to_string(),
            category: TagCategory::Waza,
        }],
    }
}

fn batch(start: usize, len: usize) -> Result<ApiResponse<TrainingPagesList>, SyncError> {
    Ok(ApiResponse::Success(TrainingPagesList {
        training_pages: (start..start + len)
            .map(|i| remote(&format!("p-{i}"), &format!("Page {i}")))
            .collect(),
    }))
}

fn store(backend: MockBackend) -> (TrainingPages<MockBackend, RecordingAlerts>, RecordingAlerts) {
    let alerts = RecordingAlerts::default();
    let pages = TrainingPages::with_alerts(backend, alerts.clone()).with_zone(DateZone::utc());
    (pages, alerts)
}

fn update_request(id: &str, title: &str) -> UpdatePageRequest {
    UpdatePageRequest {
        id: id.to_string(),
        title: title.to_string(),
        content: "c".to_string(),
        user_id: "user-1".to_string(),
        ..UpdatePageRequest::default()
    }
}

async fn loaded(count: usize) -> (TrainingPages<MockBackend, RecordingAlerts>, RecordingAlerts) {
    let backend = MockBackend::default();
    backend.push_pages(batch(0, count));
    let (pages, alerts) = store(backend);
    assert!(pages.fetch_all("user-1").await);
    pages.backend().queries.lock().unwrap().clear();
    (pages, alerts)
}

#[tokio::test]
async fn fetch_all_walks_batches_until_short_batch() {
    let backend = MockBackend::default();
    backend.push_pages(batch(0, 100));
    backend.push_pages(batch(100, 100));
    backend.push_pages(batch(200, 37));
    let (pages, alerts) = store(backend);

    assert!(pages.fetch_all("user-1").await);
    assert_eq!(pages.len(), 237);
    assert!(alerts.messages().is_empty());

    let queries = pages.backend().queries.lock().unwrap().clone();
    let offsets: Vec<_> = queries.iter().map(|q| q.offset).collect();
    assert_eq!(offsets, vec![Some(0), Some(100), Some(200)]);
    assert!(queries
        .iter()
        .all(|q| q.limit == Some(FETCH_BATCH_SIZE) && q.user_id == "user-1"));

    let first = pages.get("p-0").expect("first record");
    assert_eq!(first.tags, vec!["kotegaeshi".to_string()]);
    assert_eq!(first.date.to_string(), "2024-05-01");
}

#[tokio::test]
async fn fetch_all_stops_after_empty_batch() {
    let backend = MockBackend::default();
    backend.push_pages(batch(0, 100));
    backend.push_pages(batch(100, 0));
    let (pages, _) = store(backend);

    assert_eq!(pages.try_fetch_all("user-1").await, Ok(100));
    assert_eq!(pages.backend().queries.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn fetch_all_drops_rows_repeated_across_batches() {
    let backend = MockBackend::default();
    backend.push_pages(batch(0, 100));
    backend.push_pages(batch(99, 10));
    let (pages, _) = store(backend);

    assert_eq!(pages.try_fetch_all("user-1").await, Ok(109));
}

#[tokio::test]
async fn fetch_failure_mid_loop_clears_the_list() {
    let (pages, alerts) = loaded(3).await;
    pages.backend().push_pages(batch(0, 100));
    pages
        .backend()
        .push_pages(Ok(ApiResponse::failure("database unavailable")));

    assert!(!pages.fetch_all("user-1").await);
    assert!(pages.is_empty());
    assert_eq!(alerts.messages(), vec!["database unavailable".to_string()]);
}

#[tokio::test]
async fn fetch_failure_without_message_uses_fallback() {
    let backend = MockBackend::default();
    backend.push_pages(Ok(ApiResponse::Failure(None)));
    let (pages, alerts) = store(backend);

    assert!(!pages.fetch_all("user-1").await);
    assert_eq!(alerts.messages(), vec![FETCH_FAILED_MESSAGE.to_string()]);
}

#[tokio::test]
async fn fetch_with_blank_user_makes_no_request() {
    let (pages, alerts) = store(MockBackend::default());
    assert_eq!(pages.try_fetch_all("  ").await, Err(SyncError::MissingUser));
    assert!(pages.backend().queries.lock().unwrap().is_empty());
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn create_prepends_canonical_record() {
    let (pages, _) = loaded(2).await;
    pages
        .backend()
        .creates
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::Success(remote("new", "Fresh"))));

    let request = CreatePageRequest {
        title: "Fresh".to_string(),
        content: "x".to_string(),
        user_id: "user-1".to_string(),
        ..CreatePageRequest::default()
    };
    assert!(pages.create(request).await);

    let ids: Vec<_> = pages.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["new", "p-0", "p-1"]);
}

#[tokio::test]
async fn create_failure_leaves_list_unchanged() {
    let (pages, alerts) = loaded(2).await;
    pages
        .backend()
        .creates
        .lock()
        .unwrap()
        .push_back(Err(SyncError::Transport("connection refused".to_string())));
    let before = pages.records();

    let request = CreatePageRequest {
        title: "Fresh".to_string(),
        user_id: "user-1".to_string(),
        ..CreatePageRequest::default()
    };
    assert!(!pages.create(request).await);
    assert_eq!(pages.records(), before);
    assert_eq!(alerts.messages(), vec![CREATE_FAILED_MESSAGE.to_string()]);
}

#[tokio::test]
async fn update_replaces_record_in_place() {
    let (pages, _) = loaded(3).await;
    pages
        .backend()
        .updates
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::Success(remote("p-1", "Renamed"))));

    assert!(pages.update(update_request("p-1", "Renamed")).await);

    let records = pages.records();
    let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Page 0", "Renamed", "Page 2"]);
}

#[tokio::test]
async fn update_failure_leaves_list_unchanged() {
    let (pages, alerts) = loaded(3).await;
    pages
        .backend()
        .updates
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::failure("Title is required")));
    let before = pages.records();

    assert!(!pages.update(update_request("p-1", "")).await);
    assert_eq!(pages.records(), before);
    assert_eq!(alerts.messages(), vec!["Title is required".to_string()]);
}

#[tokio::test]
async fn update_of_unknown_id_inserts_nothing() {
    let (pages, _) = loaded(1).await;
    pages
        .backend()
        .updates
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::Success(remote("elsewhere", "Other"))));

    assert!(pages.update(update_request("elsewhere", "Other")).await);
    assert_eq!(pages.len(), 1);
    assert!(pages.get("elsewhere").is_none());
}

#[tokio::test]
async fn remove_without_user_never_calls_backend() {
    let (pages, alerts) = loaded(2).await;

    assert!(!pages.remove("p-0", None).await);
    assert!(!pages.remove("p-0", Some("")).await);
    assert_eq!(pages.backend().delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pages.len(), 2);
    assert_eq!(alerts.messages().len(), 2);
    assert_eq!(alerts.messages()[0], MISSING_USER_MESSAGE);
}

#[tokio::test]
async fn remove_drops_record_on_success() {
    let (pages, _) = loaded(3).await;
    pages
        .backend()
        .deletes
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::Success(true)));

    assert!(pages.remove("p-1", Some("user-1")).await);
    let ids: Vec<_> = pages.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["p-0", "p-2"]);
}

#[tokio::test]
async fn remove_reporting_false_is_a_failure() {
    let (pages, alerts) = loaded(2).await;
    pages
        .backend()
        .deletes
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::Success(false)));

    assert!(!pages.remove("p-1", Some("user-1")).await);
    assert_eq!(pages.len(), 2);
    assert_eq!(alerts.messages(), vec![DELETE_FAILED_MESSAGE.to_string()]);
}

#[tokio::test]
async fn later_update_wins_when_its_response_arrives_first() {
    let (pages, alerts) = loaded(3).await;
    let first_gate = pages.backend().gate();
    let second_gate = pages.backend().gate();

    let (first, second, ()) = tokio::join!(
        pages.update(update_request("p-1", "First edit")),
        pages.update(update_request("p-1", "Second edit")),
        async {
            tokio::task::yield_now().await;
            second_gate.notify_one();
            tokio::task::yield_now().await;
            first_gate.notify_one();
        }
    );

    assert!(!first);
    assert!(second);
    assert_eq!(pages.backend().update_calls.load(Ordering::SeqCst), 2);
    assert_eq!(pages.get("p-1").expect("record").title, "Second edit");
    assert!(pages.updates().is_empty());
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn earlier_update_response_never_applies_after_a_newer_update_is_issued() {
    let (pages, alerts) = loaded(3).await;
    let first_gate = pages.backend().gate();
    let second_gate = pages.backend().gate();
    let first_request = update_request("p-1", "First edit");
    let second_request = update_request("p-1", "Second edit");

    let (first, second, ()) = tokio::join!(
        pages.try_update(&first_request),
        pages.try_update(&second_request),
        async {
            tokio::task::yield_now().await;
            first_gate.notify_one();
            tokio::task::yield_now().await;
            assert_eq!(pages.get("p-1").expect("record").title, "Page 1");
            second_gate.notify_one();
        }
    );

    assert_eq!(first, Err(SyncError::Superseded));
    assert_eq!(second.expect("second update").title, "Second edit");
    assert_eq!(pages.get("p-1").expect("record").title, "Second edit");
    assert_eq!(pages.backend().update_calls.load(Ordering::SeqCst), 2);
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn sequential_updates_each_apply() {
    let (pages, _) = loaded(2).await;

    assert!(pages.update(update_request("p-0", "One")).await);
    assert!(pages.update(update_request("p-0", "Two")).await);
    assert_eq!(pages.get("p-0").expect("record").title, "Two");
    assert!(pages.updates().is_empty());
}

#[tokio::test]
async fn duplicate_remove_is_rejected_with_an_alert() {
    let (pages, alerts) = loaded(3).await;
    pages
        .backend()
        .deletes
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::Success(true)));
    let gate = pages.backend().gate();

    let (first, second) = tokio::join!(pages.remove("p-1", Some("user-1")), async {
        tokio::task::yield_now().await;
        let second = pages.remove("p-1", Some("user-1")).await;
        gate.notify_one();
        second
    });

    assert!(first);
    assert!(!second);
    assert_eq!(pages.backend().delete_calls.load(Ordering::SeqCst), 1);
    assert_eq!(alerts.messages(), vec![DELETE_IN_PROGRESS_MESSAGE.to_string()]);
    let ids: Vec<_> = pages.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["p-0", "p-2"]);
    assert!(pages.in_flight().is_empty());
}

#[tokio::test]
async fn earlier_fetch_is_discarded_when_a_later_one_starts() {
    let backend = MockBackend::default();
    backend.push_pages(batch(0, 5));
    backend.push_pages(batch(100, 3));
    let first_gate = backend.gate();
    let second_gate = backend.gate();
    let (pages, alerts) = store(backend);

    let (first, second, ()) = tokio::join!(
        pages.fetch_all("user-1"),
        pages.fetch_all("user-1"),
        async {
            tokio::task::yield_now().await;
            first_gate.notify_one();
            tokio::task::yield_now().await;
            assert!(pages.is_empty());
            second_gate.notify_one();
        }
    );

    assert!(!first);
    assert!(second);
    let ids: Vec<_> = pages.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["p-100", "p-101", "p-102"]);
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn invalidated_fetch_does_not_touch_the_list() {
    let backend = MockBackend::default();
    backend
        .creates
        .lock()
        .unwrap()
        .push_back(Ok(ApiResponse::Success(remote("kept", "Kept"))));
    backend.push_pages(batch(0, 5));
    let gate = backend.gate();
    let (pages, alerts) = store(backend);

    let request = CreatePageRequest {
        title: "Kept".to_string(),
        user_id: "user-1".to_string(),
        ..CreatePageRequest::default()
    };
    assert!(pages.create(request).await);

    let (fetched, ()) = tokio::join!(pages.fetch_all("user-1"), async {
        tokio::task::yield_now().await;
        pages.invalidate();
        gate.notify_one();
    });

    assert!(!fetched);
    assert_eq!(pages.records().len(), 1);
    assert!(pages.get("kept").is_some());
    assert!(alerts.messages().is_empty());
}
