mod common;

use common::{document, documents, wait_for_total};
use document_viewer::models::{Document, Page};
use document_viewer::services::transport::{MockDocumentApi, MockPushSource};
use document_viewer::store::DocumentStore;
use document_viewer::view::DocumentListController;
use std::sync::Arc;

struct Fixture {
    api: Arc<MockDocumentApi>,
    push: Arc<MockPushSource>,
    store: Arc<DocumentStore>,
    controller: DocumentListController,
}

async fn active_controller(content: Vec<Document>, total: u64) -> Fixture {
    let api = Arc::new(MockDocumentApi::new());
    let push = Arc::new(MockPushSource::new());
    api.set_page(0, Page::new(content, 0, 10, total));

    let store = Arc::new(DocumentStore::new(api.clone(), push.clone(), 10));
    store.initialize().await.await.unwrap();

    let mut controller = DocumentListController::new(store.clone());
    controller.activate();

    Fixture {
        api,
        push,
        store,
        controller,
    }
}

#[tokio::test]
async fn total_pages_follow_the_live_total() {
    let fx = active_controller(Vec::new(), 0).await;
    assert_eq!(fx.controller.total_pages(), 1);

    let fx = active_controller(documents(1, 10), 20).await;
    assert_eq!(fx.controller.total_pages(), 2);

    let mut fx = active_controller(documents(1, 10), 25).await;
    assert_eq!(fx.controller.total_pages(), 3);

    // Five pushes take 25 to 30: still three pages. One more makes four.
    for id in 100..106 {
        fx.push.push_document(&document(id, "1", "2024-01-01"));
    }
    wait_for_total(&fx.store, 31).await;
    while fx.controller.total_items() != 31 {
        assert!(fx.controller.next_update().await);
    }
    assert_eq!(fx.controller.total_pages(), 4);
}

#[tokio::test]
async fn out_of_range_pages_are_ignored() {
    let mut fx = active_controller(documents(1, 10), 25).await;
    assert_eq!(fx.controller.total_pages(), 3);
    let requests_before = fx.api.requests().len();

    assert!(fx.controller.change_page(-1).is_none());
    assert!(fx.controller.change_page(3).is_none());

    assert_eq!(fx.controller.current_page(), 0);
    assert_eq!(fx.api.requests().len(), requests_before);
}

#[tokio::test]
async fn change_page_delegates_to_store() {
    let mut fx = active_controller(documents(1, 10), 25).await;
    fx.api.set_page(2, Page::new(documents(21, 5), 2, 10, 25));

    fx.controller
        .change_page(2)
        .expect("page 2 is in range")
        .await
        .unwrap();
    assert!(fx.controller.next_update().await);

    assert_eq!(fx.controller.current_page(), 2);
    assert_eq!(fx.store.cursor().page_index, 2);
    assert_eq!(fx.controller.documents().len(), 5);
    assert_eq!(fx.controller.documents()[0].id, Some(21));

    let last = fx.api.requests().pop().unwrap();
    assert_eq!((last.page, last.size, last.sort), (2, 10, "createdAt,desc"));
}

#[tokio::test]
async fn filters_narrow_the_current_page_only() {
    let content = vec![
        document(1, "123", "2024-01-01"),
        document(2, "456", "2024-01-01"),
        document(3, "123", "2024-02-01"),
    ];
    let mut fx = active_controller(content, 3).await;
    let requests_before = fx.api.requests().len();

    fx.controller.set_ruc_filter("123");
    fx.controller.set_date_filter("2024-01-01");
    let ids: Vec<_> = fx.controller.filtered_documents().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![Some(1)]);

    fx.controller.set_date_filter("");
    let ids: Vec<_> = fx.controller.filtered_documents().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![Some(1), Some(3)]);

    fx.controller.clear_filters();
    let ids: Vec<_> = fx.controller.filtered_documents().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);

    assert_eq!(fx.controller.total_pages(), 1);
    assert_eq!(fx.api.requests().len(), requests_before);
}

#[tokio::test]
async fn pushed_documents_pass_through_active_filter() {
    let mut fx = active_controller(vec![document(1, "123", "2024-01-01")], 1).await;
    fx.controller.set_ruc_filter("999");
    assert!(fx.controller.filtered_documents().is_empty());

    fx.push.push_document(&document(2, "199901", "2024-05-05"));
    assert!(fx.controller.next_update().await);

    let ids: Vec<_> = fx.controller.filtered_documents().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![Some(2)]);
    assert_eq!(fx.controller.total_items(), 2);
}

#[tokio::test]
async fn selection_and_image_source() {
    let mut fx = active_controller(documents(1, 2), 2).await;
    assert!(fx.controller.selected_document().is_none());

    let mut picked = fx.controller.documents()[1].clone();
    fx.controller.select_document(picked.clone());
    assert_eq!(fx.controller.selected_document(), Some(&picked));

    assert_eq!(
        fx.controller.image_source(&picked),
        "data:image/jpeg;base64,/9j/4AAQSkZJRg=="
    );
    picked.image_base64 = "data:image/png;base64,iVBORw0KGgo=".to_string();
    assert_eq!(
        fx.controller.image_source(&picked),
        "data:image/png;base64,iVBORw0KGgo="
    );
}

#[tokio::test]
async fn deactivate_releases_both_channels() {
    let mut fx = active_controller(documents(1, 2), 2).await;
    assert!(fx.controller.is_active());

    fx.controller.deactivate();
    assert!(!fx.controller.is_active());
    assert!(!fx.controller.next_update().await);

    // Updates while inactive are picked up on reactivation.
    fx.push.push_document(&document(30, "1", "2024-01-01"));
    wait_for_total(&fx.store, 3).await;
    assert_eq!(fx.controller.total_items(), 2);

    fx.controller.activate();
    assert_eq!(fx.controller.total_items(), 3);
    assert_eq!(fx.controller.documents()[0].id, Some(30));
}
