use crate::shared::infrastructure::kv_store::in_memory::InMemoryKvStore;
use crate::shell::http::{app, router};
use crate::tests::fixtures::make_test_state;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn get(app: &Router, uri: &str) -> String {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn records_lists_and_purges_calculations() {
    let store = InMemoryKvStore::new();
    let app = router(make_test_state(&store, &[300, 5, 42, 17]));

    get(&app, "/calc/sum/1/2").await;
    get(&app, "/calc/subtract/1/2").await;
    get(&app, "/calc/multiply/6/7").await;
    get(&app, "/calc/divide/-9/2").await;

    let history = get(&app, "/calc/history").await;
    let listed: Vec<_> = history
        .lines()
        .filter(|line| line.starts_with("Stored key / value"))
        .collect();
    assert_eq!(
        listed,
        vec![
            "Stored key / value: operation_05 = -1",
            "Stored key / value: operation_17 = -4",
            "Stored key / value: operation_300 = 3",
            "Stored key / value: operation_42 = 42",
        ]
    );

    let purge = get(&app, "/calc/deleteAllUserData").await;
    assert_eq!(
        purge
            .lines()
            .filter(|line| line.starts_with("Key deleted successfully"))
            .count(),
        4
    );
    assert_eq!(store.delete_calls(), 4);

    let second_purge = get(&app, "/calc/deleteAllUserData").await;
    assert!(second_purge.contains("Nothing to delete here"));
    assert_eq!(store.delete_calls(), 4);

    let empty_history = get(&app, "/calc/history").await;
    assert_eq!(empty_history, "ETCD Client connected\nETCD Client disconnected\n");
}

#[tokio::test]
async fn overwrites_a_record_when_the_suffix_repeats() {
    let store = InMemoryKvStore::new();
    let app = router(make_test_state(&store, &[8, 8]));

    get(&app, "/calc/sum/1/1").await;
    get(&app, "/calc/multiply/5/5").await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("operation_08").unwrap(), "25");
    assert!(!get(&app, "/calc/history").await.contains("= 2\n"));
}

#[tokio::test]
async fn narrates_a_full_calculation() {
    let store = InMemoryKvStore::new();
    let app = router(make_test_state(&store, &[9]));

    let body = get(&app, "/calc/multiply/-3/4").await;

    assert_eq!(
        body,
        "ETCD Client connected\n\
         Key to ETCD: operation_09\n\
         Value to ETCD: -12\n\
         Successfully PUT on ETCD: revision 1\n\
         ETCD Client disconnected\n\
         The multiplication result is: -12\n"
    );
}

#[tokio::test]
async fn ignores_unknown_routes() {
    let store = InMemoryKvStore::new();
    let app = router(make_test_state(&store, &[]));

    let response = app
        .oneshot(Request::get("/calc/modulo/1/2").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.connect_calls(), 0);
}

#[tokio::test]
async fn tolerates_a_trailing_slash() {
    let store = InMemoryKvStore::new();
    let service = app(make_test_state(&store, &[4]));

    for (uri, expected) in [
        ("/calc/sum/1/2/", "The sum result is: 3\n"),
        ("/calc/history/", "Stored key / value: operation_04 = 3\n"),
        ("/calc/deleteAllUserData/", "Key deleted successfully: operation_04\n"),
    ] {
        let response = service
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains(expected), "{uri}: {body}");
    }
    assert!(store.snapshot().await.is_empty());
}
