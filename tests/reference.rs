pub mod common;

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

fn entry() -> serde_json::Value {
    json!({
        "name": "Ruwan",
        "email": "ruwan@uni.edu",
        "batch": "foundation",
        "ref-name": "Dilini",
    })
}

#[tokio::test]
async fn issues_entry_with_open_undo_window() {
    let app = common::app().spawn().await;
    app.webhook.reply(
        common::BUY_REF,
        json!({ "success": true, "data": { "id": "REF-9" } }),
    );

    let created = app.client.create_ref(entry()).await.unwrap();

    assert_eq!(created.id.as_str(), "REF-9");
    assert_eq!(created.name, "Ruwan");
    assert_eq!(created.remaining_secs, 30);
    assert!(created.deletable);
    assert_eq!(app.webhook.calls(common::BUY_REF), [entry()]);

    let msg = app.client.delete_ref("REF-9").await.unwrap();
    assert_eq!(
        msg.message,
        "The ticket entry has been successfully removed.",
    );
    assert_eq!(
        app.client.get_ref("REF-9").await.unwrap_err().status,
        StatusCode::NOT_FOUND,
    );
}

#[tokio::test]
async fn missing_ticket_id_is_an_error() {
    let app = common::app().spawn().await;
    app.webhook
        .reply(common::BUY_REF, json!({ "success": true, "data": {} }));

    let failure = app.client.create_ref(entry()).await.unwrap_err();

    assert_eq!(failure.status, StatusCode::BAD_GATEWAY);
    assert_eq!(failure.body.message, "API did not return a ticket ID");
}

#[tokio::test]
async fn rejects_entry_without_reference_name() {
    let app = common::app().spawn().await;

    let failure = app
        .client
        .create_ref(json!({
            "name": "Ruwan",
            "email": "ruwan@uni.edu",
            "batch": "71",
        }))
        .await
        .unwrap_err();

    assert_eq!(failure.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(failure.body.fields.unwrap().contains_key("ref-name"));
    assert_eq!(app.webhook.total_calls(), 0);
}

#[tokio::test]
async fn delete_is_refused_after_window_closes() {
    let app = common::app()
        .undo_window(Duration::from_millis(200))
        .spawn()
        .await;
    app.webhook.reply(
        common::BUY_REF,
        json!({ "success": true, "data": { "id": "REF-1" } }),
    );
    app.client.create_ref(entry()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let window = app.client.get_ref("REF-1").await.unwrap();
    assert_eq!(window.remaining_secs, 0);
    assert!(!window.deletable);

    let failure = app.client.delete_ref("REF-1").await.unwrap_err();
    assert_eq!(failure.status, StatusCode::GONE);
    assert_eq!(app.webhook.total_calls(), 1);
}

#[tokio::test]
async fn failed_delete_keeps_window_open() {
    let app = common::app().spawn().await;
    app.webhook.reply(
        common::BUY_REF,
        json!({ "success": true, "data": { "id": "REF-2" } }),
    );
    app.webhook.reply(
        &format!("{}/REF-2", common::BUY_REF),
        json!({ "success": false }),
    );
    app.client.create_ref(entry()).await.unwrap();

    let failure = app.client.delete_ref("REF-2").await.unwrap_err();

    assert_eq!(failure.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(failure.body.message, "Could not delete the entry.");
    assert!(app.client.get_ref("REF-2").await.unwrap().deletable);
}

#[tokio::test]
async fn unknown_entry_cannot_be_deleted() {
    let app = common::app().spawn().await;

    let failure = app.client.delete_ref("nope").await.unwrap_err();

    assert_eq!(failure.status, StatusCode::NOT_FOUND);
    assert_eq!(app.webhook.total_calls(), 0);
}
