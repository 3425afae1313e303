//! Integration tests for the Lore Registry bounded context.

mod common;

use axum::http::StatusCode;
use serde_json::json;

fn entry(title: &str, category: &str) -> serde_json::Value {
    json!({
        "owner": "player-1",
        "entry": {
            "title": title,
            "category": category,
            "content": "Fragments recovered from the archive.",
            "tags": ["ruins"],
            "related_characters": ["Maren"]
        }
    })
}

#[tokio::test]
async fn test_discover_then_rediscover_conflicts_but_new_category_succeeds() {
    let app = common::build_test_app();

    let (status, discovered) = common::post_json(
        &app,
        "/api/v1/lore/discover",
        &entry("The Lost Civilization", "History"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(discovered["discovered"], true);

    let (status, body) = common::post_json(
        &app,
        "/api/v1/lore/discover",
        &entry("The Lost Civilization", "History"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_discovered");

    let (status, _) = common::post_json(
        &app,
        "/api/v1/lore/discover",
        &entry("The Lost Civilization", "Myth"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_lorebook_search_and_stats() {
    let app = common::build_test_app();
    common::post_json(
        &app,
        "/api/v1/lore/discover",
        &entry("The Lost Civilization", "History"),
    )
    .await;
    common::post_json(&app, "/api/v1/lore/discover", &entry("Songs of the Deep", "Myth")).await;

    let (status, lorebook) = common::get_json(&app, "/api/v1/lore/player-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lorebook.as_array().unwrap().len(), 2);

    let (_, by_tag) = common::get_json(&app, "/api/v1/lore/player-1?tags=ruins").await;
    assert_eq!(by_tag.as_array().unwrap().len(), 2);

    let (_, by_category) = common::get_json(&app, "/api/v1/lore/player-1?category=Myth").await;
    assert_eq!(by_category.as_array().unwrap().len(), 1);
    assert_eq!(by_category[0]["title"], "Songs of the Deep");

    let (_, stats) = common::get_json(&app, "/api/v1/lore/player-1/stats").await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["by_category"]["History"], 1);

    let (_, categories) = common::get_json(&app, "/api/v1/lore/player-1/categories").await;
    assert_eq!(categories, json!(["History", "Myth"]));

    let (_, tags) = common::get_json(&app, "/api/v1/lore/player-1/tags").await;
    assert_eq!(tags, json!(["ruins"]));
}

#[tokio::test]
async fn test_update_corrects_fields_and_missing_entry_is_404() {
    let app = common::build_test_app();
    common::post_json(
        &app,
        "/api/v1/lore/discover",
        &entry("The Lost Civilization", "History"),
    )
    .await;

    let (status, updated) = common::post_json(
        &app,
        "/api/v1/lore/update",
        &json!({
            "owner": "player-1",
            "title": "The Lost Civilization",
            "category": "History",
            "patch": { "content": "Corrected translation." }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "Corrected translation.");
    assert_eq!(updated["discovered"], true);

    let (status, _) = common::post_json(
        &app,
        "/api/v1/lore/update",
        &json!({
            "owner": "player-2",
            "title": "The Lost Civilization",
            "category": "History",
            "patch": {}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
