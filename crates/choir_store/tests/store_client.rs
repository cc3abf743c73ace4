use choir_store::records::{Announcement, MealSignup, MealStatus, Priority};
use choir_store::{
    Collection, Direction, FilterOp, InMemoryStore, Query, StoreClient, StoreConfig, StoreError,
};
use serde_json::json;

fn client() -> StoreClient<InMemoryStore> {
    StoreClient::new(StoreConfig::default(), InMemoryStore::new())
}

#[tokio::test]
async fn crud_round_trip_through_the_client() {
    let client = client();
    let created = client
        .create("announcements", json!({"title": "연습 안내", "priority": "medium"}))
        .await
        .expect("create");
    let id = created["id"].as_str().expect("id").to_string();

    let updated = client
        .update("announcements", &id, json!({"content": "2시 연습"}))
        .await
        .expect("update");
    assert_eq!(updated["title"], "연습 안내");
    assert_eq!(updated["content"], "2시 연습");

    assert!(client.delete("announcements", &id).await.expect("delete"));
    assert_eq!(client.read("announcements", &id).await.expect("read"), None);
}

#[tokio::test]
async fn update_of_missing_document_is_not_found_and_not_retried() {
    let res = client().update("absences", "ghost", json!({"reason": "x"})).await;
    assert!(matches!(res, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn query_filters_orders_and_limits() {
    let client = client();
    for (id, date, count) in [
        ("m1", "2024-09-22", 3),
        ("m2", "2024-09-29", 0),
        ("m3", "2024-10-06", 6),
    ] {
        client
            .create("mealSignups", json!({"id": id, "date": date, "count": count}))
            .await
            .unwrap();
    }

    let q = Query::new()
        .filter("count", FilterOp::Gt, json!(0))
        .order_by("date", Direction::Desc)
        .limit(1);
    let hits = client.query("mealSignups", &q).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "m3");

    let none = client
        .query("mealSignups", &Query::new().filter("count", FilterOp::Gt, json!(100)))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn typed_records_apply_defaults() {
    let client = client();
    client
        .create(
            Collection::MealSignups.name(),
            json!({"id": "m1", "members": ["김집사", "이권사"], "count": 2, "notes": null}),
        )
        .await
        .unwrap();
    client
        .create(Collection::Announcements.name(), json!({"id": "a1", "title": "공지"}))
        .await
        .unwrap();

    let signups: Vec<MealSignup> = client
        .fetch_records(Collection::MealSignups)
        .await
        .unwrap();
    assert_eq!(signups.len(), 1);
    assert_eq!(signups[0].status, MealStatus::Open);
    assert_eq!(signups[0].notes, "");

    let announcement: Option<Announcement> = client
        .fetch_record(Collection::Announcements, "a1")
        .await
        .unwrap();
    let announcement = announcement.expect("present");
    assert_eq!(announcement.priority, Priority::Low);
    assert!(announcement.is_active);

    let missing: Option<Announcement> = client
        .fetch_record(Collection::Announcements, "nope")
        .await
        .unwrap();
    assert!(missing.is_none());
}
