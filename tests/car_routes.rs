mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, TestClient};

async fn add_car(client: &mut TestClient, brand: &str, model: &str, motor: &str) -> Value {
    let res = client
        .post(
            "/cars",
            json!({ "brand": brand, "model": model, "motor": motor }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.json);
    res.json
}

fn brands(list: &Value) -> Vec<String> {
    list["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|car| car["brand"].as_str().expect("brand").to_string())
        .collect()
}

async fn app_with_owner() -> (TestApp, TestClient) {
    let app = TestApp::spawn().await;
    app.create_user("owner@example.com", "owner", false).await;
    let client = app.login("owner").await;
    (app, client)
}

#[tokio::test]
async fn create_returns_the_record_owned_by_the_caller() {
    let (app, mut client) = app_with_owner().await;
    let owner = app
        .daos()
        .user()
        .find_by_username("owner")
        .await
        .expect("lookup")
        .expect("owner exists");

    let car = add_car(&mut client, " Audi ", "A4", "Diesel").await;

    assert_eq!(car["brand"], "Audi");
    assert_eq!(car["model"], "A4");
    assert_eq!(car["user"], owner.id.to_string());
    assert!(car["createdAt"].is_string());
    assert!(car["updatedAt"].is_string());
}

#[tokio::test]
async fn create_rejects_blank_and_missing_fields() {
    let (_app, mut client) = app_with_owner().await;

    let res = client
        .post("/cars", json!({ "brand": "  ", "model": "A4" }))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json["detail"]["brand"].is_array());
    assert!(res.json["detail"]["motor"].is_array());
    assert!(res.json["detail"].get("model").is_none());
}

#[tokio::test]
async fn filters_match_alternatives_case_insensitively() {
    let (app, mut client) = app_with_owner().await;
    add_car(&mut client, "Audi", "A4", "Diesel").await;
    add_car(&mut client, "Audi", "Q5", "Hybrid").await;
    add_car(&mut client, "Porsche", "911", "Petrol").await;

    let res = client.get("/cars?brand=Audi-Porsche&motor=Diesel").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["count"], 1);
    assert_eq!(res.json["data"][0]["model"], "A4");

    let res = client.get("/cars?brand=aud-%20-&motor=hyb").await;
    assert_eq!(res.json["count"], 1);
    assert_eq!(res.json["data"][0]["model"], "Q5");

    let res = client.get("/cars").await;
    assert_eq!(res.json["count"], 3);
    assert_eq!(brands(&res.json), ["Porsche", "Audi", "Audi"]);

    app.create_user("stranger@example.com", "stranger", false).await;
    let mut stranger = app.login("stranger").await;
    let res = stranger.get("/cars").await;
    assert_eq!(res.json["count"], 0);
    assert_eq!(res.json["pages"], 1);
    assert_eq!(res.json["page"], 1);
}

#[tokio::test]
async fn like_wildcards_are_matched_literally() {
    let (_app, mut client) = app_with_owner().await;
    add_car(&mut client, "Audi", "A4", "Diesel").await;
    add_car(&mut client, "100%_EV", "Proto", "Electric").await;

    let res = client.get("/cars?brand=%25").await;
    assert_eq!(res.json["count"], 1);
    assert_eq!(res.json["data"][0]["brand"], "100%_EV");

    let res = client.get("/cars?brand=_").await;
    assert_eq!(res.json["count"], 1);
}

#[tokio::test]
async fn pagination_clamps_out_of_range_pages() {
    let (_app, mut client) = app_with_owner().await;
    for n in 0..12 {
        add_car(&mut client, &format!("Brand{n}"), "M", "Petrol").await;
    }

    for query in ["/cars", "/cars?page=abc", "/cars?page=0", "/cars?page=-3"] {
        let res = client.get(query).await;
        assert_eq!(res.json["page"], 1, "{query}");
        assert_eq!(res.json["data"].as_array().map(Vec::len), Some(9), "{query}");
        assert_eq!(res.json["count"], 12);
        assert_eq!(res.json["pages"], 2);
        assert_eq!(res.json["page_size"], 9);
    }

    let res = client.get("/cars?page=999").await;
    assert_eq!(res.json["page"], 2);
    assert_eq!(res.json["data"].as_array().map(Vec::len), Some(3));
    assert_eq!(res.json["count"], 12);
    assert_eq!(res.json["pages"], 2);
    // Oldest cars land on the last page.
    assert_eq!(brands(&res.json), ["Brand2", "Brand1", "Brand0"]);
}

#[tokio::test]
async fn page_size_override_is_capped() {
    let (_app, mut client) = app_with_owner().await;
    for n in 0..5 {
        add_car(&mut client, &format!("Brand{n}"), "M", "Petrol").await;
    }

    let res = client.get("/cars?page_size=2&page=3").await;
    assert_eq!(res.json["page_size"], 2);
    assert_eq!(res.json["pages"], 3);
    assert_eq!(brands(&res.json), ["Brand0"]);

    let res = client.get("/cars?page_size=100000").await;
    assert_eq!(res.json["page_size"], 100);
    assert_eq!(res.json["pages"], 1);
}

#[tokio::test]
async fn records_of_other_users_are_not_found() {
    let (app, mut owner) = app_with_owner().await;
    let car = add_car(&mut owner, "Audi", "A4", "Diesel").await;
    let id = car["id"].as_str().expect("id").to_string();

    app.create_user("other@example.com", "other", false).await;
    let mut other = app.login("other").await;
    let not_found = "Car note with the given car id and user id does not exist";

    let res = other.get(&format!("/cars/{id}")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json["detail"], not_found);

    let res = other
        .put(
            &format!("/cars/{id}"),
            json!({ "brand": "Fiat", "model": "Panda", "motor": "Petrol" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = other.delete(&format!("/cars/{id}"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = owner.get("/cars/not-a-uuid").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json["detail"], not_found);

    assert_eq!(owner.get(&format!("/cars/{id}")).await.json["brand"], "Audi");
}

#[tokio::test]
async fn owner_updates_and_deletes() {
    let (_app, mut client) = app_with_owner().await;
    let car = add_car(&mut client, "Audi", "A4", "Diesel").await;
    let path = format!("/cars/{}", car["id"].as_str().expect("id"));

    let res = client
        .put(&path, json!({ "brand": "Audi", "model": "", "motor": "Diesel" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json["detail"]["model"].is_array());

    let res = client
        .put(&path, json!({ "brand": "Audi", "model": "A6", "motor": "Hybrid" }))
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = client.get(&path).await;
    assert_eq!(res.json["model"], "A6");
    assert_eq!(res.json["motor"], "Hybrid");
    assert_eq!(res.json["createdAt"], car["createdAt"]);

    assert_eq!(client.delete(&path, None).await.status, StatusCode::NO_CONTENT);
    assert_eq!(client.get(&path).await.status, StatusCode::NOT_FOUND);
    assert_eq!(client.delete(&path, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_sees_and_deletes_every_car() {
    let (app, mut owner) = app_with_owner().await;
    add_car(&mut owner, "Audi", "A4", "Diesel").await;
    let porsche = add_car(&mut owner, "Porsche", "911", "Petrol").await;
    app.create_user("boss@example.com", "boss", true).await;
    let mut admin = app.login("boss").await;

    let res = admin.get("/cars/admin?brand=porsche").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["count"], 1);

    let path = format!("/cars/admin/{}", porsche["id"].as_str().expect("id"));
    let res = admin.get(&path).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["model"], "911");

    assert_eq!(admin.delete(&path, None).await.status, StatusCode::NO_CONTENT);
    let res = admin.get(&path).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json["detail"], "Car note with the given car id does not exist");

    // The admin's own list stays scoped to the admin.
    assert_eq!(admin.get("/cars").await.json["count"], 0);
    assert_eq!(owner.get("/cars").await.json["count"], 1);
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let (_app, mut client) = app_with_owner().await;

    let res = client.get("/cars/admin").await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(
        res.json["detail"],
        "You do not have permission to perform this action."
    );
}
