//! End-to-end API test driving the full router over in-memory SQLite.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use market_server::auth::JwtConfig;
use market_server::api::build_app;
use market_server::core::{Config, ServerState};
use market_server::db::DbService;

async fn test_app() -> (Router, ServerState) {
    let db = DbService::in_memory().await.unwrap();
    let config = Config {
        http_port: 0,
        database_path: ":memory:".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret-integration-test".to_string(),
            expiration_minutes: 60,
            issuer: "market-server".to_string(),
            audience: "market-web".to_string(),
        },
        environment: "test".to_string(),
    };
    let state = ServerState::with_pool(config, db.pool);
    (build_app(state.clone()), state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str, role: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/registration/",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret-password",
            "repeated_password": "secret-password",
            "type": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed: {body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user_id"].as_i64().unwrap(),
    )
}

fn offer_payload() -> Value {
    json!({
        "title": "Logo design",
        "image": null,
        "description": "Three logo tiers",
        "details": [
            {"title": "Basic logo", "revisions": 2, "delivery_time_in_days": 3,
             "price": 1000, "features": ["Logo"], "offer_type": "basic"},
            {"title": "Standard logo", "revisions": 5, "delivery_time_in_days": 5,
             "price": 2000, "features": ["Logo", "Card"], "offer_type": "standard"},
            {"title": "Premium logo", "revisions": -1, "delivery_time_in_days": 7,
             "price": 3000, "features": ["Logo", "Card", "Flyer"], "offer_type": "premium"}
        ]
    })
}

#[tokio::test]
async fn offer_order_review_flow() {
    let (app, _) = test_app().await;

    let (business_token, business_id) = register(&app, "studio", "business").await;
    let (customer_token, _customer_id) = register(&app, "buyer", "customer").await;

    // anonymous creation is rejected
    let (status, _) = send(&app, "POST", "/offers/", None, Some(offer_payload())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // customers cannot create offers
    let (status, _) = send(
        &app,
        "POST",
        "/offers/",
        Some(&customer_token),
        Some(offer_payload()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, offer) = send(
        &app,
        "POST",
        "/offers/",
        Some(&business_token),
        Some(offer_payload()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{offer}");
    let offer_id = offer["id"].as_i64().unwrap();
    assert_eq!(offer["min_price"].as_i64(), Some(1000));
    assert_eq!(offer["details"].as_array().unwrap().len(), 3);

    // anonymous list shows the offer with owner details
    let (status, page) = send(&app, "GET", "/offers/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"].as_i64(), Some(1));
    assert_eq!(
        page["results"][0]["user_details"]["username"].as_str(),
        Some("studio")
    );

    // malformed min_price yields a field-keyed validation error
    let (status, err) = send(&app, "GET", "/offers/?min_price=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["details"]["min_price"].is_string(), "{err}");

    // find the basic tier and place an order as the customer
    let detail_id = offer["details"][0]["id"].as_i64().unwrap();
    let (status, detail) = send(
        &app,
        "GET",
        &format!("/offerdetails/{detail_id}/"),
        Some(&customer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let detail_price = detail["price"].as_i64().unwrap();

    // business accounts cannot place orders
    let (status, _) = send(
        &app,
        "POST",
        "/orders/",
        Some(&business_token),
        Some(json!({"offer_detail_id": detail_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, order) = send(
        &app,
        "POST",
        "/orders/",
        Some(&customer_token),
        Some(json!({"offer_detail_id": detail_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    let order_id = order["id"].as_i64().unwrap();
    assert_eq!(order["status"].as_str(), Some("in_progress"));
    assert_eq!(order["business_user"].as_i64(), Some(business_id));
    assert_eq!(order["price"].as_i64(), Some(detail_price));

    // unknown tier is a bad request, not a 404
    let (status, _) = send(
        &app,
        "POST",
        "/orders/",
        Some(&customer_token),
        Some(json!({"offer_detail_id": 999999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the customer cannot move the status, only the business party can
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/"),
        Some(&customer_token),
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/"),
        Some(&business_token),
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"].as_str(), Some("completed"));

    // terminal states are one-way
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/"),
        Some(&business_token),
        Some(json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // public count endpoints
    let (status, counts) = send(
        &app,
        "GET",
        &format!("/orders/completed-order-count/{business_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts["completed_order_count"].as_i64(), Some(1));

    let (status, _) = send(&app, "GET", "/orders/order-count/999999/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // reviews: create, duplicate, permissions
    let review_payload = json!({"business_user": business_id, "rating": 5, "description": "Great"});
    let (status, review) = send(
        &app,
        "POST",
        "/reviews/",
        Some(&customer_token),
        Some(review_payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{review}");
    let review_id = review["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/reviews/",
        Some(&customer_token),
        Some(review_payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/reviews/",
        Some(&business_token),
        Some(review_payload),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // only the reviewer can edit or delete
    let (other_token, _) = register(&app, "guest", "customer").await;
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/reviews/{review_id}/"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, edited) = send(
        &app,
        "PATCH",
        &format!("/reviews/{review_id}/"),
        Some(&customer_token),
        Some(json!({"rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["rating"].as_i64(), Some(4));

    // out-of-range ratings are rejected
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/reviews/{review_id}/"),
        Some(&customer_token),
        Some(json!({"rating": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // public statistics reflect the data above
    let (status, info) = send(&app, "GET", "/base-info/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["review_count"].as_i64(), Some(1));
    assert_eq!(info["average_rating"].as_f64(), Some(4.0));
    assert_eq!(info["business_profile_count"].as_i64(), Some(1));
    assert_eq!(info["offer_count"].as_i64(), Some(1));

    // malformed ids normalize to the structured 404
    let (status, err) = send(&app, "GET", "/offers/abc/", Some(&customer_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(err["code"].as_i64().is_some());

    // offer delete cascades and is owner-gated
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/offers/{offer_id}/"),
        Some(&customer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/offers/{offer_id}/"),
        Some(&business_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn login_and_duplicate_username() {
    let (app, _) = test_app().await;

    register(&app, "anna", "business").await;

    // duplicate username
    let (status, err) = send(
        &app,
        "POST",
        "/auth/registration/",
        None,
        Some(json!({
            "username": "anna",
            "email": "anna2@example.com",
            "password": "secret-password",
            "type": "customer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["details"]["username"].is_string());

    // login happy path and wrong password
    let (status, body) = send(
        &app,
        "POST",
        "/auth/login/",
        None,
        Some(json!({"username": "anna", "password": "secret-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["username"].as_str(), Some("anna"));

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login/",
        None,
        Some(json!({"username": "anna", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tier_update_merges_and_orders_keep_snapshots() {
    let (app, _) = test_app().await;
    let (business_token, _) = register(&app, "studio", "business").await;
    let (customer_token, _) = register(&app, "buyer", "customer").await;

    let (_, offer) = send(
        &app,
        "POST",
        "/offers/",
        Some(&business_token),
        Some(offer_payload()),
    )
    .await;
    let offer_id = offer["id"].as_i64().unwrap();
    let detail_id = offer["details"][0]["id"].as_i64().unwrap();
    let (_, detail) = send(
        &app,
        "GET",
        &format!("/offerdetails/{detail_id}/"),
        Some(&customer_token),
        None,
    )
    .await;
    let tier = detail["offer_type"].as_str().unwrap().to_string();
    let old_price = detail["price"].as_i64().unwrap();

    let (_, order) = send(
        &app,
        "POST",
        "/orders/",
        Some(&customer_token),
        Some(json!({"offer_detail_id": detail_id})),
    )
    .await;

    // raise the ordered tier's price through the merge-by-type update
    let (status, updated_offer) = send(
        &app,
        "PATCH",
        &format!("/offers/{offer_id}/"),
        Some(&business_token),
        Some(json!({"details": [{"offer_type": tier, "price": old_price + 500}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated_offer["details"].as_array().unwrap().len(), 3);

    let (_, detail_after) = send(
        &app,
        "GET",
        &format!("/offerdetails/{detail_id}/"),
        Some(&customer_token),
        None,
    )
    .await;
    assert_eq!(detail_after["price"].as_i64(), Some(old_price + 500));
    // untouched fields survive the merge
    assert_eq!(detail_after["title"], detail["title"]);

    // the existing order still carries the old price
    let order_id = order["id"].as_i64().unwrap();
    let (status, order_after) = send(
        &app,
        "GET",
        &format!("/orders/{order_id}/"),
        Some(&customer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_after["price"].as_i64(), Some(old_price));
}

#[tokio::test]
async fn offer_list_filters_by_owner() {
    let (app, _) = test_app().await;
    let (token_a, id_a) = register(&app, "studio-a", "business").await;
    let (token_b, _id_b) = register(&app, "studio-b", "business").await;

    for token in [&token_a, &token_b] {
        let (status, _) = send(&app, "POST", "/offers/", Some(token), Some(offer_payload())).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(&app, "GET", &format!("/offers/?creator_id={id_a}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"].as_i64(), Some(1));
    assert_eq!(
        page["results"][0]["user_details"]["username"].as_str(),
        Some("studio-a")
    );

    // the web client sends the owner filter as `user`
    let (status, page) = send(&app, "GET", &format!("/offers/?user={id_a}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"].as_i64(), Some(1));
    assert_eq!(
        page["results"][0]["user_details"]["username"].as_str(),
        Some("studio-a")
    );

    // disagreeing aliases are rejected rather than silently picked between
    let (status, err) = send(
        &app,
        "GET",
        &format!("/offers/?user={id_a}&creator_id=999999"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["details"]["creator_id"].is_string(), "{err}");
}

#[tokio::test]
async fn staff_can_moderate_orders_and_offers() {
    let (app, state) = test_app().await;
    let (business_token, _) = register(&app, "studio", "business").await;
    let (customer_token, _) = register(&app, "buyer", "customer").await;
    let (_, moderator_id) = register(&app, "moderator", "customer").await;

    // promote through the repository and pick up a token carrying the flag
    state.users().set_staff(moderator_id, true).await.unwrap();
    let (status, body) = send(
        &app,
        "POST",
        "/auth/login/",
        None,
        Some(json!({"username": "moderator", "password": "secret-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let staff_token = body["token"].as_str().unwrap().to_string();

    let (_, offer) = send(
        &app,
        "POST",
        "/offers/",
        Some(&business_token),
        Some(offer_payload()),
    )
    .await;
    let offer_id = offer["id"].as_i64().unwrap();
    let detail_id = offer["details"][0]["id"].as_i64().unwrap();
    let (_, order) = send(
        &app,
        "POST",
        "/orders/",
        Some(&customer_token),
        Some(json!({"offer_detail_id": detail_id})),
    )
    .await;
    let order_id = order["id"].as_i64().unwrap();

    // staff can edit an offer they do not own
    let (status, edited) = send(
        &app,
        "PATCH",
        &format!("/offers/{offer_id}/"),
        Some(&staff_token),
        Some(json!({"title": "Logo design (moderated)"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{edited}");
    assert_eq!(edited["title"].as_str(), Some("Logo design (moderated)"));

    // reading an order stays with the two parties, staff included
    let (status, _) = send(
        &app,
        "GET",
        &format!("/orders/{order_id}/"),
        Some(&staff_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // neither party may delete an order
    for token in [&customer_token, &business_token] {
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/orders/{order_id}/"),
            Some(token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/orders/{order_id}/"),
        Some(&staff_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // staff can also remove the offer outright
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/offers/{offer_id}/"),
        Some(&staff_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
