//! Integration tests for groups, membership and contributions
mod common;

use crate::common::{contribute, create_group, create_test_app, register, send};

use axum::http::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

/// Money and percentages travel as decimal strings.
fn amount(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("expected a decimal string")).unwrap()
}

#[tokio::test]
async fn test_create_group_makes_creator_the_only_member() {
    let app = create_test_app().await;
    let (cookie, user_id) = register(&app, "Ana", "ana@example.com").await;

    let response = send(
        &app,
        "POST",
        "/groups",
        Some(&cookie),
        Some(json!({
            "name": "  Lisbon Trip  ",
            "target_amount": "1000",
            "target_date": "2099-06-01",
            "description": "   ",
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["name"], "Lisbon Trip");
    assert_eq!(response.json["description"], Value::Null);
    assert_eq!(amount(&response.json["target_amount"]), dec!(1000));
    assert_eq!(response.json["target_date"], "2099-06-01");
    assert_eq!(response.json["created_by"], user_id.as_str());
    assert_eq!(response.json["members"], json!([user_id]));
}

#[tokio::test]
async fn test_create_group_reports_every_invalid_field() {
    let app = create_test_app().await;
    let (cookie, _) = register(&app, "Ana", "ana@example.com").await;

    let response = send(
        &app,
        "POST",
        "/groups",
        Some(&cookie),
        Some(json!({
            "name": "ab",
            "target_amount": "-5",
            "target_date": "2000-01-01",
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields = &response.json["fields"];
    assert_eq!(fields["name"], "Group name must be at least 3 characters");
    assert_eq!(fields["target_amount"], "Amount must be a positive number");
    assert_eq!(fields["target_date"], "Target date must be in the future");

    let listed = send(&app, "GET", "/groups", Some(&cookie), None).await;
    assert_eq!(listed.json, json!([]));
}

#[tokio::test]
async fn test_dashboard_lists_groups_newest_first() {
    let app = create_test_app().await;
    let (cookie, _) = register(&app, "Ana", "ana@example.com").await;

    let first = create_group(&app, &cookie, "First goal", "100").await;
    let second = create_group(&app, &cookie, "Second goal", "200").await;

    let response = send(&app, "GET", "/groups", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let cards = response.json.as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["group"]["id"], second.as_str());
    assert_eq!(cards[1]["group"]["id"], first.as_str());
    assert_eq!(cards[0]["member_count"], 1);
    assert_eq!(amount(&cards[0]["my_progress"]["total"]), dec!(0));
    assert_eq!(cards[0]["deadline"]["state"], "remaining");
}

#[tokio::test]
async fn test_dashboard_shows_only_my_contributions() {
    let app = create_test_app().await;
    let (ana, _) = register(&app, "Ana", "ana@example.com").await;
    let (bob, _) = register(&app, "Bob", "bob@example.com").await;

    let group_id = create_group(&app, &ana, "Shared goal", "100").await;
    let join = send(&app, "POST", &format!("/groups/{}/join", group_id), Some(&bob), None).await;
    assert_eq!(join.status, StatusCode::NO_CONTENT);

    contribute(&app, &ana, &group_id, "25").await;
    contribute(&app, &bob, &group_id, "40").await;

    let response = send(&app, "GET", "/groups", Some(&bob), None).await;
    let card = &response.json[0];
    assert_eq!(card["member_count"], 2);
    assert_eq!(amount(&card["my_progress"]["total"]), dec!(40));
    assert_eq!(card["my_progress"]["rounded_percent"], 40);
}

#[tokio::test]
async fn test_group_detail_is_hidden_from_non_members() {
    let app = create_test_app().await;
    let (ana, _) = register(&app, "Ana", "ana@example.com").await;
    let (bob, _) = register(&app, "Bob", "bob@example.com").await;
    let group_id = create_group(&app, &ana, "Private goal", "100").await;

    let detail = send(&app, "GET", &format!("/groups/{}", group_id), Some(&bob), None).await;
    assert_eq!(detail.status, StatusCode::NOT_FOUND);

    let history = send(
        &app,
        "GET",
        &format!("/groups/{}/contributions", group_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(history.status, StatusCode::NOT_FOUND);

    let add = send(
        &app,
        "POST",
        &format!("/groups/{}/contributions", group_id),
        Some(&bob),
        Some(json!({ "amount": "10" })),
    )
    .await;
    assert_eq!(add.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_is_idempotent_and_unknown_groups_are_not_found() {
    let app = create_test_app().await;
    let (ana, _) = register(&app, "Ana", "ana@example.com").await;
    let (bob, bob_id) = register(&app, "Bob", "bob@example.com").await;
    let group_id = create_group(&app, &ana, "Shared goal", "100").await;

    for _ in 0..2 {
        let join = send(&app, "POST", &format!("/groups/{}/join", group_id), Some(&bob), None).await;
        assert_eq!(join.status, StatusCode::NO_CONTENT);
    }

    let detail = send(&app, "GET", &format!("/groups/{}", group_id), Some(&bob), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.json["member_count"], 2);
    let members = detail.json["group"]["members"].as_array().unwrap();
    assert_eq!(members.iter().filter(|m| *m == bob_id.as_str()).count(), 1);

    let unknown = send(
        &app,
        "POST",
        "/groups/7f1a0000-0000-4000-8000-000000000000/join",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_detail_aggregates_by_contributor() {
    let app = create_test_app().await;
    let (ana, ana_id) = register(&app, "Ana", "ana@example.com").await;
    let (bob, bob_id) = register(&app, "Bob", "bob@example.com").await;
    let group_id = create_group(&app, &ana, "Shared goal", "100").await;
    send(&app, "POST", &format!("/groups/{}/join", group_id), Some(&bob), None).await;

    contribute(&app, &ana, &group_id, "50").await;
    contribute(&app, &bob, &group_id, "30").await;
    contribute(&app, &ana, &group_id, "20").await;

    let detail = send(&app, "GET", &format!("/groups/{}", group_id), Some(&ana), None).await;
    assert_eq!(detail.status, StatusCode::OK);

    let members = detail.json["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["user_id"], ana_id.as_str());
    assert_eq!(members[0]["user_name"], "Ana");
    assert_eq!(amount(&members[0]["progress"]["total"]), dec!(70));
    assert_eq!(amount(&members[0]["progress"]["percentage"]), dec!(70));
    assert_eq!(members[0]["contributions"].as_array().unwrap().len(), 2);
    assert_eq!(members[1]["user_id"], bob_id.as_str());
    assert_eq!(amount(&members[1]["progress"]["total"]), dec!(30));
    assert_eq!(members[1]["progress"]["rounded_percent"], 30);

    assert_eq!(amount(&detail.json["my_progress"]["total"]), dec!(70));

    let history = detail.json["history"].as_array().unwrap();
    let amounts: Vec<Decimal> = history.iter().map(|c| amount(&c["amount"])).collect();
    assert_eq!(amounts, vec![dec!(20), dec!(30), dec!(50)]);
}

#[tokio::test]
async fn test_contribution_records_name_snapshot_and_description() {
    let app = create_test_app().await;
    let (ana, ana_id) = register(&app, "Ana", "ana@example.com").await;
    let group_id = create_group(&app, &ana, "Solo goal", "100").await;

    let response = send(
        &app,
        "POST",
        &format!("/groups/{}/contributions", group_id),
        Some(&ana),
        Some(json!({ "amount": "12.50", "description": " Birthday money " })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json["user_id"], ana_id.as_str());
    assert_eq!(response.json["user_name"], "Ana");
    assert_eq!(response.json["description"], "Birthday money");
    assert_eq!(amount(&response.json["amount"]), dec!(12.5));

    let history = send(
        &app,
        "GET",
        &format!("/groups/{}/contributions", group_id),
        Some(&ana),
        None,
    )
    .await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_amounts_keep_every_decimal_digit() {
    let app = create_test_app().await;
    let (ana, _) = register(&app, "Ana", "ana@example.com").await;
    let group_id = create_group(&app, &ana, "Precise goal", "999999999.99").await;

    let added = send(
        &app,
        "POST",
        &format!("/groups/{}/contributions", group_id),
        Some(&ana),
        Some(json!({ "amount": "987654321.123456789" })),
    )
    .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.json["amount"], "987654321.123456789");

    let detail = send(&app, "GET", &format!("/groups/{}", group_id), Some(&ana), None).await;
    assert_eq!(detail.json["group"]["target_amount"], "999999999.99");
    assert_eq!(detail.json["history"][0]["amount"], "987654321.123456789");
    assert_eq!(
        amount(&detail.json["my_progress"]["total"]),
        dec!(987654321.123456789)
    );
}

#[tokio::test]
async fn test_contribution_rejects_amounts_above_the_limit() {
    let app = create_test_app().await;
    let (ana, _) = register(&app, "Ana", "ana@example.com").await;
    let group_id = create_group(&app, &ana, "Solo goal", "100").await;

    for huge in ["1000000000.01", "50000000000000000000000000000"] {
        let response = send(
            &app,
            "POST",
            &format!("/groups/{}/contributions", group_id),
            Some(&ana),
            Some(json!({ "amount": huge })),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json["fields"]["amount"], "Amount must not exceed 1000000000");
    }

    let detail = send(&app, "GET", &format!("/groups/{}", group_id), Some(&ana), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.json["history"], json!([]));
}

#[tokio::test]
async fn test_contribution_rejects_non_positive_amounts() {
    let app = create_test_app().await;
    let (ana, _) = register(&app, "Ana", "ana@example.com").await;
    let group_id = create_group(&app, &ana, "Solo goal", "100").await;

    for amount in ["0", "-3", "abc", ""] {
        let response = send(
            &app,
            "POST",
            &format!("/groups/{}/contributions", group_id),
            Some(&ana),
            Some(json!({ "amount": amount })),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "amount {:?}", amount);
        assert_eq!(response.json["fields"]["amount"], "Amount must be a positive number");
    }

    let history = send(
        &app,
        "GET",
        &format!("/groups/{}/contributions", group_id),
        Some(&ana),
        None,
    )
    .await;
    assert_eq!(history.json, json!([]));
}
