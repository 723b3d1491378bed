use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::scoring::evaluation_router;

fn post(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/kpi/evaluations")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

fn store_json(id: &str) -> Value {
    json!({ "id": id, "name": format!("Toko {id}"), "city": "Bandung", "regional": "Jawa Barat", "area": "Area 2" })
}

fn complaints_json() -> Value {
    json!({
        "whatsapp_count": 10,
        "social_media_count": 5,
        "gmaps_count": 0,
        "online_order_count": 2,
        "late_handling_count": 1
    })
}

#[tokio::test]
async fn evaluates_batch_over_http() {
    let router = evaluation_router(Arc::new(engine()));
    let body = json!({
        "evaluations": [
            {
                "store": store_json("BDG-01"),
                "period": "2025-09",
                "complaints": complaints_json(),
                "finance": { "cogs_achieved": 61000000.0, "total_sales": 90000000.0, "total_opex": 18000000.0 },
                "targets": { "sales_target": 120000000.0, "opex_target_percentage": 20.0, "avg_customer_units_per_day": 500.0 }
            },
            {
                "store": store_json("BDG-02"),
                "period": "2025-09"
            }
        ]
    });

    let response = router.oneshot(post(body)).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["scored"], 1);
    assert_eq!(payload["no_data"], 1);
    let first = &payload["evaluations"][0];
    assert_eq!(first["period"], "2025-09");
    assert_eq!(first["outcome"]["status"], "scored");
    assert_eq!(first["outcome"]["weighted_complaints"], 36.0);
    assert_eq!(first["outcome"]["sales"], 3.0);
    assert_eq!(first["sanctions"]["state"], "no_sanctions");
    assert_eq!(payload["evaluations"][1]["outcome"]["status"], "no_data");
}

#[tokio::test]
async fn request_weights_override_configured_table() {
    let router = evaluation_router(Arc::new(engine()));
    let body = json!({
        "weights": [{ "channel": "WHATSAPP", "weight": 1.0 }],
        "evaluations": [{
            "store": store_json("BDG-03"),
            "period": "2025-09",
            "complaints": complaints_json(),
            "finance": { "cogs_achieved": 1.0, "total_sales": 10.0, "total_opex": 2.0 },
            "targets": { "sales_target": 10.0, "opex_target_percentage": 20.0, "avg_customer_units_per_day": 500.0 }
        }]
    });

    let response = router.oneshot(post(body)).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    // 10×1 + 5 + 0 + 2 + 1 with every other channel on the neutral weight
    assert_eq!(payload["evaluations"][0]["outcome"]["weighted_complaints"], 18.0);
}

#[tokio::test]
async fn rejects_negative_weight_override() {
    let router = evaluation_router(Arc::new(engine()));
    let body = json!({
        "weights": [{ "channel": "gmaps", "weight": -1.0 }],
        "evaluations": [{
            "store": store_json("BDG-06"),
            "period": "2025-09",
            "complaints": complaints_json()
        }]
    });

    let response = router.oneshot(post(body)).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let payload = json_body(response).await;
    let message = payload["error"].as_str().expect("error message");
    assert!(message.contains("gmaps"));
}

#[tokio::test]
async fn rejects_unknown_complaint_fields() {
    let router = evaluation_router(Arc::new(engine()));
    let mut complaints = complaints_json();
    complaints["email_count"] = json!(3);
    let body = json!({
        "evaluations": [{
            "store": store_json("BDG-04"),
            "period": "2025-09",
            "complaints": complaints
        }]
    });

    let response = router.oneshot(post(body)).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn rejects_negative_finance_with_index() {
    let router = evaluation_router(Arc::new(engine()));
    let body = json!({
        "evaluations": [{
            "store": store_json("BDG-05"),
            "period": "2025-09",
            "finance": { "cogs_achieved": 1.0, "total_sales": -10.0, "total_opex": 2.0 }
        }]
    });

    let response = router.oneshot(post(body)).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let payload = json_body(response).await;
    assert_eq!(payload["index"], 0);
    assert_eq!(payload["store_id"], "BDG-05");
}

#[tokio::test]
async fn exposes_configured_weights() {
    let router = evaluation_router(Arc::new(engine()));
    let request = Request::builder()
        .uri("/api/v1/kpi/weights")
        .body(Body::empty())
        .expect("request builds");

    let response = router.oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["default_weight"], 1.0);
    assert_eq!(payload["weights"].as_array().map(Vec::len), Some(5));
}
