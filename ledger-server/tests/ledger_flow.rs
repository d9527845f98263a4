//! End-to-end ledger flow over the HTTP router
//!
//! Each test opens a fresh SQLite file in a temp dir and drives the
//! router in-process with `oneshot`.

use axum::Router;
use axum::body::Body;
use chrono::{NaiveDate, TimeZone, Utc};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use ledger_server::api::build_app;
use ledger_server::{Config, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        let state = ServerState::initialize(&config).await.unwrap();
        Self {
            app: build_app(state),
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// POST expecting success, returns `data`
    async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, value) = self.post(uri, body).await;
        assert!(status.is_success(), "POST {uri} failed: {status} {value}");
        value["data"].clone()
    }

    async fn driver(&self, name: &str) -> i64 {
        let emp = self
            .create(
                "/api/employees",
                json!({
                    "name": name,
                    "role": "DRIVER",
                    "hour_rate": 10.0,
                    "overtime_rate": 15.0,
                    "regular_hours_limit": 8.0
                }),
            )
            .await;
        emp["id"].as_i64().unwrap()
    }

    async fn truck(&self, name: &str, driver_id: Option<i64>) -> i64 {
        let truck = self
            .create("/api/trucks", json!({ "name": name, "driver_id": driver_id }))
            .await;
        truck["id"].as_i64().unwrap()
    }

    async fn task(&self, client: &str) -> i64 {
        let task = self
            .create(
                "/api/tasks",
                json!({
                    "client_name": client,
                    "collection_address": "12 Yard Lane",
                    "items": [
                        { "description": "Sofa", "quantity": 1, "unit_price": 80.0 },
                        { "description": "Mattress", "quantity": 2, "unit_price": 20.0 }
                    ]
                }),
            )
            .await;
        task["id"].as_i64().unwrap()
    }

    async fn sheet(&self, driver_id: i64, date: &str) -> Value {
        let (status, value) = self.get(&format!("/api/daily-sheets/{driver_id}/{date}")).await;
        assert_eq!(status, StatusCode::OK, "{value}");
        value["data"].clone()
    }
}

fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

fn buckets_holding(sheet: &Value, task_id: i64) -> Vec<&'static str> {
    [
        "jobs_done",
        "jobs_pending",
        "jobs_cancelled",
        "jobs_on_hold",
        "jobs_not_started",
    ]
    .into_iter()
    .filter(|b| ids(&sheet[*b]).contains(&task_id))
    .collect()
}

fn millis(date: &str, hour: u32, minute: u32) -> i64 {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let naive = date.and_hms_opt(hour, minute, 0).unwrap();
    Utc.from_utc_datetime(&naive).timestamp_millis()
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn status_changes_move_task_between_buckets() {
    let app = TestApp::new().await;
    let driver = app.driver("Dave").await;
    let truck = app.truck("T1", Some(driver)).await;
    let task = app.task("Alice").await;
    let date = "2026-03-02";

    let (status, _) = app
        .post(
            &format!("/api/trucks/{truck}/assign"),
            json!({ "task_id": task, "date": date }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(buckets_holding(&app.sheet(driver, date).await, task), ["jobs_not_started"]);

    let (status, body) = app
        .post(&format!("/api/tasks/{task}/status"), json!({ "status": "PROCESSING" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["task_status"], "PROCESSING");
    assert_eq!(buckets_holding(&app.sheet(driver, date).await, task), ["jobs_pending"]);

    app.post(&format!("/api/tasks/{task}/status"), json!({ "status": "COMPLETED" }))
        .await;
    assert_eq!(buckets_holding(&app.sheet(driver, date).await, task), ["jobs_done"]);
}

#[tokio::test]
async fn task_belongs_to_one_truck_at_a_time() {
    let app = TestApp::new().await;
    let d1 = app.driver("Dave").await;
    let d2 = app.driver("Erin").await;
    let t1 = app.truck("T1", Some(d1)).await;
    let t2 = app.truck("T2", Some(d2)).await;
    let task = app.task("Alice").await;

    app.create(
        &format!("/api/trucks/{t1}/assign"),
        json!({ "task_id": task, "date": "2026-03-02" }),
    )
    .await;

    let (status, body) = app
        .post(
            &format!("/api/trucks/{t2}/assign"),
            json!({ "task_id": task, "date": "2026-03-03" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_ASSIGNED");
    assert_eq!(body["details"]["truck_id"], t1);

    // Released by unassign, the task can move to the other truck
    let (status, _) = app
        .post(
            &format!("/api/trucks/{t1}/unassign"),
            json!({ "task_id": task, "date": "2026-03-02" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(
            &format!("/api/trucks/{t2}/assign"),
            json!({ "task_id": task, "date": "2026-03-03" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, index) = app.get(&format!("/api/trucks/{t1}/index")).await;
    assert!(index["data"].as_object().unwrap().is_empty());
    let (_, refs) = app.get(&format!("/api/trucks/{t2}/tasks/2026-03-03")).await;
    assert_eq!(refs["data"][0]["task_id"], task);
}

#[tokio::test]
async fn sheet_cash_follows_cash_payments() {
    let app = TestApp::new().await;
    let driver = app.driver("Dave").await;
    let truck = app.truck("T1", Some(driver)).await;
    let cash_task = app.task("Alice").await;
    let card_task = app.task("Bob").await;
    let date = "2026-03-02";

    for task in [cash_task, card_task] {
        app.create(
            &format!("/api/trucks/{truck}/assign"),
            json!({ "task_id": task, "date": date }),
        )
        .await;
    }

    app.post(
        &format!("/api/tasks/{cash_task}/payment"),
        json!({ "payment_status": "PAID", "payment_method": "CASH", "cash_received": 120.5 }),
    )
    .await;
    app.post(
        &format!("/api/tasks/{card_task}/payment"),
        json!({ "payment_status": "PAID", "payment_method": "CARD", "cash_received": 99.0 }),
    )
    .await;

    let sheet = app.sheet(driver, date).await;
    assert_eq!(sheet["total_cash"].as_f64().unwrap(), 120.5);
}

#[tokio::test]
async fn generate_builds_sheets_for_all_drivers() {
    let app = TestApp::new().await;
    let driver = app.driver("Dave").await;
    let truck = app.truck("T1", Some(driver)).await;
    let task = app.task("Alice").await;
    let date = "2026-03-02";
    app.create(
        &format!("/api/trucks/{truck}/assign"),
        json!({ "task_id": task, "date": date }),
    )
    .await;

    let summary = app
        .create("/api/daily-sheets/generate", json!({ "date": date }))
        .await;
    assert_eq!(ids(&summary["generated"]), [driver]);
    assert!(summary["failed"].as_array().unwrap().is_empty());

    let sheet = app.sheet(driver, date).await;
    assert_eq!(ids(&sheet["jobs_not_started"]), [task]);

    // Regenerating yields the same sheet
    let again = app
        .create("/api/daily-sheets/generate", json!({ "date": date, "driver_id": driver }))
        .await;
    assert_eq!(again["id"], sheet["id"]);
    assert_eq!(ids(&again["jobs_not_started"]), [task]);
}

#[tokio::test]
async fn payroll_shift_lifecycle() {
    let app = TestApp::new().await;
    let driver = app.driver("Dave").await;
    let date = "2026-03-02";

    let (status, _) = app
        .post(
            "/api/payroll/start",
            json!({ "user_id": driver, "start_time": millis(date, 9, 0) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/payroll/start",
            json!({ "user_id": driver, "start_time": millis(date, 10, 0) }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SHIFT_ALREADY_OPEN");

    let (status, body) = app
        .post(
            "/api/payroll/end",
            json!({ "user_id": driver, "end_time": millis(date, 19, 30) }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let record = &body["data"];
    assert_eq!(record["total_hours"].as_f64().unwrap(), 10.5);
    assert_eq!(record["overtime_hours"].as_f64().unwrap(), 2.5);
    assert_eq!(record["salary"].as_f64().unwrap(), 117.5);

    let (_, totals) = app.get(&format!("/api/employees/{driver}/running-totals")).await;
    assert_eq!(totals["data"]["total_salary"].as_f64().unwrap(), 117.5);

    let id = record["id"].as_i64().unwrap();
    let (status, _) = app.post(&format!("/api/payroll/{id}/mark-paid"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.post(&format!("/api/payroll/{id}/mark-paid"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_PAID");

    let (_, totals) = app.get(&format!("/api/employees/{driver}/running-totals")).await;
    assert_eq!(totals["data"]["total_salary"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn unknown_entities_return_not_found_envelopes() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/tasks/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "TASK_NOT_FOUND");
    assert!(body.get("data").is_none());

    let (status, body) = app.get("/api/daily-sheets/1/2026-03-02").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "DAILY_SHEET_NOT_FOUND");

    let (status, body) = app.post("/api/payroll/end", json!({ "user_id": 42 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "EMPLOYEE_NOT_FOUND");

    let (status, _) = app.get("/api/daily-sheets/1/not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_task_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/tasks",
            json!({ "client_name": "Alice", "collection_address": "1 Road", "items": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "TASK_EMPTY");
}

#[tokio::test]
async fn out_of_range_shift_times_are_bad_requests() {
    let app = TestApp::new().await;
    let driver = app.driver("Dave").await;

    let (status, body) = app
        .post(
            "/api/payroll/start",
            json!({ "user_id": driver, "start_time": -9_000_000_000_000_000_000_i64 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALUE_OUT_OF_RANGE");

    app.create(
        "/api/payroll/start",
        json!({ "user_id": driver, "start_time": millis("2026-03-02", 9, 0) }),
    )
    .await;
    let (status, body) = app
        .post(
            "/api/payroll/end",
            json!({ "user_id": driver, "end_time": 9_000_000_000_000_000_000_i64 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALUE_OUT_OF_RANGE");
}
