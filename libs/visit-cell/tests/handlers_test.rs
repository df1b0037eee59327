use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Query, State};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::state::AppState;
use shared_models::error::AppError;
use visit_cell::handlers::*;
use visit_cell::models::{BookVisitRequest, SlotCountQuery, VisitQuery};

fn test_state(data_api_url: String) -> Arc<AppState> {
    Arc::new(AppState::new(AppConfig {
        data_api_url,
        data_api_key: "test-api-key".to_string(),
        data_source: "test-cluster".to_string(),
        database: "Patient".to_string(),
        stripe_api_url: String::new(),
        stripe_secret_key: String::new(),
    }))
}

fn registration_request() -> BookVisitRequest {
    BookVisitRequest {
        visit_no: None,
        name: Some("Asha Mehta".to_string()),
        dob: Some("1990-05-15".to_string()),
        age: Some(35),
        blood_group: Some("O+".to_string()),
        gender: Some("Female".to_string()),
        contact: Some("9876543210".to_string()),
        medical_conditions: None,
        allergy: None,
        family_history: None,
        clinic: "Narwal Clinic".to_string(),
        location: "Borivali".to_string(),
        date: "2025-09-15".to_string(),
        time: "09:00 AM".to_string(),
        payment: None,
        skip_payment: true,
    }
}

async fn mock_no_closures(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(json!({ "collection": "closed_days" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn first_registration_allocates_the_first_visit_number() {
    let mock_server = MockServer::start().await;
    mock_no_closures(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(
            json!({ "collection": "Patients_history_borivali", "sort": { "visitNo": -1 } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(header("api-key", "test-api-key"))
        .and(body_partial_json(json!({ "collection": "Patients_history_borivali" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "abc123" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = book_visit(
        State(test_state(mock_server.uri())),
        axum::Json(registration_request()),
    )
    .await;

    let response = result.unwrap().0;
    assert_eq!(response["visitNo"], "D-00000001");
}

#[tokio::test]
async fn registration_continues_the_sequence_and_records_payment() {
    let mock_server = MockServer::start().await;
    mock_no_closures(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(
            json!({ "collection": "Patients_history_borivali", "sort": { "visitNo": -1 } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{ "visitNo": "D-00000004" }]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "Patients_history_borivali" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "abc124" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({
            "collection": "payment_record",
            "document": { "visitNo": "D-00000005", "payment": "cash" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "pay1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = registration_request();
    request.payment = Some("cash".to_string());
    request.skip_payment = false;

    let result = book_visit(State(test_state(mock_server.uri())), axum::Json(request)).await;

    let response = result.unwrap().0;
    assert_eq!(response["visitNo"], "D-00000005");
}

#[tokio::test]
async fn registration_retries_when_the_visit_number_is_taken() {
    let mock_server = MockServer::start().await;
    mock_no_closures(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(
            json!({ "collection": "Patients_history_borivali", "sort": { "visitNo": -1 } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{ "visitNo": "D-00000007" }]
        })))
        .mount(&mock_server)
        .await;

    // A concurrent registration won D-00000008: the unique index rejects the
    // first insert, the retry goes through.
    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "Patients_history_borivali" })))
        .respond_with(ResponseTemplate::new(409).set_body_string(
            "E11000 duplicate key error collection: Patient.Patients_history_borivali index: visitNo_1",
        ))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "Patients_history_borivali" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "abc125" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = book_visit(
        State(test_state(mock_server.uri())),
        axum::Json(registration_request()),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn booking_is_rejected_on_a_closed_date_with_the_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(json!({ "collection": "closed_days" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                { "branch": "All", "dateFrom": "2025-09-14", "dateTo": "2025-09-16", "reason": "Diwali break" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let result = book_visit(
        State(test_state(mock_server.uri())),
        axum::Json(registration_request()),
    )
    .await;

    assert_matches!(result, Err(AppError::ClinicClosed { reason }) => {
        assert_eq!(reason, "Diwali break");
    });
}

#[tokio::test]
async fn booking_one_day_past_the_closure_range_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(json!({ "collection": "closed_days" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                { "branch": "All", "dateFrom": "2025-09-16", "dateTo": "2025-09-17", "reason": "Maintenance" }
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(
            json!({ "collection": "Patients_history_borivali", "sort": { "visitNo": -1 } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "abc126" })))
        .mount(&mock_server)
        .await;

    // Booking lands on the 15th, one day before the closed range starts.
    let result = book_visit(
        State(test_state(mock_server.uri())),
        axum::Json(registration_request()),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn an_unevaluable_closure_check_rejects_the_booking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(500).set_body_string("store unavailable"))
        .mount(&mock_server)
        .await;

    let result = book_visit(
        State(test_state(mock_server.uri())),
        axum::Json(registration_request()),
    )
    .await;

    assert_matches!(result, Err(AppError::Database(_)));
}

#[tokio::test]
async fn registration_validates_the_contact_number() {
    let mock_server = MockServer::start().await;
    mock_no_closures(&mock_server).await;
    let state = test_state(mock_server.uri());

    let mut missing = registration_request();
    missing.contact = None;
    let result = book_visit(State(state.clone()), axum::Json(missing)).await;
    assert_matches!(result, Err(AppError::BadRequest(_)));

    let mut short = registration_request();
    short.contact = Some("12345".to_string());
    let result = book_visit(State(state.clone()), axum::Json(short)).await;
    assert_matches!(result, Err(AppError::BadRequest(_)));

    let mut letters = registration_request();
    letters.contact = Some("98765x3210".to_string());
    let result = book_visit(State(state), axum::Json(letters)).await;
    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn returning_patient_appends_one_appointment() {
    let mock_server = MockServer::start().await;
    mock_no_closures(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .and(body_partial_json(json!({
            "collection": "Patients_history_malad",
            "filter": { "visitNo": "D-00000042" },
            "update": { "$push": { "appointments": {
                "clinic": "Dr.Narwal Clinic",
                "location": "Malad",
                "date": "2025-09-15",
                "time": "10:00 AM"
            }}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matchedCount": 1, "modifiedCount": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "payment_record" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "insertedId": "pay2" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = BookVisitRequest {
        visit_no: Some("D-00000042".to_string()),
        name: None,
        dob: None,
        age: None,
        blood_group: None,
        gender: None,
        contact: None,
        medical_conditions: None,
        allergy: None,
        family_history: None,
        clinic: "Dr.Narwal Clinic".to_string(),
        location: "Malad".to_string(),
        date: "2025-09-15".to_string(),
        time: "10:00 AM".to_string(),
        payment: Some("cash".to_string()),
        skip_payment: false,
    };

    let result = book_visit(State(test_state(mock_server.uri())), axum::Json(request)).await;

    let response = result.unwrap().0;
    assert_eq!(response["visitNo"], "D-00000042");
}

#[tokio::test]
async fn appending_to_an_unknown_visit_number_is_not_found() {
    let mock_server = MockServer::start().await;
    mock_no_closures(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matchedCount": 0, "modifiedCount": 0
        })))
        .mount(&mock_server)
        .await;

    let mut request = registration_request();
    request.visit_no = Some("D-00099999".to_string());

    let result = book_visit(State(test_state(mock_server.uri())), axum::Json(request)).await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn a_failed_ledger_write_does_not_undo_the_booking() {
    let mock_server = MockServer::start().await;
    mock_no_closures(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matchedCount": 1, "modifiedCount": 1
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "payment_record" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("ledger down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = registration_request();
    request.visit_no = Some("D-00000042".to_string());
    request.payment = Some("cash".to_string());
    request.skip_payment = false;

    let result = book_visit(State(test_state(mock_server.uri())), axum::Json(request)).await;

    let response = result.unwrap().0;
    assert_eq!(response["visitNo"], "D-00000042");
}

#[tokio::test]
async fn visit_lookup_requires_both_parameters() {
    let mock_server = MockServer::start().await;
    let state = test_state(mock_server.uri());

    let result = get_visit(
        State(state.clone()),
        Query(VisitQuery {
            visit_no: None,
            location: Some("Borivali".to_string()),
        }),
    )
    .await;
    assert_matches!(result, Err(AppError::BadRequest(msg)) => {
        assert_eq!(msg, "Visit number required");
    });

    let result = get_visit(
        State(state),
        Query(VisitQuery {
            visit_no: Some("D-00000001".to_string()),
            location: None,
        }),
    )
    .await;
    assert_matches!(result, Err(AppError::BadRequest(msg)) => {
        assert_eq!(msg, "Location required");
    });
}

#[tokio::test]
async fn visit_lookup_returns_the_full_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({
            "collection": "Patients_history_borivali",
            "filter": { "visitNo": "D-00000001" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": {
                "visitNo": "D-00000001",
                "name": "Asha Mehta",
                "dob": "1990-05-15",
                "contact": "9876543210",
                "appointments": [
                    { "clinic": "Narwal Clinic", "location": "Borivali", "date": "2025-09-15", "time": "09:00 AM" }
                ],
                "createdAt": "2025-09-01T10:00:00Z"
            }
        })))
        .mount(&mock_server)
        .await;

    let result = get_visit(
        State(test_state(mock_server.uri())),
        Query(VisitQuery {
            visit_no: Some("D-00000001".to_string()),
            location: Some("Borivali".to_string()),
        }),
    )
    .await;

    let response = result.unwrap().0;
    assert_eq!(response["visitNo"], "D-00000001");
    assert_eq!(response["name"], "Asha Mehta");
    assert_eq!(response["appointments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn visit_lookup_miss_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "document": null })))
        .mount(&mock_server)
        .await;

    let result = get_visit(
        State(test_state(mock_server.uri())),
        Query(VisitQuery {
            visit_no: Some("D-00000404".to_string()),
            location: Some("Borivali".to_string()),
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(msg)) => {
        assert_eq!(msg, "Patient not found");
    });
}

#[tokio::test]
async fn slot_count_reports_occupancy_for_the_exact_slot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .and(body_partial_json(json!({
            "collection": "Patients_history_borivali",
            "pipeline": [{
                "$match": {
                    "appointments": {
                        "$elemMatch": {
                            "clinic": "Narwal Clinic",
                            "location": "Borivali",
                            "date": "2025-09-15",
                            "time": "09:00 AM",
                        }
                    }
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{ "count": 10 }]
        })))
        .mount(&mock_server)
        .await;

    let result = slot_count(
        State(test_state(mock_server.uri())),
        Query(SlotCountQuery {
            clinic: Some("Narwal Clinic".to_string()),
            location: Some("Borivali".to_string()),
            date: Some("2025-09-15".to_string()),
            time: Some("09:00 AM".to_string()),
        }),
    )
    .await;

    let response = result.unwrap().0;
    assert_eq!(response["count"], 10);
    assert!(shared_models::clinic::slot_is_full(
        response["count"].as_u64().unwrap()
    ));
}

#[tokio::test]
async fn slot_count_is_zero_for_an_untouched_slot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/aggregate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
        .mount(&mock_server)
        .await;

    let result = slot_count(
        State(test_state(mock_server.uri())),
        Query(SlotCountQuery {
            clinic: Some("Narwal Clinic".to_string()),
            location: Some("Borivali".to_string()),
            date: Some("2025-09-15".to_string()),
            time: Some("11:00 AM".to_string()),
        }),
    )
    .await;

    let response = result.unwrap().0;
    assert_eq!(response["count"], 0);
}

#[tokio::test]
async fn slot_count_requires_all_parameters() {
    let mock_server = MockServer::start().await;

    let result = slot_count(
        State(test_state(mock_server.uri())),
        Query(SlotCountQuery {
            clinic: Some("Narwal Clinic".to_string()),
            location: Some("Borivali".to_string()),
            date: None,
            time: Some("09:00 AM".to_string()),
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(msg)) => {
        assert_eq!(msg, "Missing parameters");
    });
}
