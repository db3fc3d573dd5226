//! HTTP behaviour of the REST client against a wiremock server.

use backoffice_client::{
    ClientSettings, Credentials, EndpointOverrides, ResourceEndpoints, RestCollectionClient,
    RestDashboardClient, RestLookupClient, RestTransport,
};
use backoffice_core::{
    AttendanceRecord, ClientError, Course, DashboardSource, Draft, FieldKind, FieldSpec,
    LookupSource, Mentor, MutationKind, Relation, ResourceClient, User,
};
use backoffice_test_utils::assertions;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base_url: String) -> ClientSettings {
    ClientSettings {
        base_url,
        credentials: Credentials {
            bearer_token: Some("secret-token".into()),
            api_key: None,
        },
        timeout: Duration::from_secs(2),
    }
}

async fn client_for<R: backoffice_core::Record>(server: &MockServer) -> RestCollectionClient<R> {
    let transport = RestTransport::new(&settings(format!("{}/api", server.uri()))).unwrap();
    RestCollectionClient::with_defaults(transport)
}

fn draft(fields: serde_json::Value) -> Draft {
    serde_json::from_value(fields).unwrap()
}

#[tokio::test]
async fn test_list_decodes_envelope_and_sends_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allusers"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "_id": "1", "name": "Asha", "mobile": 9876543210u64 },
                { "_id": "2", "name": "Kiran" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for::<User>(&server).await;
    let users = client.list().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].mobile.as_deref(), Some("9876543210"));
}

#[tokio::test]
async fn test_attendance_uses_its_own_data_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allattendance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attendance": [
                { "_id": "a1", "mentorId": "m1", "attendance": [ { "studentName": "Asha", "status": "present" } ] }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for::<AttendanceRecord>(&server).await;
    let sheets = client.list().await.unwrap();
    assert_eq!(sheets[0].present_count(), 1);
    assert!(!client.supports(MutationKind::Create));
}

#[tokio::test]
async fn test_success_false_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allusers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Database unavailable"
        })))
        .mount(&server)
        .await;

    let client = client_for::<User>(&server).await;
    let result = client.list().await;
    assertions::assert_server_error(&result, Some(200));
}

#[tokio::test]
async fn test_server_failure_status_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mentors/with-batches"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = client_for::<Mentor>(&server).await;
    let result = client.list().await;
    assertions::assert_server_error(&result, Some(503));
    assert!(result.unwrap_err().is_retryable());
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    drop(server);

    let transport = RestTransport::new(&settings(base)).unwrap();
    let client = RestCollectionClient::<User>::with_defaults(transport);
    let result = client.list().await;
    assertions::assert_network_error(&result);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/liveclasses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut slow = settings(format!("{}/api", server.uri()));
    slow.timeout = Duration::from_millis(50);
    let client = RestCollectionClient::<backoffice_core::LiveClass>::with_defaults(
        RestTransport::new(&slow).unwrap(),
    );
    assertions::assert_network_error(&client.list().await);
}

#[tokio::test]
async fn test_update_reads_updated_user_key() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/updateusers/u1"))
        .and(body_json(json!({ "name": "Asha K" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "User updated",
            "updatedUser": { "_id": "u1", "name": "Asha K", "email": "asha@x.io" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for::<User>(&server).await;
    let user = client
        .update(&"u1".into(), &draft(json!({ "name": "Asha K" })))
        .await
        .unwrap()
        .expect("record echoed under updatedUser");
    assert_eq!(user.email.as_deref(), Some("asha@x.io"));
}

#[tokio::test]
async fn test_update_without_record_is_acknowledged_only() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/our-mentor/mentor/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let client = client_for::<Mentor>(&server).await;
    let echoed = client
        .update(&"m1".into(), &draft(json!({ "expertise": "Cloud" })))
        .await
        .unwrap();
    assert!(echoed.is_none());
}

#[tokio::test]
async fn test_update_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/updateusers/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "User not found" })))
        .mount(&server)
        .await;

    let client = client_for::<User>(&server).await;
    let result = client.update(&"gone".into(), &Draft::new()).await;
    assertions::assert_not_found(&result, "gone");
}

#[tokio::test]
async fn test_create_validation_errors_carry_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register-by-admin"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Validation failed",
            "errors": [ { "path": "email", "msg": "Email already registered" } ]
        })))
        .mount(&server)
        .await;

    let client = client_for::<User>(&server).await;
    let result = client.create(&draft(json!({ "email": "a@x.io" }))).await;
    assertions::assert_validation_field(&result, "email");
}

#[tokio::test]
async fn test_course_create_is_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/create-course"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("Data Science"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": { "_id": "c9", "name": "Data Science", "price": 24999 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for::<Course>(&server).await;
    let mut payload = Draft::new();
    payload
        .set(&FieldSpec::text("name", "Name"), "Data Science")
        .unwrap();
    payload
        .set(&FieldSpec::new("price", "Price", FieldKind::Number), "24999")
        .unwrap();
    let course = client.create(&payload).await.unwrap();
    assert_eq!(course.price.as_deref(), Some("24999"));
}

#[tokio::test]
async fn test_create_with_echoed_id_is_rebuilt_from_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/course-modules"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true, "insertedId": "cm7" })))
        .mount(&server)
        .await;

    let client = client_for::<backoffice_core::CourseModule>(&server).await;
    let module = client
        .create(&draft(json!({ "mentorName": "Ravi" })))
        .await
        .unwrap();
    assert_eq!(module.id.as_str(), "cm7");
    assert_eq!(module.mentor_name.as_deref(), Some("Ravi"));
}

#[tokio::test]
async fn test_create_without_record_or_id_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createliveclass"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "Created" })))
        .mount(&server)
        .await;

    let client = client_for::<backoffice_core::LiveClass>(&server).await;
    let result = client.create(&draft(json!({ "className": "Hooks" }))).await;
    assert!(matches!(result, Err(ClientError::Server { .. })));
}

#[tokio::test]
async fn test_delete_and_unsupported_routes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/course-modules/cm1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let modules = client_for::<backoffice_core::CourseModule>(&server).await;
    modules.delete(&"cm1".into()).await.unwrap();

    let transport = RestTransport::new(&settings(format!("{}/api", server.uri()))).unwrap();
    let overrides = EndpointOverrides {
        delete: Some(String::new()),
        ..EndpointOverrides::default()
    };
    let mentors = RestCollectionClient::<Mentor>::new(
        transport,
        ResourceEndpoints::defaults(backoffice_core::ResourceKind::Mentor).with_overrides(&overrides),
    );
    let result = mentors.delete(&"m1".into()).await;
    assert!(matches!(
        result,
        Err(ClientError::Unsupported { operation: "delete", .. })
    ));
}

#[tokio::test]
async fn test_dashboard_decodes_data_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "totals": { "students": 42, "courses": 6, "mentors": 5, "categories": 3 },
                "todayStats": { "todaysEnrollments": 2, "completedCoursesToday": 1, "revenueToday": 15000 },
                "activeStudents": { "daily": 10, "weekly": 25, "monthly": 40 },
                "tables": {
                    "studentInsightsData": [
                        { "_id": "s1", "name": "Asha", "email": "asha@example.com", "mobile": "98765", "createdAt": "2024-03-01T09:30:00.000Z" }
                    ],
                    "mentorInsightsData": [
                        { "_id": "m1", "expertise": "React", "createdAt": "2024-02-10T00:00:00.000Z" }
                    ]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = RestTransport::new(&settings(format!("{}/api", server.uri()))).unwrap();
    let summary = RestDashboardClient::with_defaults(transport).summary().await.unwrap();

    assert_eq!(summary.totals.students, 42);
    assert_eq!(summary.today_stats.revenue_today, 15000.0);
    assert_eq!(summary.active_students.weekly, 25);
    assert_eq!(summary.students()[0].email.as_deref(), Some("asha@example.com"));
    assert_eq!(summary.mentors()[0].cells()[1], "10/02/2024");
}

#[tokio::test]
async fn test_dashboard_unsuccessful_envelope_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false, "message": "stats unavailable" })))
        .mount(&server)
        .await;

    let transport = RestTransport::new(&settings(format!("{}/api", server.uri()))).unwrap();
    let result = RestDashboardClient::with_defaults(transport).summary().await;
    match result {
        Err(ClientError::Server { message, .. }) => assert_eq!(message, "stats unavailable"),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lookup_reads_relation_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allenrollments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "_id": "e1", "batchName": "FS-Jan", "batchNumber": "1" },
                { "batchName": "no id" },
                { "_id": "e2", "batchName": "DS-Feb" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/our-mentor/mentors"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "down" })))
        .mount(&server)
        .await;

    let transport = RestTransport::new(&settings(format!("{}/api", server.uri()))).unwrap();
    let lookups = RestLookupClient::new(transport);

    let options = lookups.options(Relation::Enrollments).await.unwrap();
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["FS-Jan (1)", "DS-Feb"]);
    assert_eq!(options[1].id.as_str(), "e2");

    let result = lookups.options(Relation::Mentors).await;
    assertions::assert_server_error(&result, Some(500));
}
