use serde_json::json;

use exam_blob::Namespace;
use exam_core::{ErrorKind, ExamConfig, ExamError};

fn fatal_message(err: &anyhow::Error) -> String {
    let exam = err
        .chain()
        .find_map(|e| e.downcast_ref::<ExamError>())
        .expect("exam error in chain");
    assert_eq!(exam.kind, ErrorKind::Fatal);
    exam.message.clone()
}

#[tokio::test]
async fn defaults_to_in_memory_stores() {
    let services = exam_app::bootstrap(&ExamConfig::new()).await.unwrap();

    assert_eq!(services.records.collection(), "users");
    services
        .records
        .upsert_course_entry("user-42", "DCIT 101", &json!({ "course_code": "DCIT101" }))
        .await
        .unwrap();
    let code = services
        .records
        .get_field("user-42", "DCIT 101", "course_code")
        .await
        .unwrap();
    assert_eq!(code, Some(json!("DCIT101")));
}

#[tokio::test]
async fn json_backend_persists_across_bootstraps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let config = ExamConfig::new()
        .with("records.backend", "json")
        .with("records.path", path.display().to_string())
        .with("records.collection", "students");

    let first = exam_app::bootstrap(&config).await.unwrap();
    assert_eq!(first.records.collection(), "students");
    first
        .records
        .upsert_course_entry("user-42", "UGBS303", &json!({ "Exact_Exams_Venue": "JQB 23" }))
        .await
        .unwrap();

    let second = exam_app::bootstrap(&config).await.unwrap();
    let venue = second
        .records
        .get_field("user-42", "UGBS303", "Exact_Exams_Venue")
        .await
        .unwrap();
    assert_eq!(venue, Some(json!("JQB 23")));
}

#[tokio::test]
async fn blob_settings_flow_into_artifact_adapter() {
    let config = ExamConfig::new()
        .with("blob.public_base_url", "https://cdn.example.com/exams")
        .with("blob.max_bytes", "1024")
        .with("blob.keep_local", "true");
    let services = exam_app::bootstrap(&config).await.unwrap();

    assert_eq!(services.artifacts.config().max_artifact_bytes, 1024);
    assert!(!services.artifacts.config().remove_local_on_success);

    let dir = tempfile::tempdir().unwrap();
    let ics = dir.path().join("exams.ics");
    std::fs::write(&ics, b"BEGIN:VCALENDAR\nEND:VCALENDAR\n").unwrap();

    let receipt = services
        .artifacts
        .upload_artifact(&ics, "user-42.ics", Namespace::Calendars)
        .await
        .unwrap();
    assert_eq!(receipt.url, "https://cdn.example.com/exams/calendars/user-42.ics");
    assert!(ics.exists());
}

#[tokio::test]
async fn unknown_backends_are_fatal() {
    let config = ExamConfig::new().with("records.backend", "firestore-emulator");
    let err = exam_app::bootstrap(&config).await.err().expect("rejected");
    assert!(fatal_message(&err).contains("records.backend"));

    let config = ExamConfig::new().with("blob.backend", "ftp");
    let err = exam_app::bootstrap(&config).await.err().expect("rejected");
    assert!(fatal_message(&err).contains("blob.backend"));
}

#[tokio::test]
async fn missing_required_settings_are_fatal() {
    let config = ExamConfig::new().with("records.backend", "json");
    let err = exam_app::bootstrap(&config).await.err().expect("rejected");
    assert!(fatal_message(&err).contains("records.path"));

    let config = ExamConfig::new().with("blob.backend", "s3");
    let err = exam_app::bootstrap(&config).await.err().expect("rejected");
    assert!(fatal_message(&err).contains("blob.bucket"));
}

#[tokio::test]
async fn malformed_blob_settings_are_fatal() {
    let config = ExamConfig::new().with("blob.max_bytes", "10MB");
    let err = exam_app::bootstrap(&config).await.err().expect("rejected");
    assert!(fatal_message(&err).contains("blob.max_bytes"));

    let config = ExamConfig::new().with("blob.keep_local", "yes");
    let err = exam_app::bootstrap(&config).await.err().expect("rejected");
    assert!(fatal_message(&err).contains("blob.keep_local"));

    let config = ExamConfig::new().with("blob.keep_local", "false");
    let services = exam_app::bootstrap(&config).await.unwrap();
    assert!(services.artifacts.config().remove_local_on_success);
}

#[tokio::test]
async fn unreadable_record_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    std::fs::write(&path, b"{ not json").unwrap();
    let config = ExamConfig::new()
        .with("records.backend", "json")
        .with("records.path", path.display().to_string());

    let err = exam_app::bootstrap(&config).await.err().expect("rejected");
    fatal_message(&err);
}
