use std::path::Path;
use std::sync::Arc;

use docsim::{create_service, DocsError, Request, Settings};

fn seeded_settings() -> Settings {
    toml::from_str(
        r#"
[documents]
index_unit = "utf16"

[[seed]]
document_id = "DOC001"
title = "Project Proposal"
revision_id = "REV001"
content = "This is the project proposal document with detailed plans."

[[seed]]
document_id = "DOC002"
title = "Meeting Notes"
content = "Notes from the team meeting on product roadmap."
"#,
    )
    .unwrap()
}

#[tokio::test]
async fn seeded_documents_are_queryable() {
    let service = create_service(&seeded_settings(), Path::new(".")).await;

    let proposal = service.get("DOC001").await.unwrap();
    assert_eq!(proposal.title, "Project Proposal");
    assert_eq!(proposal.revision_id, "REV001");
    assert!(proposal.body.text().contains("detailed plans"));

    let notes = service.get("DOC002").await.unwrap();
    assert_eq!(notes.title, "Meeting Notes");
}

#[tokio::test]
async fn create_get_update_get() {
    let service = create_service(&Settings::default(), Path::new(".")).await;

    let created = service.create("E2E Test Document").await.unwrap();
    let fetched = service.get(&created.document_id).await.unwrap();
    let append_at = fetched.body.end_index() - 1;

    service
        .batch_update(
            &created.document_id,
            &[Request::insert_text(
                append_at,
                "This is a test document with some content.",
            )],
        )
        .await
        .unwrap();

    let updated = service.get(&created.document_id).await.unwrap();
    assert_eq!(
        updated.body.text(),
        "This is a test document with some content.\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn documents_update_independently_in_parallel() {
    let service = create_service(&seeded_settings(), Path::new(".")).await;

    let mut handles = Vec::new();
    for (id, word) in [("DOC001", "alpha "), ("DOC002", "beta ")] {
        for _ in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .batch_update(id, &[Request::insert_text(1, word)])
                    .await
                    .unwrap();
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let proposal = service.get("DOC001").await.unwrap();
    assert!(proposal.body.text().starts_with(&"alpha ".repeat(20)));
    let notes = service.get("DOC002").await.unwrap();
    assert!(notes.body.text().starts_with(&"beta ".repeat(20)));
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let service = create_service(&Settings::default(), Path::new(".")).await;
    let err = service
        .batch_update("missing", &[Request::insert_text(1, "x")])
        .await
        .unwrap_err();
    assert!(matches!(err, DocsError::DocumentNotFound(_)));
    assert_eq!(err.status_code(), 404);
}
