//! Integration tests for notebook ownership and cascades.
//!
//! **IMPORTANT**: These tests require a MySQL database (`DATABASE_URL`).
//! Run with `cargo test -p mindforge-db -- --ignored`.

use mindforge_db::test_fixtures::TestDatabase;
use mindforge_db::{
    CreateNoteRequest, CreateSourceRequest, NoteDraft, NoteRepository, NotebookRepository,
    SourceDraft, SourceRepository,
};

fn source(user_id: i64, folder: &str, name: &str) -> CreateSourceRequest {
    CreateSourceRequest {
        user_id,
        file_name: name.to_string(),
        file_url: format!("http://files.test/{name}"),
        folder_name: folder.to_string(),
        location: Some(format!("custom-documents/{name}.json")),
    }
}

fn note(user_id: i64, folder: &str, title: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        user_id,
        title: title.to_string(),
        content: format!("{title} body"),
        folder_name: folder.to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn test_notebook_visible_only_to_owner() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let other = test_db.create_user().await;

    let notebook = test_db
        .db
        .notebooks
        .insert(owner, "Biology", "biology")
        .await
        .unwrap();
    assert_eq!(notebook.source_count, 0);
    assert_eq!(notebook.slug.as_deref(), Some("biology"));

    let listed = test_db.db.notebooks.list_for_user(owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(test_db.db.notebooks.list_for_user(other).await.unwrap().is_empty());
    assert!(test_db
        .db
        .notebooks
        .get_for_user(other, notebook.id)
        .await
        .unwrap()
        .is_none());
    let by_slug = test_db
        .db
        .notebooks
        .get_by_slug_for_user(owner, "biology")
        .await
        .unwrap();
    assert_eq!(by_slug.map(|n| n.id), Some(notebook.id));
    assert!(test_db
        .db
        .notebooks
        .get_by_slug_for_user(other, "biology")
        .await
        .unwrap()
        .is_none());
    assert!(test_db
        .db
        .notebooks
        .delete_cascade(other, notebook.id)
        .await
        .unwrap()
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_source_insert_increments_count() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user().await;
    let notebook = test_db.db.notebooks.insert(user, "Physics", "physics").await.unwrap();

    test_db.db.sources.insert(source(user, "Physics", "a.pdf")).await.unwrap();
    test_db.db.sources.insert(source(user, "Physics", "b.pdf")).await.unwrap();

    let reloaded = test_db
        .db
        .notebooks
        .get_for_user(user, notebook.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.source_count, 2);

    let listed = test_db.db.sources.list_for_user(user, Some("Physics")).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(test_db.db.sources.list_for_user(user, Some("Other")).await.unwrap().is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_rename_updates_folder_names() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user().await;
    let notebook = test_db.db.notebooks.insert(user, "Draft", "draft").await.unwrap();
    test_db.db.sources.insert(source(user, "Draft", "a.pdf")).await.unwrap();
    test_db.db.notes.insert(note(user, "Draft", "first")).await.unwrap();

    let renamed = test_db
        .db
        .notebooks
        .rename(user, notebook.id, "Final")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.title, "Final");

    assert_eq!(test_db.db.sources.list_for_user(user, Some("Final")).await.unwrap().len(), 1);
    assert_eq!(test_db.db.notes.list_for_user(user, Some("Final")).await.unwrap().len(), 1);
    assert!(test_db.db.notes.list_for_user(user, Some("Draft")).await.unwrap().is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_delete_notebook_removes_notes_and_sources() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user().await;
    let notebook = test_db.db.notebooks.insert(user, "Chemistry", "chemistry").await.unwrap();
    test_db.db.notebooks.insert(user, "Keep", "keep").await.unwrap();

    test_db.db.sources.insert(source(user, "Chemistry", "a.pdf")).await.unwrap();
    test_db.db.notes.insert(note(user, "Chemistry", "gone")).await.unwrap();
    test_db.db.notes.insert(note(user, "Keep", "stays")).await.unwrap();

    let deleted = test_db
        .db
        .notebooks
        .delete_cascade(user, notebook.id)
        .await
        .unwrap()
        .expect("owner can delete");
    assert_eq!(deleted.slug.as_deref(), Some("chemistry"));

    assert!(test_db.db.sources.list_for_user(user, Some("Chemistry")).await.unwrap().is_empty());
    assert!(test_db.db.notes.list_for_user(user, Some("Chemistry")).await.unwrap().is_empty());
    assert_eq!(test_db.db.notes.list_for_user(user, None).await.unwrap().len(), 1);
    assert_eq!(test_db.db.notebooks.list_for_user(user).await.unwrap().len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_note_update_and_delete_scoped_to_owner() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let other = test_db.create_user().await;
    let created = test_db.db.notes.insert(note(owner, "default", "mine")).await.unwrap();

    assert!(test_db
        .db
        .notes
        .update(other, created.id, "stolen", "x")
        .await
        .unwrap()
        .is_none());
    assert!(!test_db.db.notes.delete(other, created.id).await.unwrap());

    let updated = test_db
        .db
        .notes
        .update(owner, created.id, "renamed", "new body")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.content, "new body");
    assert!(test_db.db.notes.delete(owner, created.id).await.unwrap());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn test_import_bundle_is_atomic_per_call() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user().await;
    test_db.db.notebooks.insert(user, "Imported", "imported").await.unwrap();

    let bundle = test_db
        .db
        .notes
        .import_bundle(
            user,
            "Imported",
            &[
                NoteDraft {
                    title: "one".to_string(),
                    content: "1".to_string(),
                },
                NoteDraft {
                    title: "two".to_string(),
                    content: "2".to_string(),
                },
            ],
            &[SourceDraft {
                file_name: "paper.pdf".to_string(),
                file_url: "http://files.test/paper.pdf".to_string(),
                location: None,
            }],
        )
        .await
        .unwrap();

    assert_eq!(bundle.notes.len(), 2);
    assert_eq!(bundle.sources.len(), 1);
    assert!(bundle.notes.iter().all(|n| n.folder_name == "Imported"));

    let notebooks = test_db.db.notebooks.list_for_user(user).await.unwrap();
    assert_eq!(notebooks[0].source_count, 1);

    test_db.cleanup().await;
}
