use super::*;
use crate::models::page::*;
use crate::models::tag::{PageTag, TagCategory};
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().unwrap()).unwrap();
    (db, temp_dir)
}

fn create_request(user_id: &str, title: &str) -> CreatePageRequest {
    CreatePageRequest {
        title: title.to_string(),
        tori: vec!["ai hanmi".to_string()],
        uke: vec!["katate dori".to_string()],
        waza: vec!["ikkyo".to_string(), "Ikkyo".to_string()],
        content: "Keep the elbow low.".to_string(),
        comment: String::new(),
        user_id: user_id.to_string(),
    }
}

fn stored_at(user_id: &str, title: &str, minutes_ago: i64) -> TrainingPageWithTags {
    let mut page = TrainingPage::new(
        user_id.to_string(),
        title.to_string(),
        String::new(),
        String::new(),
    );
    page.created_at = Utc::now() - Duration::minutes(minutes_ago);
    page.updated_at = page.created_at;
    TrainingPageWithTags {
        page,
        tags: Vec::new(),
    }
}

#[test]
fn page_create_get_update_delete_roundtrip() {
    let (db, _temp) = setup_test_db();

    let created = db.pages.create(&create_request("u1", "  Ikkyo omote  ")).expect("create");
    assert_eq!(created.page.title, "Ikkyo omote");
    assert_eq!(created.tags.len(), 3);
    assert_eq!(created.page.created_at, created.page.updated_at);

    let fetched = db
        .pages
        .get(&created.page.id)
        .expect("get")
        .expect("page should exist");
    assert_eq!(fetched, created);

    let mut update = UpdatePageRequest::from_current(&created);
    update.title = "Ikkyo ura".to_string();
    update.waza = vec!["nikyo".to_string()];
    update.comment = "tenkan first".to_string();
    let updated = db.pages.update(&update).expect("update").expect("updated");
    assert_eq!(updated.page.title, "Ikkyo ura");
    assert_eq!(updated.page.comment, "tenkan first");
    assert_eq!(updated.page.created_at, created.page.created_at);
    assert!(updated.page.updated_at >= created.page.updated_at);
    assert!(updated.tags.contains(&PageTag {
        name: "nikyo".to_string(),
        category: TagCategory::Waza,
    }));

    assert!(db.pages.delete(&created.page.id, "u1").expect("delete"));
    assert!(db.pages.get(&created.page.id).expect("get").is_none());
    assert!(db.pages.list_for_user("u1").expect("list").is_empty());
}

#[test]
fn other_users_cannot_update_or_delete() {
    let (db, _temp) = setup_test_db();
    let created = db.pages.create(&create_request("owner", "Mine")).expect("create");

    let mut update = UpdatePageRequest::from_current(&created);
    update.user_id = "intruder".to_string();
    update.title = "Stolen".to_string();
    assert!(db.pages.update(&update).expect("update").is_none());
    assert!(!db.pages.delete(&created.page.id, "intruder").expect("delete"));
    assert!(db.pages.get_owned(&created.page.id, "intruder").expect("get").is_none());

    let still = db
        .pages
        .get_owned(&created.page.id, "owner")
        .expect("get")
        .expect("owner sees page");
    assert_eq!(still.page.title, "Mine");
}

#[test]
fn list_for_user_is_newest_first_and_scoped() {
    let (db, _temp) = setup_test_db();
    db.pages.insert(&stored_at("u1", "old", 30)).expect("old");
    db.pages.insert(&stored_at("u1", "new", 1)).expect("new");
    db.pages.insert(&stored_at("u2", "other", 5)).expect("other");
    db.pages.insert(&stored_at("u1", "middle", 10)).expect("middle");

    let titles: Vec<_> = db
        .pages
        .list_for_user("u1")
        .expect("list")
        .into_iter()
        .map(|page| page.page.title)
        .collect();
    assert_eq!(titles, vec!["new", "middle", "old"]);
}

#[test]
fn duplicate_insert_is_rejected() {
    let (db, _temp) = setup_test_db();
    let page = stored_at("u1", "once", 0);
    db.pages.insert(&page).expect("first insert");
    let err = db.pages.insert(&page).expect_err("duplicate insert");
    assert!(matches!(err, AppError::StorageMessage(_)));
}

#[test]
fn page_tags_are_registered_once() {
    let (db, _temp) = setup_test_db();
    db.pages.create(&create_request("u1", "first")).expect("first");
    db.pages.create(&create_request("u1", "second")).expect("second");

    let tags = db.tags.list_for_user("u1").expect("tags");
    let names: Vec<_> = tags
        .iter()
        .map(|tag| (tag.category, tag.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            (TagCategory::Tori, "ai hanmi"),
            (TagCategory::Uke, "katate dori"),
            (TagCategory::Waza, "ikkyo"),
        ]
    );
    assert!(db.tags.list_for_user("u2").expect("tags").is_empty());
}

#[test]
fn tag_create_is_idempotent_per_category() {
    let (db, _temp) = setup_test_db();
    let first = db.tags.create("u1", "Shiho nage", TagCategory::Waza).expect("create");
    let again = db.tags.create("u1", " shiho nage ", TagCategory::Waza).expect("again");
    assert_eq!(first.id, again.id);

    let other_category = db
        .tags
        .create("u1", "Shiho nage", TagCategory::Uke)
        .expect("other category");
    assert_ne!(first.id, other_category.id);

    let err = db.tags.create("u1", "   ", TagCategory::Tori).expect_err("blank");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn tag_delete_is_owner_scoped() {
    let (db, _temp) = setup_test_db();
    let tag = db.tags.create("u1", "irimi", TagCategory::Tori).expect("create");
    assert!(!db.tags.delete("u2", &tag.id).expect("delete other"));
    assert!(db.tags.delete("u1", &tag.id).expect("delete"));
    assert!(!db.tags.delete("u1", &tag.id).expect("delete twice"));
    assert!(db.tags.list_for_user("u1").expect("tags").is_empty());
}
