use recall::api::{
    ConfigAction, ItemFilter, ItemStatusFilter, NewItem, RecallApi, RecallPaths, SubjectAction,
};
use recall::config::RecallConfig;
use recall::error::RecallError;
use recall::model::{OwnerId, Outcome};
use recall::store::fs::FileStore;
use recall::store::DataStore;
use std::path::Path;

fn open(root: &Path) -> RecallApi<FileStore> {
    let config = RecallConfig::load(root).unwrap();
    let store = FileStore::new(root.to_path_buf()).with_file_ext(&config.file_ext);
    RecallApi::new(store, RecallPaths::new(root.to_path_buf()), config)
}

#[test]
fn items_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let ana = OwnerId::new("ana");

    let mut api = open(dir.path());
    api.init().unwrap();
    let mut item = NewItem::new("Generics", "Monomorphized at compile time.");
    item.tags = vec!["rust".into(), " types ".into()];
    api.create_item(&ana, item).unwrap();
    api.review_items(&ana, &["1"], Some(Outcome::Hard)).unwrap();
    drop(api);

    let api = open(dir.path());
    let res = api.get_items(&ana, ItemFilter::default(), None).unwrap();
    assert_eq!(res.listed_items.len(), 1);
    let meta = &res.listed_items[0].item.metadata;
    assert_eq!(meta.title, "Generics");
    assert_eq!(meta.tags, vec!["rust", "types"]);
    assert_eq!(meta.review_count, 1);
    assert_eq!(meta.difficulty, Some(Outcome::Hard));
    assert_eq!(
        res.listed_items[0].item.content,
        "Monomorphized at compile time."
    );
}

#[test]
fn owners_do_not_see_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let ana = OwnerId::new("ana");
    let ben = OwnerId::new("ben");

    let mut api = open(dir.path());
    api.create_item(&ana, NewItem::new("Ana", "a")).unwrap();
    api.create_item(&ben, NewItem::new("Ben", "b")).unwrap();

    let filter = ItemFilter {
        status: ItemStatusFilter::All,
        ..Default::default()
    };
    let res = api.get_items(&ana, filter, None).unwrap();
    let titles: Vec<_> = res
        .listed_items
        .iter()
        .map(|di| di.item.metadata.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Ana"]);

    let store = FileStore::new(dir.path().to_path_buf());
    let bens = store.list_items(&ben).unwrap();
    assert!(matches!(
        store.get_item(&ana, &bens[0].metadata.id),
        Err(RecallError::Unauthorized(_))
    ));
}

#[test]
fn stale_review_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let ana = OwnerId::new("ana");

    let mut api = open(dir.path());
    api.create_item(&ana, NewItem::new("Card", "x")).unwrap();

    // Two clients read the item at review count 0; only the first commit lands.
    let mut first = FileStore::new(dir.path().to_path_buf());
    let mut second = FileStore::new(dir.path().to_path_buf());
    let id = first.list_items(&ana).unwrap()[0].metadata.id;

    let update = |count| recall::store::ReviewUpdate {
        review_count: count,
        next_review_date: chrono::Utc::now(),
        difficulty: Outcome::Good,
        updated_at: chrono::Utc::now(),
    };
    first.commit_review(&ana, &id, 0, &update(1)).unwrap();
    assert!(matches!(
        second.commit_review(&ana, &id, 0, &update(1)),
        Err(RecallError::Conflict(_))
    ));
    assert_eq!(second.get_item(&ana, &id).unwrap().metadata.review_count, 1);
}

#[test]
fn profile_settings_persist() {
    let dir = tempfile::tempdir().unwrap();
    let ana = OwnerId::new("ana");

    let mut api = open(dir.path());
    api.subjects(
        &ana,
        SubjectAction::Add {
            name: "Type Theory".into(),
            color: "#aa3300".into(),
        },
    )
    .unwrap();
    api.config(
        &ana,
        ConfigAction::Set("repetition-flow".into(), "1, 2, 5".into()),
    )
    .unwrap();
    drop(api);

    let store = FileStore::new(dir.path().to_path_buf());
    let profile = store.load_profile(&ana).unwrap().unwrap();
    assert_eq!(profile.flow().days(), &[1, 2, 5]);
    assert_eq!(profile.subjects[0].id, "type-theory");
    assert!(store.load_profile(&OwnerId::new("ben")).unwrap().is_none());
}

#[test]
fn concurrent_profile_updates_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let ana = OwnerId::new("ana");

    let handles: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|side| {
            let root = dir.path().to_path_buf();
            let ana = ana.clone();
            std::thread::spawn(move || {
                let mut store = FileStore::new(root);
                for n in 0..10 {
                    store
                        .update_profile(&ana, |profile| {
                            let name = format!("{} {}", side, n);
                            profile.subjects.push(recall::model::Subject::new(&name, "blue"));
                            Ok(())
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = FileStore::new(dir.path().to_path_buf());
    let profile = store.load_profile(&ana).unwrap().unwrap();
    assert_eq!(profile.subjects.len(), 20);
}

#[test]
fn flow_and_subject_updates_from_two_handles_both_persist() {
    let dir = tempfile::tempdir().unwrap();
    let ana = OwnerId::new("ana");

    let mut first = open(dir.path());
    let mut second = open(dir.path());
    first
        .subjects(
            &ana,
            SubjectAction::Add {
                name: "Rust".into(),
                color: "red".into(),
            },
        )
        .unwrap();
    second
        .config(&ana, ConfigAction::Set("repetition-flow".into(), "3,9".into()))
        .unwrap();

    let store = FileStore::new(dir.path().to_path_buf());
    let profile = store.load_profile(&ana).unwrap().unwrap();
    assert_eq!(profile.flow().days(), &[3, 9]);
    assert_eq!(profile.subjects.len(), 1);
}
