//! Session persistence through the file backend

use portal_core::{
    ACCESS_TOKEN_KEY, AccessToken, FileStorage, KeyValueStorage, Session, SessionStore,
    USER_KEY, UserProfile,
};
use std::sync::Arc;
use tempfile::TempDir;

fn lecturer() -> UserProfile {
    UserProfile {
        username: "lecturer02".to_string(),
        full_name: "Tran Thi B".to_string(),
        email: "b@x.edu".to_string(),
        role_name: "Lecturer".to_string(),
        user_id: Some(12),
        role_description: Some("Teaching staff".to_string()),
    }
}

#[test]
fn session_persists_across_store_instances() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    let store = SessionStore::new(Arc::new(FileStorage::open(&path).unwrap()));
    store
        .set_session(&AccessToken::new("abc.def.ghi"), &lecturer())
        .unwrap();

    let reopened = SessionStore::new(Arc::new(FileStorage::open(&path).unwrap()));
    assert!(reopened.is_authenticated());
    assert_eq!(reopened.stored_user(), Some(lecturer()));

    reopened.clear_session().unwrap();
    assert_eq!(store.session(), Session::Anonymous);
}

#[test]
fn persisted_layout_uses_two_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let storage = Arc::new(FileStorage::open(&path).unwrap());

    SessionStore::new(storage.clone())
        .set_session(&AccessToken::new("abc.def.ghi"), &lecturer())
        .unwrap();

    assert_eq!(
        storage.get_item(ACCESS_TOKEN_KEY).unwrap().as_deref(),
        Some("abc.def.ghi")
    );
    let user: serde_json::Value =
        serde_json::from_str(&storage.get_item(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(user["fullName"], "Tran Thi B");
    assert!(user.get("accessToken").is_none());

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let keys: Vec<&String> = raw.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["accessToken", "user"]);
}

#[test]
fn concurrent_handles_never_leave_a_partial_file() {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let path = path.clone();
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                match std::fs::read_to_string(&path) {
                    Ok(raw) => {
                        serde_json::from_str::<BTreeMap<String, String>>(&raw)
                            .unwrap_or_else(|e| panic!("partial session file {raw:?}: {e}"));
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => panic!("read failed: {e}"),
                }
            }
        })
    };

    // One handle per thread, as separate processes would have
    let writers: Vec<_> = (0..4)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || {
                let storage = FileStorage::open(&path).unwrap();
                for round in 0..50 {
                    storage
                        .set_item(&format!("writer{writer}"), &format!("round{round}"))
                        .unwrap();
                }
                storage
            })
        })
        .collect();
    let handles: Vec<FileStorage> = writers.into_iter().map(|w| w.join().unwrap()).collect();

    done.store(true, Ordering::SeqCst);
    reader.join().unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let items: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert!(!items.is_empty());
    assert!(items.values().all(|value| value.starts_with("round")));

    for (index, storage) in handles.iter().enumerate() {
        storage.set_item(&format!("final{index}"), "1").unwrap();
    }
    let fresh = FileStorage::open(&path).unwrap();
    for index in 0..handles.len() {
        assert_eq!(fresh.get_item(&format!("final{index}")).unwrap().as_deref(), Some("1"));
    }

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("session.json")]);
}
