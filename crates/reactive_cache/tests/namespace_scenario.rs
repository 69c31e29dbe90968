use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use reactive_cache::{
    MemoryPrefsStore, MemorySnapshotStore, NamespaceSignal, ReactiveCache,
    SettingsStore, SnapshotStore,
};
use serde_json::json;

#[test]
fn theme_follows_the_active_namespace() {
    let store = MemorySnapshotStore::default();
    let cache = ReactiveCache::open(store.clone(), "default").expect("open cache");

    let theme = cache
        .get_or_insert_with("theme", || "light".to_string())
        .expect("seed theme");
    assert_eq!(theme.get(), "light");
    theme.set("dark".to_string()).expect("set dark");

    cache.switch_namespace("work").expect("switch to work");
    let work_theme = cache
        .get_or_insert_with("theme", || "blue".to_string())
        .expect("seed work theme");
    assert_eq!(work_theme.get(), "blue");

    cache.switch_namespace("default").expect("switch back");
    let again = cache
        .get_or_insert_with("theme", || "unused".to_string())
        .expect("read default theme");
    assert_eq!(again.get(), "dark");

    assert_eq!(
        store.load_snapshot("work").expect("load work").get("theme"),
        Some(&json!("blue"))
    );
}

#[test]
fn settings_namespace_change_rebinds_cache() {
    let signal = NamespaceSignal::new();
    let settings = SettingsStore::new(MemoryPrefsStore::default(), signal.clone());
    let cache =
        ReactiveCache::open(MemorySnapshotStore::default(), "default").expect("open cache");
    cache.attach_signal(signal.subscribe());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let theme = cache
        .get_or_insert_with("theme", || "light".to_string())
        .expect("seed theme");
    let sink = Rc::clone(&seen);
    theme.subscribe(move |value: &String| sink.borrow_mut().push(value.clone()));
    theme.set("dark".to_string()).expect("set dark");

    block_on(settings.set_namespace("work")).expect("persist namespace");
    let work_theme = cache
        .get_or_insert_with("theme", || "blue".to_string())
        .expect("seed work theme");
    assert_eq!(cache.namespace(), "work");
    assert_eq!(work_theme.get(), "blue");

    block_on(settings.set_namespace("")).expect("reset namespace");
    assert_eq!(cache.get::<String>("theme").expect("default theme").get(), "dark");
    assert_eq!(cache.namespace(), "default");
    assert_eq!(*seen.borrow(), vec!["dark".to_string()]);
    assert_eq!(
        block_on(settings.load()).expect("load settings").namespace,
        ""
    );
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "host-stub")))]
#[test]
fn file_backed_cache_survives_restart() {
    use std::fs;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    use reactive_cache::{CacheConfig, SNAPSHOT_DIR_NAME};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let root = std::env::temp_dir().join(format!("cache_restart_{}_{}", process::id(), nanos));
    let config = CacheConfig::default().with_data_dir(root.clone());

    {
        let cache = ReactiveCache::from_config(&config).expect("open file cache");
        let layout = cache
            .get_or_insert_with("layout", || json!({"columns": 2}))
            .expect("seed layout");
        layout
            .update(|value| value["columns"] = json!(4))
            .expect("update layout");
    }

    let reopened = ReactiveCache::from_config(&config).expect("reopen file cache");
    assert_eq!(
        reopened.get_value("layout").expect("layout").get(),
        json!({"columns": 4})
    );
    assert_eq!(
        fs::read_to_string(root.join(SNAPSHOT_DIR_NAME).join("default.json"))
            .expect("read snapshot file"),
        "{\"layout\":{\"columns\":4}}"
    );

    let _ = fs::remove_dir_all(root);
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "host-stub")))]
#[test]
fn settings_file_is_not_a_cache_namespace() {
    use std::fs;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    use reactive_cache::{prefs_store, CacheConfig, Settings};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let root = std::env::temp_dir().join(format!("cache_prefs_ns_{}_{}", process::id(), nanos));
    let config = CacheConfig::default().with_data_dir(root.clone());

    let settings = SettingsStore::new(
        prefs_store(&config).expect("prefs store"),
        NamespaceSignal::new(),
    );
    block_on(settings.save(&Settings {
        host: "db.local".to_string(),
        ..Settings::default()
    }))
    .expect("save settings");

    let cache = ReactiveCache::from_config(&config).expect("open file cache");
    assert!(cache.namespaces().expect("namespaces").is_empty());

    cache.switch_namespace("prefs").expect("bind prefs namespace");
    assert!(cache.keys().expect("keys").is_empty());
    cache.set("count", &1).expect("write into prefs namespace");

    assert_eq!(
        cache.namespaces().expect("namespaces"),
        vec!["prefs".to_string()]
    );
    assert_eq!(
        block_on(settings.load()).expect("settings still load").host,
        "db.local"
    );

    let _ = fs::remove_dir_all(root);
}
