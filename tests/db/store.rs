//! LicenseStore behaviour shared by the SQLite and in-memory backends

#[path = "../common/mod.rs"]
mod common;

use common::*;
use std::sync::{Arc, Barrier};

fn check_create_and_lookup(store: &dyn LicenseStore) {
    let created = store
        .create("lk_store_a", "sess_store", T0, T0 + 10 * ONE_DAY)
        .expect("create failed");
    assert_eq!(created.id, "lk_store_a");
    assert!(created.devices.is_empty());

    let by_id = store.get_by_id("lk_store_a").unwrap().expect("missing by id");
    assert_eq!(by_id.source_ref, "sess_store");
    assert_eq!(by_id.expires_at, T0 + 10 * ONE_DAY);

    let by_ref = store
        .get_by_source_ref("sess_store")
        .unwrap()
        .expect("missing by source_ref");
    assert_eq!(by_ref.id, "lk_store_a");

    assert!(store.get_by_id("lk_nope").unwrap().is_none());
    assert!(store.get_by_source_ref("sess_nope").unwrap().is_none());
}

fn check_uniqueness(store: &dyn LicenseStore) {
    store.create("lk_u1", "sess_u", T0, T0 + ONE_DAY).unwrap();

    match store.create("lk_u2", "sess_u", T0, T0 + ONE_DAY) {
        Err(LicenseError::DuplicateSourceRef { existing_id }) => assert_eq!(existing_id, "lk_u1"),
        other => panic!("expected DuplicateSourceRef, got {:?}", other),
    }
    assert!(
        store.get_by_id("lk_u2").unwrap().is_none(),
        "losing create must not leave a row behind"
    );

    let result = store.create("lk_u1", "sess_other", T0, T0 + ONE_DAY);
    assert!(matches!(result, Err(LicenseError::DuplicateId)));
    assert!(store.get_by_source_ref("sess_other").unwrap().is_none());
}

fn check_mutation(store: &dyn LicenseStore) {
    store.create("lk_m", "sess_m", T0, T0 + ONE_DAY).unwrap();
    let registry = DeviceRegistry::default();

    let updated = store
        .mutate_devices("lk_m", &mut |license: &mut License| {
            registry.admit(license, "dev-A", T0).map(|_| ())
        })
        .unwrap();
    assert_eq!(updated.active_device.as_deref(), Some("dev-A"));
    assert_eq!(updated.devices.len(), 1);

    // A failing mutation leaves the license exactly as it was
    let failed = store.mutate_devices("lk_m", &mut |license: &mut License| {
        license.active_device = Some("dev-Z".into());
        Err(LicenseError::Expired)
    });
    assert!(matches!(failed, Err(LicenseError::Expired)));

    let stored = store.get_by_id("lk_m").unwrap().unwrap();
    assert_eq!(stored.active_device.as_deref(), Some("dev-A"));

    let missing = store.mutate_devices("lk_missing", &mut |_: &mut License| Ok(()));
    assert!(matches!(missing, Err(LicenseError::NotFound)));
}

#[test]
fn test_sqlite_store_create_and_lookup() {
    let (_dir, store) = setup_sqlite_store();
    check_create_and_lookup(&store);
}

#[test]
fn test_memory_store_create_and_lookup() {
    check_create_and_lookup(&MemoryLicenseStore::new());
}

#[test]
fn test_sqlite_store_uniqueness() {
    let (_dir, store) = setup_sqlite_store();
    check_uniqueness(&store);
}

#[test]
fn test_memory_store_uniqueness() {
    check_uniqueness(&MemoryLicenseStore::new());
}

#[test]
fn test_sqlite_store_mutation() {
    let (_dir, store) = setup_sqlite_store();
    check_mutation(&store);
}

#[test]
fn test_memory_store_mutation() {
    check_mutation(&MemoryLicenseStore::new());
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let (_dir, path) = setup_test_db_file();

    {
        let store = SqliteLicenseStore::new(create_pool(&path).unwrap());
        store.create("lk_durable", "sess_durable", T0, T0 + ONE_DAY).unwrap();
        store
            .mutate_devices("lk_durable", &mut |license: &mut License| {
                DeviceRegistry::default().admit(license, "dev-A", T0).map(|_| ())
            })
            .unwrap();
    }

    let reopened = SqliteLicenseStore::new(create_pool(&path).unwrap());
    let license = reopened.get_by_id("lk_durable").unwrap().expect("license lost on reopen");
    assert_eq!(license.active_device.as_deref(), Some("dev-A"));
    assert_eq!(license.devices.len(), 1);
}

// ============ Concurrency ============

/// Many devices racing for the slots of one fresh license.
fn race_admissions(store: Arc<dyn LicenseStore>, num_threads: usize) -> Vec<bool> {
    store.create("lk_race", "sess_race", T0, T0 + ONE_DAY).unwrap();
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let store = Arc::clone(&store);

            std::thread::spawn(move || {
                let registry = DeviceRegistry::default();
                let device_id = format!("concurrent-device-{}", i);

                // Synchronize all threads to start at the same time
                barrier.wait();

                store
                    .mutate_devices("lk_race", &mut |license: &mut License| {
                        registry.admit(license, &device_id, T0).map(|_| ())
                    })
                    .is_ok()
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn assert_race_outcome(store: &dyn LicenseStore, results: &[bool]) {
    let success_count = results.iter().filter(|&&r| r).count();
    assert_eq!(
        success_count, DEFAULT_MAX_DEVICES,
        "exactly {} devices should win a slot",
        DEFAULT_MAX_DEVICES
    );

    let license = store.get_by_id("lk_race").unwrap().unwrap();
    assert_eq!(license.devices.len(), DEFAULT_MAX_DEVICES);
    let active = license.active_device.clone().expect("one device should be active");
    assert!(license.has_device(&active), "active device must be a member");
}

#[test]
fn test_sqlite_store_concurrent_admissions_respect_cap() {
    let (_dir, store) = setup_sqlite_store();
    let store: Arc<dyn LicenseStore> = Arc::new(store);

    let results = race_admissions(Arc::clone(&store), 6);
    assert_race_outcome(store.as_ref(), &results);
}

#[test]
fn test_memory_store_concurrent_admissions_respect_cap() {
    let store: Arc<dyn LicenseStore> = Arc::new(MemoryLicenseStore::new());

    let results = race_admissions(Arc::clone(&store), 8);
    assert_race_outcome(store.as_ref(), &results);
}

#[test]
fn test_sqlite_store_concurrent_creates_bind_one_license() {
    let (_dir, store) = setup_sqlite_store();
    let store = Arc::new(store);
    let num_threads = 5;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                barrier.wait();
                store.create(&format!("lk_create_{}", i), "sess_webhook", T0, T0 + ONE_DAY)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "only one create may bind the source_ref");

    for result in &results {
        if let Err(e) = result {
            match e {
                LicenseError::DuplicateSourceRef { existing_id } => {
                    assert_eq!(existing_id, &winners[0].id)
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }
}
