/// File-backed store: writes survive a reopen and are visible to the reader pool.
mod common;

use std::fs;

use common::{caller, init_tracing, seed, send, temp_config};

#[tokio::test]
async fn messages_survive_reopen() {
    init_tracing();
    let config = temp_config("reopen");
    seed(&config);

    let id = {
        let store = messagely_core::open(&config).unwrap();
        let msg = store.create(&caller("alice"), send("bob", "durable")).await.unwrap();
        store.mark_read(&caller("bob"), msg.id).await.unwrap();
        msg.id
    };

    let store = messagely_core::open(&config).unwrap();
    let detail = store.get(&caller("alice"), id).await.unwrap();
    assert_eq!(detail.body, "durable");
    assert!(detail.read_at.is_some());

    let _ = fs::remove_dir_all(config.db_path.parent().unwrap());
}

#[tokio::test]
async fn readers_see_committed_writes() {
    init_tracing();
    let config = temp_config("readers");
    seed(&config);

    let store = messagely_core::open(&config).unwrap();
    for i in 0..8 {
        store
            .create(&caller("alice"), send("bob", &format!("m{i}")))
            .await
            .unwrap();
        // Each list hits the next reader connection in turn.
        let inbox = store.list_to(&caller("bob"), "bob").await.unwrap();
        assert_eq!(inbox.len(), i + 1);
    }

    let _ = fs::remove_dir_all(config.db_path.parent().unwrap());
}
