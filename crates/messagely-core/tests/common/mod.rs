#![allow(dead_code)]

use std::fs;
use std::sync::Arc;

use chrono::Utc;
use messagely_core::{Config, MessageStore};
use messagely_core::config::DEFAULT_MAX_BODY_LEN;
use messagely_db::models::NewUser;
use messagely_db::{Database, format_timestamp};
use messagely_types::Caller;
use messagely_types::api::SendMessageRequest;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "messagely_core=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// In-memory store with alice, bob and carol registered.
pub fn store() -> MessageStore {
    init_tracing();

    let db = Database::open_in_memory().unwrap();
    let join_at = format_timestamp(&Utc::now());
    for (username, first_name, last_name, phone) in [
        ("alice", "Alice", "Liddell", "+15550101"),
        ("bob", "Bob", "Builder", "+15550102"),
        ("carol", "Carol", "Danvers", "+15550103"),
    ] {
        db.create_user(
            &NewUser {
                username,
                first_name,
                last_name,
                phone,
            },
            &join_at,
        )
        .unwrap();
    }

    MessageStore::new(Arc::new(db), DEFAULT_MAX_BODY_LEN)
}

pub fn caller(username: &str) -> Caller {
    Caller::new(username)
}

pub fn send(to: &str, body: &str) -> SendMessageRequest {
    SendMessageRequest {
        to_username: to.into(),
        body: body.into(),
    }
}

/// Fresh directory under the system temp dir holding the database file.
pub fn temp_config(name: &str) -> Config {
    let dir = std::env::temp_dir()
        .join(format!("messagely_test_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    Config {
        db_path: dir.join("messagely.db"),
        ..Config::default()
    }
}

/// Registers alice and bob in a file-backed database.
pub fn seed(config: &Config) {
    let db = Database::open(&config.db_path).unwrap();
    let join_at = format_timestamp(&Utc::now());
    for username in ["alice", "bob"] {
        db.create_user(
            &NewUser {
                username,
                first_name: username,
                last_name: "Test",
                phone: "555-0100",
            },
            &join_at,
        )
        .unwrap();
    }
}
