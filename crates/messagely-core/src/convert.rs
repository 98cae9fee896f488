//! Row-to-model conversion. Stored ids and timestamps are text; anything that
//! fails to parse is logged and surfaced as a storage error.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use messagely_db::models::{MessageRow, PartyMessageRow, UserRow};
use messagely_db::parse_timestamp;
use messagely_types::api::{InboxEntry, OutboxEntry};
use messagely_types::{Message, User, UserSummary};

fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse().map_err(|e| {
        warn!("Corrupt message id '{}': {}", raw, e);
        anyhow!("Corrupt message id '{}': {}", raw, e)
    })
}

fn parse_ts(raw: &str, field: &str, owner: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).inspect_err(|e| warn!("Corrupt {} on '{}': {}", field, owner, e))
}

fn parse_opt_ts(raw: Option<&str>, field: &str, owner: &str) -> Result<Option<DateTime<Utc>>> {
    raw.map(|r| parse_ts(r, field, owner)).transpose()
}

pub fn user(row: UserRow) -> Result<User> {
    let join_at = parse_ts(&row.join_at, "join_at", &row.username)?;
    let last_login_at = parse_opt_ts(row.last_login_at.as_deref(), "last_login_at", &row.username)?;

    Ok(User {
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
        join_at,
        last_login_at,
    })
}

pub fn message(row: MessageRow) -> Result<Message> {
    let id = parse_id(&row.id)?;
    let sent_at = parse_ts(&row.sent_at, "sent_at", &row.id)?;
    let read_at = parse_opt_ts(row.read_at.as_deref(), "read_at", &row.id)?;

    Ok(Message {
        id,
        from_username: row.from_username,
        to_username: row.to_username,
        body: row.body,
        sent_at,
        read_at,
    })
}

struct PartyParts {
    id: Uuid,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    party: UserSummary,
}

fn party_parts(row: PartyMessageRow) -> Result<PartyParts> {
    let id = parse_id(&row.id)?;
    let sent_at = parse_ts(&row.sent_at, "sent_at", &row.id)?;
    let read_at = parse_opt_ts(row.read_at.as_deref(), "read_at", &row.id)?;

    Ok(PartyParts {
        id,
        body: row.body,
        sent_at,
        read_at,
        party: UserSummary {
            username: row.party_username,
            first_name: row.party_first_name,
            last_name: row.party_last_name,
            phone: row.party_phone,
        },
    })
}

pub fn inbox_entry(row: PartyMessageRow) -> Result<InboxEntry> {
    let p = party_parts(row)?;
    Ok(InboxEntry {
        id: p.id,
        body: p.body,
        sent_at: p.sent_at,
        read_at: p.read_at,
        from_user: p.party,
    })
}

pub fn outbox_entry(row: PartyMessageRow) -> Result<OutboxEntry> {
    let p = party_parts(row)?;
    Ok(OutboxEntry {
        id: p.id,
        body: p.body,
        sent_at: p.sent_at,
        read_at: p.read_at,
        to_user: p.party,
    })
}
