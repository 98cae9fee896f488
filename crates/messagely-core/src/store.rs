use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use messagely_db::{Database, format_timestamp};
use messagely_types::api::{InboxEntry, MessageDetail, OutboxEntry, SendMessageRequest};
use messagely_types::{Caller, Message, User, UserSummary};

use crate::convert;
use crate::directory::UserDirectory;
use crate::error::{CoreError, CoreResult};

/// Owns message records and decides who may see or change them.
///
/// Cheap to clone; every clone shares the same database handle. Each
/// operation does its storage work on the blocking pool, so callers on an
/// async runtime only suspend there.
#[derive(Clone)]
pub struct MessageStore {
    db: Arc<Database>,
    directory: UserDirectory,
    max_body_len: usize,
}

impl MessageStore {
    pub fn new(db: Arc<Database>, max_body_len: usize) -> Self {
        let directory = UserDirectory::new(db.clone());
        Self {
            db,
            directory,
            max_body_len,
        }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    // -- Directory, off the async runtime --

    pub async fn list_users(&self) -> CoreResult<Vec<UserSummary>> {
        self.blocking(|store| store.directory.list()).await
    }

    pub async fn profile(&self, caller: &Caller, username: &str) -> CoreResult<User> {
        let caller = caller.clone();
        let username = username.to_string();
        self.blocking(move |store| store.directory.profile(&caller, &username))
            .await
    }

    pub async fn record_login(
        &self,
        username: &str,
        at: DateTime<Utc>,
    ) -> CoreResult<Option<DateTime<Utc>>> {
        let username = username.to_string();
        self.blocking(move |store| store.directory.record_login(&username, at))
            .await
    }

    /// Sends a message from `caller`. Anyone may message anyone.
    pub async fn create(&self, caller: &Caller, req: SendMessageRequest) -> CoreResult<Message> {
        validate_body(&req.body, self.max_body_len)?;

        let from = caller.username().to_string();
        self.blocking(move |store| {
            if !store.directory.exists(&from)? {
                return Err(CoreError::UserNotFound(from));
            }
            if !store.directory.exists(&req.to_username)? {
                return Err(CoreError::RecipientNotFound(req.to_username));
            }

            let message = Message {
                id: Uuid::new_v4(),
                from_username: from,
                to_username: req.to_username,
                body: req.body,
                sent_at: now(),
                read_at: None,
            };

            store.db.insert_message(
                &message.id.to_string(),
                &message.from_username,
                &message.to_username,
                &message.body,
                &format_timestamp(&message.sent_at),
            )?;

            info!(
                "Message {} created: {} -> {}",
                message.id, message.from_username, message.to_username
            );
            Ok(message)
        })
        .await
    }

    /// Full detail of a message, for its sender or recipient only.
    pub async fn get(&self, caller: &Caller, id: Uuid) -> CoreResult<MessageDetail> {
        let caller = caller.clone();
        self.blocking(move |store| {
            let message = store.load(id)?;
            if !message.involves(caller.username()) {
                warn!("{} denied access to message {}", caller.username(), id);
                return Err(CoreError::Forbidden);
            }

            let from_user = UserSummary::from(store.directory.lookup(&message.from_username)?);
            let to_user = UserSummary::from(store.directory.lookup(&message.to_username)?);

            Ok(MessageDetail {
                id: message.id,
                body: message.body,
                sent_at: message.sent_at,
                read_at: message.read_at,
                from_user,
                to_user,
            })
        })
        .await
    }

    /// Marks a message read on behalf of its recipient. Re-marking a read
    /// message returns it unchanged.
    pub async fn mark_read(&self, caller: &Caller, id: Uuid) -> CoreResult<Message> {
        let caller = caller.clone();
        self.blocking(move |store| {
            let message = store.load(id)?;
            if !caller.is(&message.to_username) {
                warn!("{} denied marking message {} read", caller.username(), id);
                return Err(CoreError::Forbidden);
            }
            if message.is_read() {
                debug!("Message {} already read", id);
                return Ok(message);
            }

            let (row, written) = store
                .db
                .mark_read(&id.to_string(), &format_timestamp(&now()))?
                .ok_or(CoreError::MessageNotFound(id))?;
            if written {
                info!("Message {} marked read by {}", id, caller.username());
            }

            Ok(convert::message(row)?)
        })
        .await
    }

    /// Messages received by `username`, oldest first, each with its sender.
    pub async fn list_to(&self, caller: &Caller, username: &str) -> CoreResult<Vec<InboxEntry>> {
        authorize_own_mailbox(caller, username)?;

        let username = username.to_string();
        self.blocking(move |store| {
            store
                .db
                .messages_to(&username)?
                .into_iter()
                .map(|row| -> CoreResult<InboxEntry> { Ok(convert::inbox_entry(row)?) })
                .collect()
        })
        .await
    }

    /// Messages sent by `username`, oldest first, each with its recipient.
    pub async fn list_from(&self, caller: &Caller, username: &str) -> CoreResult<Vec<OutboxEntry>> {
        authorize_own_mailbox(caller, username)?;

        let username = username.to_string();
        self.blocking(move |store| {
            store
                .db
                .messages_from(&username)?
                .into_iter()
                .map(|row| -> CoreResult<OutboxEntry> { Ok(convert::outbox_entry(row)?) })
                .collect()
        })
        .await
    }

    fn load(&self, id: Uuid) -> CoreResult<Message> {
        let row = self
            .db
            .get_message(&id.to_string())?
            .ok_or(CoreError::MessageNotFound(id))?;
        Ok(convert::message(row)?)
    }

    async fn blocking<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&MessageStore) -> CoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store)).await?
    }
}

/// Stored timestamps keep microseconds; truncate so returned values match
/// what a later read yields.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn validate_body(body: &str, max_len: usize) -> CoreResult<()> {
    if body.trim().is_empty() {
        return Err(CoreError::InvalidBody("body is empty"));
    }
    if body.chars().count() > max_len {
        return Err(CoreError::InvalidBody("body is too long"));
    }
    Ok(())
}

fn authorize_own_mailbox(caller: &Caller, username: &str) -> CoreResult<()> {
    if caller.is(username) {
        Ok(())
    } else {
        warn!("{} denied listing messages of {}", caller.username(), username);
        Err(CoreError::Forbidden)
    }
}
