//! Database row types. These map directly to SQLite rows and keep timestamps
//! as stored text; conversion into `messagely-types` models happens above.

pub struct UserRow {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub join_at: String,
    pub last_login_at: Option<String>,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
}

pub struct MessageRow {
    pub id: String,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
}

/// A message joined with the identity fields of one counterpart user.
pub struct PartyMessageRow {
    pub id: String,
    pub body: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub party_username: String,
    pub party_first_name: String,
    pub party_last_name: String,
    pub party_phone: String,
}
