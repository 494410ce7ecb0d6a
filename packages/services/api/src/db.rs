//! Ownership store
//!
//! Typed CRUD over the holder → account → character → inventory
//! hierarchy. Every operation below the root resolves its parent chain
//! first; a segment that does not resolve under its parent is
//! `NotFound` for that segment's kind. Multi-statement writes run in
//! one transaction, committed on success and rolled back on any other
//! exit path.

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{SqliteConnection, SqlitePool};

use guildhall_core::Error as CoreError;

use crate::error::{ApiError, Result};

#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HolderRow {
    pub id: String,
    pub login: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
    pub last_login_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AccountRow {
    pub id: String,
    pub holder_id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CharacterRow {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InventoryRow {
    pub id: String,
    pub character_id: String,
    pub item: String,
    pub created_at: String,
}

fn not_found(kind: &str) -> ApiError {
    CoreError::NotFound {
        kind: kind.to_string(),
    }
    .into()
}

fn conflict(field: &str) -> ApiError {
    CoreError::Conflict {
        field: field.to_string(),
    }
    .into()
}

fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

impl Db {
    pub async fn connect(db_url: &str) -> Result<Self> {
        use std::str::FromStr;

        let options = sqlx::sqlite::SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init(&self) -> Result<()> {
        let stmts = [
            r#"CREATE TABLE IF NOT EXISTS holders (
                id TEXT PRIMARY KEY,
                login TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login_at TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                holder_id TEXT NOT NULL,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS characters (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS inventories (
                id TEXT PRIMARY KEY,
                character_id TEXT NOT NULL UNIQUE,
                item TEXT NOT NULL,
                created_at TEXT NOT NULL
            )"#,
        ];
        for s in stmts {
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ── Holders ──────────────────────────────────────────────────────

    pub async fn create_holder(
        &self,
        login: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<HolderRow> {
        let mut tx = self.pool.begin().await?;

        if login_taken(&mut tx, login, None).await? {
            return Err(conflict("login"));
        }
        if email_taken(&mut tx, email, None).await? {
            return Err(conflict("email"));
        }

        let id = new_id();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO holders (id, login, email, password_hash, created_at, last_login_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?5)"#,
        )
        .bind(&id)
        .bind(login)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(HolderRow {
            id,
            login: login.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now.clone(),
            last_login_at: now,
        })
    }

    pub async fn list_holders(&self) -> Result<Vec<HolderRow>> {
        let rows = sqlx::query_as::<_, HolderRow>(
            r#"SELECT id, login, email, password_hash, created_at, last_login_at
               FROM holders ORDER BY created_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_holder(&self, id: &str) -> Result<HolderRow> {
        let mut conn = self.pool.acquire().await?;
        fetch_holder(&mut conn, id).await?.ok_or_else(|| not_found("user"))
    }

    pub async fn find_holder_by_email(&self, email: &str) -> Result<Option<HolderRow>> {
        let row = sqlx::query_as::<_, HolderRow>(
            r#"SELECT id, login, email, password_hash, created_at, last_login_at
               FROM holders WHERE email = ?1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Single query matching either login or email, for the login form.
    pub async fn find_holder_by_identifier(&self, identifier: &str) -> Result<Option<HolderRow>> {
        let row = sqlx::query_as::<_, HolderRow>(
            r#"SELECT id, login, email, password_hash, created_at, last_login_at
               FROM holders WHERE login = ?1 OR email = ?1"#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Whole-record replace of the editable fields. The password hash
    /// is only touched when a new one is supplied.
    pub async fn update_holder(
        &self,
        id: &str,
        login: &str,
        email: &str,
        password_hash: Option<&str>,
    ) -> Result<HolderRow> {
        let mut tx = self.pool.begin().await?;

        if fetch_holder(&mut tx, id).await?.is_none() {
            return Err(not_found("user"));
        }
        if login_taken(&mut tx, login, Some(id)).await? {
            return Err(conflict("login"));
        }
        if email_taken(&mut tx, email, Some(id)).await? {
            return Err(conflict("email"));
        }

        sqlx::query(r#"UPDATE holders SET login = ?1, email = ?2 WHERE id = ?3"#)
            .bind(login)
            .bind(email)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if let Some(hash) = password_hash {
            sqlx::query(r#"UPDATE holders SET password_hash = ?1 WHERE id = ?2"#)
                .bind(hash)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let updated = fetch_holder(&mut tx, id).await?.ok_or_else(|| not_found("user"))?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn touch_last_login(&self, id: &str) -> Result<()> {
        sqlx::query(r#"UPDATE holders SET last_login_at = ?1 WHERE id = ?2"#)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a holder and everything it transitively owns, returning
    /// the deleted snapshot.
    pub async fn delete_holder(&self, id: &str) -> Result<HolderRow> {
        let mut tx = self.pool.begin().await?;

        let holder = fetch_holder(&mut tx, id).await?.ok_or_else(|| not_found("user"))?;

        sqlx::query(
            r#"DELETE FROM inventories WHERE character_id IN (
                 SELECT c.id FROM characters c
                 JOIN accounts a ON c.account_id = a.id
                 WHERE a.holder_id = ?1)"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"DELETE FROM characters WHERE account_id IN (
                 SELECT id FROM accounts WHERE holder_id = ?1)"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM accounts WHERE holder_id = ?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM holders WHERE id = ?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(holder)
    }

    // ── Accounts ─────────────────────────────────────────────────────

    pub async fn list_accounts(&self, holder_id: &str) -> Result<Vec<AccountRow>> {
        let mut conn = self.pool.acquire().await?;
        if fetch_holder(&mut conn, holder_id).await?.is_none() {
            return Err(not_found("user"));
        }
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"SELECT id, holder_id, name, created_at
               FROM accounts WHERE holder_id = ?1 ORDER BY created_at ASC"#,
        )
        .bind(holder_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn create_account(&self, holder_id: &str, name: &str) -> Result<AccountRow> {
        let mut tx = self.pool.begin().await?;

        if fetch_holder(&mut tx, holder_id).await?.is_none() {
            return Err(not_found("user"));
        }
        if account_name_taken(&mut tx, name, None).await? {
            return Err(conflict("name"));
        }

        let id = new_id();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO accounts (id, holder_id, name, created_at) VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(&id)
        .bind(holder_id)
        .bind(name)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(AccountRow {
            id,
            holder_id: holder_id.to_string(),
            name: name.to_string(),
            created_at: now,
        })
    }

    pub async fn get_account(&self, holder_id: &str, account_id: &str) -> Result<AccountRow> {
        let mut conn = self.pool.acquire().await?;
        resolve_account(&mut conn, holder_id, account_id).await
    }

    pub async fn rename_account(
        &self,
        holder_id: &str,
        account_id: &str,
        name: &str,
    ) -> Result<AccountRow> {
        let mut tx = self.pool.begin().await?;

        let account = resolve_account(&mut tx, holder_id, account_id).await?;
        if account_name_taken(&mut tx, name, Some(account_id)).await? {
            return Err(conflict("name"));
        }

        sqlx::query(r#"UPDATE accounts SET name = ?1 WHERE id = ?2"#)
            .bind(name)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(AccountRow {
            name: name.to_string(),
            ..account
        })
    }

    pub async fn delete_account(&self, holder_id: &str, account_id: &str) -> Result<AccountRow> {
        let mut tx = self.pool.begin().await?;

        let account = resolve_account(&mut tx, holder_id, account_id).await?;

        sqlx::query(
            r#"DELETE FROM inventories WHERE character_id IN (
                 SELECT id FROM characters WHERE account_id = ?1)"#,
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM characters WHERE account_id = ?1"#)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM accounts WHERE id = ?1"#)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(account)
    }

    // ── Characters ───────────────────────────────────────────────────

    pub async fn list_characters(
        &self,
        holder_id: &str,
        account_id: &str,
    ) -> Result<Vec<CharacterRow>> {
        let mut conn = self.pool.acquire().await?;
        resolve_account(&mut conn, holder_id, account_id).await?;
        let rows = sqlx::query_as::<_, CharacterRow>(
            r#"SELECT id, account_id, name, created_at
               FROM characters WHERE account_id = ?1 ORDER BY created_at ASC"#,
        )
        .bind(account_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn create_character(
        &self,
        holder_id: &str,
        account_id: &str,
        name: &str,
    ) -> Result<CharacterRow> {
        let mut tx = self.pool.begin().await?;

        resolve_account(&mut tx, holder_id, account_id).await?;
        if character_name_taken(&mut tx, name, None).await? {
            return Err(conflict("name"));
        }

        let id = new_id();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO characters (id, account_id, name, created_at) VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(&id)
        .bind(account_id)
        .bind(name)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(CharacterRow {
            id,
            account_id: account_id.to_string(),
            name: name.to_string(),
            created_at: now,
        })
    }

    pub async fn get_character(
        &self,
        holder_id: &str,
        account_id: &str,
        character_id: &str,
    ) -> Result<CharacterRow> {
        let mut conn = self.pool.acquire().await?;
        resolve_character(&mut conn, holder_id, account_id, character_id).await
    }

    pub async fn rename_character(
        &self,
        holder_id: &str,
        account_id: &str,
        character_id: &str,
        name: &str,
    ) -> Result<CharacterRow> {
        let mut tx = self.pool.begin().await?;

        let character = resolve_character(&mut tx, holder_id, account_id, character_id).await?;
        if character_name_taken(&mut tx, name, Some(character_id)).await? {
            return Err(conflict("name"));
        }

        sqlx::query(r#"UPDATE characters SET name = ?1 WHERE id = ?2"#)
            .bind(name)
            .bind(character_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(CharacterRow {
            name: name.to_string(),
            ..character
        })
    }

    pub async fn delete_character(
        &self,
        holder_id: &str,
        account_id: &str,
        character_id: &str,
    ) -> Result<CharacterRow> {
        let mut tx = self.pool.begin().await?;

        let character = resolve_character(&mut tx, holder_id, account_id, character_id).await?;

        sqlx::query(r#"DELETE FROM inventories WHERE character_id = ?1"#)
            .bind(character_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM characters WHERE id = ?1"#)
            .bind(character_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(character)
    }

    // ── Inventory ────────────────────────────────────────────────────

    pub async fn get_inventory(
        &self,
        holder_id: &str,
        account_id: &str,
        character_id: &str,
    ) -> Result<InventoryRow> {
        let mut conn = self.pool.acquire().await?;
        resolve_character(&mut conn, holder_id, account_id, character_id).await?;
        fetch_inventory(&mut conn, character_id)
            .await?
            .ok_or_else(|| not_found("inventory"))
    }

    /// Create the character's inventory. An existing record is replaced
    /// wholesale: the old row is dropped and a fresh id assigned.
    pub async fn replace_inventory(
        &self,
        holder_id: &str,
        account_id: &str,
        character_id: &str,
        item: &str,
    ) -> Result<InventoryRow> {
        let mut tx = self.pool.begin().await?;

        resolve_character(&mut tx, holder_id, account_id, character_id).await?;

        sqlx::query(r#"DELETE FROM inventories WHERE character_id = ?1"#)
            .bind(character_id)
            .execute(&mut *tx)
            .await?;

        let id = new_id();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO inventories (id, character_id, item, created_at) VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(&id)
        .bind(character_id)
        .bind(item)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(InventoryRow {
            id,
            character_id: character_id.to_string(),
            item: item.to_string(),
            created_at: now,
        })
    }

    /// In-place update. The row keeps its id; requires an inventory to
    /// already exist.
    pub async fn update_inventory(
        &self,
        holder_id: &str,
        account_id: &str,
        character_id: &str,
        item: &str,
    ) -> Result<InventoryRow> {
        let mut tx = self.pool.begin().await?;

        resolve_character(&mut tx, holder_id, account_id, character_id).await?;
        let inventory = fetch_inventory(&mut tx, character_id)
            .await?
            .ok_or_else(|| not_found("inventory"))?;

        sqlx::query(r#"UPDATE inventories SET item = ?1 WHERE id = ?2"#)
            .bind(item)
            .bind(&inventory.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(InventoryRow {
            item: item.to_string(),
            ..inventory
        })
    }

    pub async fn delete_inventory(
        &self,
        holder_id: &str,
        account_id: &str,
        character_id: &str,
    ) -> Result<InventoryRow> {
        let mut tx = self.pool.begin().await?;

        resolve_character(&mut tx, holder_id, account_id, character_id).await?;
        let inventory = fetch_inventory(&mut tx, character_id)
            .await?
            .ok_or_else(|| not_found("inventory"))?;

        sqlx::query(r#"DELETE FROM inventories WHERE id = ?1"#)
            .bind(&inventory.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inventory)
    }
}

// ── Chain resolution ─────────────────────────────────────────────────

async fn fetch_holder(conn: &mut SqliteConnection, id: &str) -> Result<Option<HolderRow>> {
    let row = sqlx::query_as::<_, HolderRow>(
        r#"SELECT id, login, email, password_hash, created_at, last_login_at
           FROM holders WHERE id = ?1"#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Holder then account, failing on the first segment that does not
/// resolve. An account that exists under a different holder is a dead
/// path segment, not someone else's data to reveal.
async fn resolve_account(
    conn: &mut SqliteConnection,
    holder_id: &str,
    account_id: &str,
) -> Result<AccountRow> {
    if fetch_holder(&mut *conn, holder_id).await?.is_none() {
        return Err(not_found("user"));
    }
    sqlx::query_as::<_, AccountRow>(
        r#"SELECT id, holder_id, name, created_at
           FROM accounts WHERE id = ?1 AND holder_id = ?2"#,
    )
    .bind(account_id)
    .bind(holder_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| not_found("account"))
}

async fn resolve_character(
    conn: &mut SqliteConnection,
    holder_id: &str,
    account_id: &str,
    character_id: &str,
) -> Result<CharacterRow> {
    resolve_account(&mut *conn, holder_id, account_id).await?;
    sqlx::query_as::<_, CharacterRow>(
        r#"SELECT id, account_id, name, created_at
           FROM characters WHERE id = ?1 AND account_id = ?2"#,
    )
    .bind(character_id)
    .bind(account_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| not_found("character"))
}

async fn fetch_inventory(
    conn: &mut SqliteConnection,
    character_id: &str,
) -> Result<Option<InventoryRow>> {
    let row = sqlx::query_as::<_, InventoryRow>(
        r#"SELECT id, character_id, item, created_at
           FROM inventories WHERE character_id = ?1"#,
    )
    .bind(character_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

async fn login_taken(
    conn: &mut SqliteConnection,
    login: &str,
    exclude_id: Option<&str>,
) -> Result<bool> {
    let row = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM holders WHERE login = ?1 AND id != COALESCE(?2, '')"#,
    )
    .bind(login)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row > 0)
}

async fn email_taken(
    conn: &mut SqliteConnection,
    email: &str,
    exclude_id: Option<&str>,
) -> Result<bool> {
    let row = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM holders WHERE email = ?1 AND id != COALESCE(?2, '')"#,
    )
    .bind(email)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row > 0)
}

async fn account_name_taken(
    conn: &mut SqliteConnection,
    name: &str,
    exclude_id: Option<&str>,
) -> Result<bool> {
    let row = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM accounts WHERE name = ?1 AND id != COALESCE(?2, '')"#,
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row > 0)
}

async fn character_name_taken(
    conn: &mut SqliteConnection,
    name: &str,
    exclude_id: Option<&str>,
) -> Result<bool> {
    let row = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM characters WHERE name = ?1 AND id != COALESCE(?2, '')"#,
    )
    .bind(name)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildhall_core::Error as CoreError;

    async fn test_db() -> Db {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = Db::from_pool(pool);
        db.init().await.unwrap();
        db
    }

    fn assert_not_found(err: ApiError, expected_kind: &str) {
        match err {
            ApiError::Core(CoreError::NotFound { kind }) => assert_eq!(kind, expected_kind),
            other => panic!("expected NotFound({expected_kind}), got {other:?}"),
        }
    }

    fn assert_conflict(err: ApiError, expected_field: &str) {
        match err {
            ApiError::Core(CoreError::Conflict { field }) => assert_eq!(field, expected_field),
            other => panic!("expected Conflict({expected_field}), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_holder_create_and_conflicts() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        assert_eq!(alice.login, "alice");

        let err = db.create_holder("alice", "other@x.com", "phc").await.unwrap_err();
        assert_conflict(err, "login");
        let err = db.create_holder("bob", "a@x.com", "phc").await.unwrap_err();
        assert_conflict(err, "email");

        // case-sensitive duplicate policy: a different case is a new holder
        db.create_holder("Alice", "A@x.com", "phc").await.unwrap();
    }

    #[tokio::test]
    async fn test_holder_lookup_by_login_or_email() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();

        let by_login = db.find_holder_by_identifier("alice").await.unwrap().unwrap();
        let by_email = db.find_holder_by_identifier("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_login.id, alice.id);
        assert_eq!(by_email.id, alice.id);
        assert!(db.find_holder_by_identifier("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_holder_update_replaces_fields() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();

        let updated = db
            .update_holder(&alice.id, "alice2", "a2@x.com", None)
            .await
            .unwrap();
        assert_eq!(updated.login, "alice2");
        assert_eq!(updated.email, "a2@x.com");
        assert_eq!(updated.password_hash, "phc");

        let updated = db
            .update_holder(&alice.id, "alice2", "a2@x.com", Some("phc2"))
            .await
            .unwrap();
        assert_eq!(updated.password_hash, "phc2");

        let bob = db.create_holder("bob", "b@x.com", "phc").await.unwrap();
        let err = db
            .update_holder(&bob.id, "alice2", "b@x.com", None)
            .await
            .unwrap_err();
        assert_conflict(err, "login");
    }

    #[tokio::test]
    async fn test_account_requires_resolvable_holder() {
        let db = test_db().await;
        let err = db.create_account("no-such-id", "main").await.unwrap_err();
        assert_not_found(err, "user");
        let err = db.list_accounts("no-such-id").await.unwrap_err();
        assert_not_found(err, "user");
    }

    #[tokio::test]
    async fn test_character_under_missing_account_creates_no_row() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();

        let err = db
            .create_character(&alice.id, "no-such-account", "conan")
            .await
            .unwrap_err();
        assert_not_found(err, "account");

        let account = db.create_account(&alice.id, "main").await.unwrap();
        assert!(db
            .list_characters(&alice.id, &account.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_chain_segment_must_belong_to_parent() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        let bob = db.create_holder("bob", "b@x.com", "phc").await.unwrap();
        let alice_acct = db.create_account(&alice.id, "main").await.unwrap();

        // bob's path cannot address alice's account
        let err = db.get_account(&bob.id, &alice_acct.id).await.unwrap_err();
        assert_not_found(err, "account");
    }

    #[tokio::test]
    async fn test_character_name_unique() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        let a1 = db.create_account(&alice.id, "main").await.unwrap();
        let a2 = db.create_account(&alice.id, "alt").await.unwrap();

        db.create_character(&alice.id, &a1.id, "conan").await.unwrap();
        // unique across all accounts, not just the parent
        let err = db
            .create_character(&alice.id, &a2.id, "conan")
            .await
            .unwrap_err();
        assert_conflict(err, "name");
    }

    #[tokio::test]
    async fn test_delete_holder_cascades() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        let account = db.create_account(&alice.id, "main").await.unwrap();
        let character = db
            .create_character(&alice.id, &account.id, "conan")
            .await
            .unwrap();
        db.replace_inventory(&alice.id, &account.id, &character.id, "sword")
            .await
            .unwrap();

        let snapshot = db.delete_holder(&alice.id).await.unwrap();
        assert_eq!(snapshot.id, alice.id);

        let err = db.get_holder(&alice.id).await.unwrap_err();
        assert_not_found(err, "user");
        let err = db.list_accounts(&alice.id).await.unwrap_err();
        assert_not_found(err, "user");

        // no orphans left behind
        let leftovers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(leftovers, 0);
        let leftovers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM characters")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(leftovers, 0);
        let leftovers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventories")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_delete_is_not_idempotent() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        let account = db.create_account(&alice.id, "main").await.unwrap();

        db.delete_account(&alice.id, &account.id).await.unwrap();
        let err = db.delete_account(&alice.id, &account.id).await.unwrap_err();
        assert_not_found(err, "account");

        db.delete_holder(&alice.id).await.unwrap();
        let err = db.delete_holder(&alice.id).await.unwrap_err();
        assert_not_found(err, "user");
    }

    #[tokio::test]
    async fn test_inventory_replace_assigns_new_id() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        let account = db.create_account(&alice.id, "main").await.unwrap();
        let character = db
            .create_character(&alice.id, &account.id, "conan")
            .await
            .unwrap();

        let first = db
            .replace_inventory(&alice.id, &account.id, &character.id, "sword")
            .await
            .unwrap();
        let second = db
            .replace_inventory(&alice.id, &account.id, &character.id, "shield")
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let current = db
            .get_inventory(&alice.id, &account.id, &character.id)
            .await
            .unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.item, "shield");
    }

    #[tokio::test]
    async fn test_inventory_update_keeps_id() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        let account = db.create_account(&alice.id, "main").await.unwrap();
        let character = db
            .create_character(&alice.id, &account.id, "conan")
            .await
            .unwrap();

        // update without an existing record is NotFound
        let err = db
            .update_inventory(&alice.id, &account.id, &character.id, "axe")
            .await
            .unwrap_err();
        assert_not_found(err, "inventory");

        let created = db
            .replace_inventory(&alice.id, &account.id, &character.id, "sword")
            .await
            .unwrap();
        let updated = db
            .update_inventory(&alice.id, &account.id, &character.id, "axe")
            .await
            .unwrap();
        assert_eq!(created.id, updated.id);
        assert_eq!(updated.item, "axe");
    }

    #[tokio::test]
    async fn test_inventory_delete_then_delete_again() {
        let db = test_db().await;
        let alice = db.create_holder("alice", "a@x.com", "phc").await.unwrap();
        let account = db.create_account(&alice.id, "main").await.unwrap();
        let character = db
            .create_character(&alice.id, &account.id, "conan")
            .await
            .unwrap();
        db.replace_inventory(&alice.id, &account.id, &character.id, "sword")
            .await
            .unwrap();

        let snapshot = db
            .delete_inventory(&alice.id, &account.id, &character.id)
            .await
            .unwrap();
        assert_eq!(snapshot.item, "sword");

        let err = db
            .delete_inventory(&alice.id, &account.id, &character.id)
            .await
            .unwrap_err();
        assert_not_found(err, "inventory");
    }
}
