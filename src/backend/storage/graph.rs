/**
 * PostgreSQL Graph Storage
 *
 * Production `StorageGateway`. The data is a small property graph kept in
 * relational tables (see `migrations/0001_graph.sql`):
 *
 * - nodes: `persons`, `listings`
 * - edges: `messages` (person → person), `selling` (person → listing),
 *   `purchases` (person → listing)
 *
 * Purchases run in a transaction that locks the listing row, so two buyers
 * racing for the same listing see exactly one success.
 */

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::{now_millis, StorageError, StorageGateway};
use crate::backend::auth::PasswordHasher;
use crate::shared::marketplace::{Listing, NewListing};
use crate::shared::messaging::{Contact, Message, MESSAGE_PAGE_SIZE};

const EMAIL_CONSTRAINT: &str = "persons_email_key";
const USERNAME_CONSTRAINT: &str = "persons_pkey";

#[derive(Debug, FromRow)]
struct MessageRow {
    contents: String,
    sent_at: i64,
    read_at: i64,
    sent_by_viewer: bool,
}

#[derive(Debug, FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: String,
    images: Vec<String>,
    price: i64,
    symbol: String,
    active: bool,
    owner: String,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            images: row.images,
            price: row.price,
            symbol: row.symbol,
            active: row.active,
            owner: row.owner,
        }
    }
}

#[derive(Debug, FromRow)]
struct ContactRow {
    username: String,
    avatar_url: Option<String>,
}

/// Map unique-constraint violations on `persons` to the conflict kinds
fn profile_conflict(err: sqlx::Error) -> StorageError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(EMAIL_CONSTRAINT) => return StorageError::EmailInUse,
                Some(USERNAME_CONSTRAINT) => return StorageError::UsernameInUse,
                _ => {}
            }
        }
    }
    err.into()
}

/// Advisory lock key shared by both directions of a conversation
fn conversation_key(a: &str, b: &str) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("{}\u{1f}{}", first, second)
}

/// Serialize writers of one conversation until the transaction ends
async fn lock_conversation(
    tx: &mut Transaction<'_, Postgres>,
    a: &str,
    b: &str,
) -> Result<(), StorageError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(conversation_key(a, b))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn require_person(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<(), StorageError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM persons WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut **tx)
            .await?;

    if exists {
        Ok(())
    } else {
        Err(StorageError::AccountNotFound {
            username: username.to_string(),
        })
    }
}

/// `StorageGateway` over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct GraphStorage {
    pool: PgPool,
    hasher: PasswordHasher,
}

impl GraphStorage {
    pub fn new(pool: PgPool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    /// Connect to `database_url` and bring the schema up to date
    pub async fn connect(database_url: &str, hasher: PasswordHasher) -> Result<Self, StorageError> {
        info!("[Storage] Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("[Storage] Running database migrations...");
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StorageError::unknown(format!("migration failed: {}", e)))?;

        Ok(Self::new(pool, hasher))
    }
}

#[async_trait]
impl StorageGateway for GraphStorage {
    async fn check_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<String, StorageError> {
        let column = if identifier.contains('@') { "email" } else { "username" };
        let query = format!(
            "SELECT username, password_hash FROM persons WHERE {} = $1",
            column
        );

        let (username, password_hash): (String, String) = sqlx::query_as(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::InvalidCredentials)?;

        if self.hasher.verify_async(password, &password_hash).await? {
            Ok(username)
        } else {
            Err(StorageError::InvalidCredentials)
        }
    }

    async fn create_profile(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), StorageError> {
        // Checked up front so a double conflict reports the e-mail.
        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM persons WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        if email_taken {
            return Err(StorageError::EmailInUse);
        }

        let password_hash = self.hasher.hash_async(password).await?;

        sqlx::query("INSERT INTO persons (username, email, password_hash) VALUES ($1, $2, $3)")
            .bind(username)
            .bind(email)
            .bind(&password_hash)
            .execute(&self.pool)
            .await
            .map_err(profile_conflict)?;

        debug!("[Storage] Created profile {}", username);
        Ok(())
    }

    async fn create_message(
        &self,
        sender: &str,
        receiver: &str,
        text: &str,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        require_person(&mut tx, sender).await?;
        require_person(&mut tx, receiver).await?;

        // Timestamps stay strictly increasing within a conversation so the
        // `since` cursor never skips a message. The lock keeps two senders
        // from reading the same MAX.
        lock_conversation(&mut tx, sender, receiver).await?;
        sqlx::query(
            r#"
            INSERT INTO messages (sender, receiver, contents, sent_at)
            SELECT $1, $2, $3, GREATEST($4, COALESCE(MAX(sent_at), 0) + 1)
            FROM messages
            WHERE (sender = $1 AND receiver = $2) OR (sender = $2 AND receiver = $1)
            "#,
        )
        .bind(sender)
        .bind(receiver)
        .bind(text)
        .bind(now_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_messages(
        &self,
        viewer: &str,
        counterpart: &str,
        since: i64,
    ) -> Result<Vec<Message>, StorageError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            WITH page AS (
                SELECT id FROM messages
                WHERE ((sender = $1 AND receiver = $2) OR (sender = $2 AND receiver = $1))
                  AND sent_at > $3
                ORDER BY sent_at ASC, id ASC
                LIMIT $4
            ),
            marked AS (
                UPDATE messages m SET read_at = $5
                FROM page
                WHERE m.id = page.id AND m.receiver = $1 AND m.read_at = 0
                RETURNING m.id, m.read_at
            )
            SELECT m.contents, m.sent_at,
                   COALESCE(marked.read_at, m.read_at) AS read_at,
                   m.sender = $1 AS sent_by_viewer
            FROM messages m
            JOIN page ON page.id = m.id
            LEFT JOIN marked ON marked.id = m.id
            ORDER BY m.sent_at ASC, m.id ASC
            "#,
        )
        .bind(viewer)
        .bind(counterpart)
        .bind(since)
        .bind(MESSAGE_PAGE_SIZE as i64)
        .bind(now_millis())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Message {
                contents: row.contents,
                timestamp: row.sent_at,
                read_at: row.read_at,
                sent_by_viewer: row.sent_by_viewer,
            })
            .collect())
    }

    async fn upload_listing(&self, owner: &str, listing: NewListing) -> Result<i64, StorageError> {
        let mut tx = self.pool.begin().await?;
        require_person(&mut tx, owner).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO listings (title, description, images, price, symbol)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.images)
        .bind(listing.price)
        .bind(&listing.symbol)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO selling (listing_id, seller) VALUES ($1, $2)")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn buy_listing(
        &self,
        buyer: &str,
        listing_id: i64,
        amount: i64,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        let (price, active, seller): (i64, bool, String) = sqlx::query_as(
            r#"
            SELECT l.price, l.active, s.seller
            FROM listings l
            JOIN selling s ON s.listing_id = l.id
            WHERE l.id = $1
            FOR UPDATE OF l
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::ListingNotFound { listing_id })?;

        require_person(&mut tx, buyer).await?;
        if seller == buyer {
            return Err(StorageError::SelfPurchase { listing_id });
        }
        if !active {
            return Err(StorageError::AlreadySold { listing_id });
        }
        if amount < price {
            return Err(StorageError::InsufficientAmount { amount, price });
        }

        sqlx::query("UPDATE listings SET active = FALSE WHERE id = $1")
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO purchases (listing_id, buyer, amount) VALUES ($1, $2, $3)")
            .bind(listing_id)
            .bind(buyer)
            .bind(amount)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("[Storage] {} bought listing {}", buyer, listing_id);
        Ok(())
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Listing, StorageError> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT l.id, l.title, l.description, l.images, l.price, l.symbol, l.active,
                   s.seller AS owner
            FROM listings l
            JOIN selling s ON s.listing_id = l.id
            WHERE l.id = $1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::ListingNotFound { listing_id })?;

        Ok(row.into())
    }

    async fn get_contacts(&self, username: &str) -> Result<Vec<Contact>, StorageError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT p.username, p.avatar_url
            FROM (
                SELECT receiver AS counterpart FROM messages WHERE sender = $1
                UNION
                SELECT sender FROM messages WHERE receiver = $1
            ) c
            JOIN persons p ON p.username = c.counterpart
            ORDER BY p.username
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Contact {
                username: row.username,
                avatar_url: row.avatar_url,
            })
            .collect())
    }
}
