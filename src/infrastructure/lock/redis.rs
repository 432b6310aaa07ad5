//! Redis-backed seat lock store
//!
//! Each lock is a plain string key `{prefix}:{show_id}:{seat_id}` whose value
//! is the holder's requester id, written with `SET NX PX` so creation and
//! expiry happen in one atomic command.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError, Script};
use tracing::{debug, info, warn};

use crate::domain::{DomainError, DomainResult, SeatKey, SeatLockStore};
use crate::shared::errors::InfraError;

/// Deletes the key only while it still carries the caller's holder id.
/// Returns 1 when deleted, 0 when absent, -1 when held by someone else.
const RELEASE_IF_HELD: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
    return 0
end
if current == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return -1
"#;

fn redis_err(e: RedisError) -> DomainError {
    InfraError::Redis(e).into()
}

/// MATCH pattern for every seat key of one show. Glob metacharacters in the
/// prefix are escaped so they match literally.
fn scan_pattern(key_prefix: &str, show_id: i32) -> String {
    let mut pattern = String::with_capacity(key_prefix.len() + 16);
    for c in SeatKey::show_prefix(key_prefix, show_id).chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

#[derive(Clone)]
pub struct RedisSeatLockStore {
    conn_manager: ConnectionManager,
    key_prefix: String,
    ttl: Duration,
}

impl RedisSeatLockStore {
    /// Connect to Redis. Fails with `LockStoreUnavailable` if the server
    /// cannot be reached.
    pub async fn connect(redis_url: &str, key_prefix: &str, ttl: Duration) -> DomainResult<Self> {
        let client = Client::open(redis_url).map_err(redis_err)?;
        let conn_manager = ConnectionManager::new(client).await.map_err(redis_err)?;

        info!(key_prefix, ttl_ms = ttl.as_millis() as u64, "Redis seat lock store connected");

        Ok(Self {
            conn_manager,
            key_prefix: key_prefix.to_string(),
            ttl,
        })
    }

    fn key(&self, show_id: i32, seat_id: &str) -> String {
        SeatKey::new(show_id, seat_id).storage_key(&self.key_prefix)
    }

    fn ttl_millis(&self) -> u64 {
        (self.ttl.as_millis() as u64).max(1)
    }
}

#[async_trait]
impl SeatLockStore for RedisSeatLockStore {
    async fn acquire(&self, show_id: i32, seat_id: &str, holder_id: i32) -> DomainResult<bool> {
        let mut conn = self.conn_manager.clone();
        let key = self.key(show_id, seat_id);

        // SET NX replies OK when written and nil when the key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(holder_id)
            .arg("NX")
            .arg("PX")
            .arg(self.ttl_millis())
            .query_async(&mut conn)
            .await
            .map_err(redis_err)?;

        let acquired = reply.is_some();
        debug!(key = %key, holder_id, acquired, "Seat lock acquire");
        Ok(acquired)
    }

    async fn release(&self, show_id: i32, seat_id: &str, holder_id: i32) -> DomainResult<()> {
        let mut conn = self.conn_manager.clone();
        let key = self.key(show_id, seat_id);

        let _: i64 = conn.del(&key).await.map_err(redis_err)?;
        debug!(key = %key, holder_id, "Seat lock released");
        Ok(())
    }

    async fn release_held(
        &self,
        show_id: i32,
        seat_id: &str,
        holder_id: i32,
    ) -> DomainResult<()> {
        let mut conn = self.conn_manager.clone();
        let key = self.key(show_id, seat_id);

        let outcome: i64 = Script::new(RELEASE_IF_HELD)
            .key(&key)
            .arg(holder_id.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(redis_err)?;

        if outcome < 0 {
            warn!(key = %key, holder_id, "Refusing to release seat lock held by another requester");
            return Err(DomainError::NotOwner {
                show_id,
                seat_id: seat_id.to_string(),
                holder_id,
            });
        }
        debug!(key = %key, holder_id, deleted = outcome == 1, "Seat lock released");
        Ok(())
    }

    async fn held_seats(&self, show_id: i32) -> DomainResult<BTreeSet<String>> {
        let mut conn = self.conn_manager.clone();
        let pattern = scan_pattern(&self.key_prefix, show_id);

        // Cursor-based; never a single full-keyspace command.
        let mut iter = conn
            .scan_match::<_, String>(&pattern)
            .await
            .map_err(redis_err)?;
        let mut seats = BTreeSet::new();
        while let Some(raw) = iter.next_item().await {
            if let Some(key) = SeatKey::parse(&self.key_prefix, &raw) {
                if key.show_id == show_id {
                    seats.insert(key.seat_id);
                }
            }
        }
        Ok(seats)
    }

    async fn holder_of(&self, show_id: i32, seat_id: &str) -> DomainResult<Option<i32>> {
        let mut conn = self.conn_manager.clone();
        let value: Option<String> = conn
            .get(self.key(show_id, seat_id))
            .await
            .map_err(redis_err)?;

        Ok(value.and_then(|v| v.parse().ok()))
    }

    async fn ping(&self) -> DomainResult<()> {
        let mut conn = self.conn_manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_pattern_covers_one_show() {
        assert_eq!(scan_pattern("seat_lock", 12), "seat_lock:12:*");
    }

    #[test]
    fn scan_pattern_escapes_glob_characters_in_prefix() {
        assert_eq!(scan_pattern("locks[eu]*", 3), r"locks\[eu\]\*:3:*");
    }
}
