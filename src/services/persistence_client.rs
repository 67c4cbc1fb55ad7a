//! Durable storage for services.
//!
//! `PersistenceClientTrait` is the seam between the in-memory registry and
//! the store. `PersistenceClient` implements it on SQLite via `rusqlite`;
//! every call that renumbers positions runs inside one transaction so the
//! stored order is never observed half-shifted.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};

use crate::database::connection::Database;
use crate::types::errors::PersistenceError;
use crate::types::icon::Icon;
use crate::types::service::Service;

/// Storage operations the registry relies on.
pub trait PersistenceClientTrait {
    /// Stores a new service at `service.position`, shifting later rows down.
    fn save(&mut self, service: &Service) -> Result<(), PersistenceError>;
    /// Overwrites the mutable fields of a stored service. Position is untouched.
    fn update(&mut self, service: &Service) -> Result<(), PersistenceError>;
    /// Removes a service and closes the gap it leaves.
    fn delete(&mut self, service: &Service) -> Result<(), PersistenceError>;
    /// Exchanges the stored positions of two services.
    fn swap(&mut self, a: &Service, b: &Service) -> Result<(), PersistenceError>;
    /// All stored services ordered by position.
    fn fetch_all(&self) -> Result<Vec<Service>, PersistenceError>;
    /// Stores `ordered[i].position = i` for every service in one step.
    fn rewrite_order(&mut self, ordered: &[Service]) -> Result<(), PersistenceError>;

    /// Moves `order[from]` to index `to`, expressed as adjacent swaps.
    ///
    /// `order` is the display order before the move. If a swap fails, the
    /// stored order is put back to `order` with `rewrite_order` before the
    /// error is returned. Clients with transactions should override this.
    fn relocate(&mut self, order: &[Service], from: usize, to: usize) -> Result<(), PersistenceError> {
        let (Some(moving), true) = (order.get(from), to < order.len()) else {
            return Err(PersistenceError::DatabaseError(format!(
                "move {} -> {} outside {} services",
                from,
                to,
                order.len()
            )));
        };
        let neighbors: Vec<&Service> = if from < to {
            order[from + 1..=to].iter().collect()
        } else {
            order[to..from].iter().rev().collect()
        };

        for neighbor in neighbors {
            if let Err(err) = self.swap(moving, neighbor) {
                if let Err(restore) = self.rewrite_order(order) {
                    log::error!("could not restore order after failed move: {}", restore);
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// SQLite-backed persistence client.
pub struct PersistenceClient {
    db: Arc<Database>,
}

const SELECT_COLUMNS: &str = "SELECT id, name, url, icon, icon_type, icon_width, icon_height, \
     icon_placeholder, last_seen_online, position, created_at, updated_at FROM services";

impl PersistenceClient {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn row_to_service(row: &rusqlite::Row) -> rusqlite::Result<Service> {
        let position: i64 = row.get(9)?;
        Ok(Service {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            icon: Icon {
                bytes: row.get(3)?,
                content_type: row.get(4)?,
                width: row.get(5)?,
                height: row.get(6)?,
                is_placeholder: row.get(7)?,
            },
            last_seen_online: row.get(8)?,
            position: position.max(0) as usize,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn stored_position(
        conn: &rusqlite::Connection,
        id: &str,
    ) -> Result<i64, PersistenceError> {
        conn.query_row(
            "SELECT position FROM services WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }
}

impl PersistenceClientTrait for PersistenceClient {
    fn save(&mut self, service: &Service) -> Result<(), PersistenceError> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;
        let position = service.position as i64;

        tx.execute(
            "UPDATE services SET position = position + 1 WHERE position >= ?1",
            params![position],
        )?;
        tx.execute(
            "INSERT INTO services (id, name, url, icon, icon_type, icon_width, icon_height, \
             icon_placeholder, last_seen_online, position, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                service.id,
                service.name,
                service.url,
                service.icon.bytes,
                service.icon.content_type,
                service.icon.width,
                service.icon.height,
                service.icon.is_placeholder,
                service.last_seen_online,
                position,
                service.created_at,
                service.updated_at,
            ],
        )?;
        tx.commit()?;

        log::debug!("saved service {} at position {}", service.id, position);
        Ok(())
    }

    fn update(&mut self, service: &Service) -> Result<(), PersistenceError> {
        let affected = self.db.connection().execute(
            "UPDATE services SET name = ?1, url = ?2, icon = ?3, icon_type = ?4, icon_width = ?5, \
             icon_height = ?6, icon_placeholder = ?7, last_seen_online = ?8, updated_at = ?9 \
             WHERE id = ?10",
            params![
                service.name,
                service.url,
                service.icon.bytes,
                service.icon.content_type,
                service.icon.width,
                service.icon.height,
                service.icon.is_placeholder,
                service.last_seen_online,
                service.updated_at,
                service.id,
            ],
        )?;

        if affected == 0 {
            return Err(PersistenceError::NotFound(service.id.clone()));
        }
        Ok(())
    }

    fn delete(&mut self, service: &Service) -> Result<(), PersistenceError> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;
        let position = Self::stored_position(&tx, &service.id)?;

        tx.execute("DELETE FROM services WHERE id = ?1", params![service.id])?;
        tx.execute(
            "UPDATE services SET position = position - 1 WHERE position > ?1",
            params![position],
        )?;
        tx.commit()?;

        log::debug!("deleted service {} from position {}", service.id, position);
        Ok(())
    }

    fn swap(&mut self, a: &Service, b: &Service) -> Result<(), PersistenceError> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;
        let pos_a = Self::stored_position(&tx, &a.id)?;
        let pos_b = Self::stored_position(&tx, &b.id)?;

        tx.execute(
            "UPDATE services SET position = ?1 WHERE id = ?2",
            params![pos_b, a.id],
        )?;
        tx.execute(
            "UPDATE services SET position = ?1 WHERE id = ?2",
            params![pos_a, b.id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Service>, PersistenceError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(&format!("{} ORDER BY position, created_at", SELECT_COLUMNS))?;

        let rows = stmt.query_map([], Self::row_to_service)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn rewrite_order(&mut self, ordered: &[Service]) -> Result<(), PersistenceError> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;
        for (index, service) in ordered.iter().enumerate() {
            let affected = tx.execute(
                "UPDATE services SET position = ?1 WHERE id = ?2",
                params![index as i64, service.id],
            )?;
            if affected == 0 {
                return Err(PersistenceError::NotFound(service.id.clone()));
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Shifts the range between `from` and `to` and places the moved row in one transaction.
    fn relocate(&mut self, order: &[Service], from: usize, to: usize) -> Result<(), PersistenceError> {
        let moving = order.get(from).ok_or_else(|| {
            PersistenceError::DatabaseError(format!("move from {} outside {} services", from, order.len()))
        })?;
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;
        let stored_from = Self::stored_position(&tx, &moving.id)?;
        let to = to as i64;

        if stored_from < to {
            tx.execute(
                "UPDATE services SET position = position - 1 WHERE position > ?1 AND position <= ?2",
                params![stored_from, to],
            )?;
        } else {
            tx.execute(
                "UPDATE services SET position = position + 1 WHERE position >= ?1 AND position < ?2",
                params![to, stored_from],
            )?;
        }
        tx.execute(
            "UPDATE services SET position = ?1 WHERE id = ?2",
            params![to, moving.id],
        )?;
        tx.commit()?;

        log::debug!("relocated service {} from {} to {}", moving.id, stored_from, to);
        Ok(())
    }
}
