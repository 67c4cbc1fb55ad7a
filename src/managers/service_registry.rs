//! Service Registry for the dashboard.
//!
//! Keeps the ordered list of bookmarked services in memory as the single
//! source of truth, writes every accepted mutation through a
//! `PersistenceClientTrait` before applying it, and tells subscribed
//! observers exactly what changed.
//!
//! Positions always form the dense range `0..len`. A mutation that fails
//! validation or persistence leaves both the list and the observers untouched.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::services::persistence_client::PersistenceClientTrait;
use crate::types::errors::RegistryError;
use crate::types::event::ServiceEvent;
use crate::types::icon::Icon;
use crate::types::service::{NewService, Service, ServiceUpdate};

/// Receives registry changes in the order they were applied.
pub trait ServiceObserver {
    fn on_service_event(&mut self, event: &ServiceEvent);
}

impl<T: ServiceObserver> ServiceObserver for Rc<RefCell<T>> {
    fn on_service_event(&mut self, event: &ServiceEvent) {
        self.borrow_mut().on_service_event(event);
    }
}

/// Collects events, e.g. to report them back to a front-end after a call.
impl ServiceObserver for Vec<ServiceEvent> {
    fn on_service_event(&mut self, event: &ServiceEvent) {
        self.push(event.clone());
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Converts a drag-and-drop insertion offset into the index the item ends up at.
///
/// The offset counts slots before removal of the dragged item, so any offset
/// past the source shrinks by one once the source is taken out.
pub fn normalize_offset(source: usize, offset: usize) -> usize {
    if source < offset {
        offset - 1
    } else {
        offset
    }
}

/// Trait defining service registry operations.
pub trait ServiceRegistryTrait {
    fn add(&mut self, service: NewService) -> Result<String, RegistryError>;
    fn update(&mut self, id: &str, fields: ServiceUpdate) -> Result<(), RegistryError>;
    fn move_service(&mut self, id: &str, to_position: usize) -> Result<(), RegistryError>;
    fn move_to_offset(&mut self, source: usize, offset: usize) -> Result<(), RegistryError>;
    fn delete(&mut self, id: &str) -> Result<(), RegistryError>;
    fn mark_seen_online(&mut self, id: &str, timestamp: i64) -> Result<(), RegistryError>;
    fn snapshot(&self) -> Vec<Service>;
    fn get(&self, id: &str) -> Option<&Service>;
    fn index_of(&self, id: &str) -> Option<usize>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
}

/// In-memory ordered registry of services, written through to `P`.
pub struct ServiceRegistry<P: PersistenceClientTrait> {
    persistence: P,
    services: Vec<Service>,
    observers: Vec<(SubscriptionId, Box<dyn ServiceObserver>)>,
    next_subscription: u64,
}

impl<P: PersistenceClientTrait> ServiceRegistry<P> {
    /// Builds a registry from whatever the persistence client already holds.
    ///
    /// Stored positions that are gapped or duplicated are renumbered densely
    /// and written back.
    pub fn open(mut persistence: P) -> Result<Self, RegistryError> {
        let mut services = persistence.fetch_all()?;

        let mut repaired = 0;
        for (index, service) in services.iter_mut().enumerate() {
            if service.position != index {
                service.position = index;
                repaired += 1;
            }
        }
        if repaired > 0 {
            log::warn!("stored service order had {} misplaced entries, renumbering", repaired);
            persistence.rewrite_order(&services)?;
        }

        log::info!("loaded {} services", services.len());
        Ok(Self {
            persistence,
            services,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Registers an observer for all future changes.
    pub fn subscribe(&mut self, observer: Box<dyn ServiceObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// The current order, borrowed.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn emit(&mut self, event: ServiceEvent) {
        log::debug!("service event: {:?}", event);
        for (_, observer) in self.observers.iter_mut() {
            observer.on_service_event(&event);
        }
    }

    fn renumber(&mut self) {
        for (index, service) in self.services.iter_mut().enumerate() {
            service.position = index;
        }
    }

    fn find(&self, id: &str) -> Result<usize, RegistryError> {
        self.index_of(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    fn validate(name: &str, url: &str) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::Validation("name is required".to_string()));
        }
        if url.trim().is_empty() {
            return Err(RegistryError::Validation("url is required".to_string()));
        }
        Ok(())
    }
}

impl<P: PersistenceClientTrait> ServiceRegistryTrait for ServiceRegistry<P> {
    /// Adds a service at the front of the list. Returns its identifier.
    fn add(&mut self, service: NewService) -> Result<String, RegistryError> {
        Self::validate(&service.name, &service.url)?;

        let now = Self::now();
        let created = Service {
            id: Uuid::new_v4().to_string(),
            name: service.name.trim().to_string(),
            url: service.url.trim().to_string(),
            icon: service.icon.unwrap_or_else(Icon::placeholder),
            last_seen_online: None,
            position: 0,
            created_at: now,
            updated_at: now,
        };

        self.persistence.save(&created)?;

        let id = created.id.clone();
        self.services.insert(0, created);
        self.renumber();
        log::info!("added service {}", id);
        self.emit(ServiceEvent::Added {
            id: id.clone(),
            position: 0,
        });
        Ok(id)
    }

    /// Replaces name, url and (when given) icon. Identity and position are kept.
    fn update(&mut self, id: &str, fields: ServiceUpdate) -> Result<(), RegistryError> {
        let index = self.find(id)?;
        Self::validate(&fields.name, &fields.url)?;

        let mut updated = self.services[index].clone();
        updated.name = fields.name.trim().to_string();
        updated.url = fields.url.trim().to_string();
        if let Some(icon) = fields.icon {
            updated.icon = icon;
        }
        updated.updated_at = Self::now();

        self.persistence.update(&updated)?;

        self.services[index] = updated;
        self.emit(ServiceEvent::Updated {
            id: id.to_string(),
            position: index,
        });
        Ok(())
    }

    /// Moves a service to `to_position`; services in between shift by one.
    fn move_service(&mut self, id: &str, to_position: usize) -> Result<(), RegistryError> {
        let from = self.find(id)?;
        if to_position >= self.services.len() {
            return Err(RegistryError::OutOfRange {
                position: to_position,
                len: self.services.len(),
            });
        }
        if from == to_position {
            return Ok(());
        }

        self.persistence.relocate(&self.services, from, to_position)?;

        let service = self.services.remove(from);
        self.services.insert(to_position, service);
        self.renumber();
        self.emit(ServiceEvent::Moved {
            id: id.to_string(),
            from,
            to: to_position,
        });
        Ok(())
    }

    /// Moves the service at index `source` to a drag-and-drop insertion offset.
    ///
    /// `offset` may equal `len()` (drop after the last row).
    fn move_to_offset(&mut self, source: usize, offset: usize) -> Result<(), RegistryError> {
        let len = self.services.len();
        if source >= len {
            return Err(RegistryError::OutOfRange {
                position: source,
                len,
            });
        }
        if offset > len {
            return Err(RegistryError::OutOfRange {
                position: offset,
                len,
            });
        }

        let id = self.services[source].id.clone();
        self.move_service(&id, normalize_offset(source, offset))
    }

    /// Removes a service; everything after it moves up one slot.
    fn delete(&mut self, id: &str) -> Result<(), RegistryError> {
        let index = self.find(id)?;

        self.persistence.delete(&self.services[index])?;

        self.services.remove(index);
        self.renumber();
        log::info!("deleted service {}", id);
        self.emit(ServiceEvent::Deleted {
            id: id.to_string(),
            position: index,
        });
        Ok(())
    }

    /// Records that the service answered at `timestamp`.
    fn mark_seen_online(&mut self, id: &str, timestamp: i64) -> Result<(), RegistryError> {
        let index = self.find(id)?;

        let mut updated = self.services[index].clone();
        updated.last_seen_online = Some(timestamp);
        updated.updated_at = Self::now();

        self.persistence.update(&updated)?;

        self.services[index] = updated;
        self.emit(ServiceEvent::Updated {
            id: id.to_string(),
            position: index,
        });
        Ok(())
    }

    fn snapshot(&self) -> Vec<Service> {
        self.services.clone()
    }

    fn get(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.services.iter().position(|s| s.id == id)
    }

    fn len(&self) -> usize {
        self.services.len()
    }

    fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
