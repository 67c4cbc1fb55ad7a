//! Presentation-side mirror of the registry order.
//!
//! Each front-end keeps one `ServiceListModel`, subscribes it to the
//! registry, and renders from its id list. Rows named in `Updated` events are
//! queued as dirty so the view can reload just those rows.

use std::collections::HashSet;

use crate::managers::service_registry::ServiceObserver;
use crate::types::event::ServiceEvent;
use crate::types::service::Service;

/// What tapping a row means in the current mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Launch the service.
    Open(String),
    /// Present the edit form for the service.
    Edit(String),
}

#[derive(Debug, Default)]
pub struct ServiceListModel {
    ids: Vec<String>,
    dirty: HashSet<String>,
    editing: bool,
    editing_id: Option<String>,
}

impl ServiceListModel {
    /// Creates a mirror of the given registry snapshot.
    pub fn new(snapshot: &[Service]) -> Self {
        Self {
            ids: snapshot.iter().map(|s| s.id.clone()).collect(),
            ..Self::default()
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Applies one registry change.
    pub fn apply(&mut self, event: &ServiceEvent) {
        match event {
            ServiceEvent::Added { id, position } => {
                let at = (*position).min(self.ids.len());
                self.ids.insert(at, id.clone());
            }
            ServiceEvent::Updated { id, .. } => {
                self.dirty.insert(id.clone());
            }
            ServiceEvent::Moved { id, from, to } => {
                if *from < self.ids.len() && self.ids[*from] == *id {
                    let moved = self.ids.remove(*from);
                    let at = (*to).min(self.ids.len());
                    self.ids.insert(at, moved);
                } else {
                    log::warn!("list model out of sync on move of {}", id);
                }
            }
            ServiceEvent::Deleted { id, position } => {
                if *position < self.ids.len() && self.ids[*position] == *id {
                    self.ids.remove(*position);
                } else {
                    self.ids.retain(|existing| existing != id);
                }
                self.dirty.remove(id);
                if self.editing_id.as_deref() == Some(id.as_str()) {
                    self.editing_id = None;
                }
            }
        }
    }

    /// Rows to reload, drained.
    pub fn take_dirty(&mut self) -> Vec<String> {
        let mut dirty: Vec<String> = self.dirty.drain().collect();
        dirty.sort_by_key(|id| self.ids.iter().position(|x| x == id));
        dirty
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Flips edit mode and returns the new state. Leaving edit mode drops the pending edit.
    pub fn toggle_editing(&mut self) -> bool {
        self.editing = !self.editing;
        if !self.editing {
            self.editing_id = None;
        }
        self.editing
    }

    /// Title for the edit toggle button.
    pub fn edit_button_label(&self) -> &'static str {
        if self.editing {
            "Done"
        } else {
            "Edit"
        }
    }

    /// Resolves a tap on row `index`.
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        let id = self.ids.get(index)?.clone();
        if self.editing {
            self.editing_id = Some(id.clone());
            Some(Selection::Edit(id))
        } else {
            Some(Selection::Open(id))
        }
    }

    /// The service whose edit form is open, if any.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    /// Called once the edit form is committed or dismissed.
    pub fn finish_editing(&mut self) -> Option<String> {
        self.editing = false;
        self.editing_id.take()
    }
}

impl ServiceObserver for ServiceListModel {
    fn on_service_event(&mut self, event: &ServiceEvent) {
        self.apply(event);
    }
}
