//! Handler registry.
//!
//! Holds one handler per key and establishes the registry order used for
//! every phased dispatch: priority ascending, ties broken by registration
//! sequence.

use crate::error::RegistryError;
use crate::handler::{DataHandler, ModifiableModel};
use dataimport_types::Key;
use std::collections::HashMap;
use tracing::debug;

/// A registered handler with the ordering metadata attached at registration.
pub struct HandlerEntry<M: ModifiableModel> {
    handler: Box<dyn DataHandler<M>>,
    key: Key,
    priority: i32,
    sequence: usize,
}

impl<M: ModifiableModel> HandlerEntry<M> {
    pub fn handler(&self) -> &dyn DataHandler<M> {
        self.handler.as_ref()
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Position in registration order, starting at zero.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn name(&self) -> &str {
        self.handler.name()
    }
}

/// Per-key handler lookup with a deterministic total order.
pub struct HandlerRegistry<M: ModifiableModel> {
    entries: Vec<HandlerEntry<M>>,
    by_key: HashMap<Key, usize>,
}

impl<M: ModifiableModel> Default for HandlerRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ModifiableModel> HandlerRegistry<M> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// Registers a handler at its declared priority.
    pub fn register<H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        H: DataHandler<M> + 'static,
    {
        self.register_boxed(Box::new(handler), None)
    }

    /// Registers a handler, overriding its declared priority.
    pub fn register_with_priority<H>(&mut self, handler: H, priority: i32) -> Result<(), RegistryError>
    where
        H: DataHandler<M> + 'static,
    {
        self.register_boxed(Box::new(handler), Some(priority))
    }

    /// Registers an already boxed handler. `priority` overrides the
    /// handler's own when given.
    pub fn register_boxed(
        &mut self,
        handler: Box<dyn DataHandler<M>>,
        priority: Option<i32>,
    ) -> Result<(), RegistryError> {
        let key = handler.target_key();
        if let Some(&index) = self.by_key.get(&key) {
            return Err(RegistryError::DuplicateKey {
                key,
                existing: self.entries[index].name().to_string(),
            });
        }

        let priority = priority.unwrap_or_else(|| handler.priority());
        let sequence = self.entries.len();
        debug!(key = %key, handler = handler.name(), priority, sequence, "Registered data handler");

        self.by_key.insert(key.clone(), sequence);
        self.entries.push(HandlerEntry {
            handler,
            key,
            priority,
            sequence,
        });
        Ok(())
    }

    /// Looks up the handler owning `key`.
    pub fn resolve(&self, key: &Key) -> Option<&HandlerEntry<M>> {
        self.by_key.get(key).map(|&index| &self.entries[index])
    }

    /// All handlers in registry order.
    pub fn ordered_handlers(&self) -> Vec<&HandlerEntry<M>> {
        let mut ordered: Vec<_> = self.entries.iter().collect();
        ordered.sort_by_key(|entry| (entry.priority, entry.sequence));
        ordered
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
