//! Entity stores mirrored from the server.
//!
//! An [`EntityStore`] is an ordered collection keyed by id (the hand, the chat
//! transcript); a [`Singleton`] holds exactly one record (the game, the
//! account). Every mutation notifies the registered listeners synchronously and
//! also hands the [`Change`] back to the caller, so the session can react to it
//! after the listeners ran.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{ProtocolError, SyncError, UnknownEntityError},
    utils::VecExtensions,
};

pub trait Record: Clone + PartialEq {
    fn id(&self) -> &str;

    /// Gives records the server sent without an id a store-local one.
    fn assign_id(&mut self, _seq: u64) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Add(T),
    Remove(T),
    Reset(Vec<T>),
    Patch { previous: T, current: T },
}

pub type Listener<T> = Box<dyn FnMut(&Change<T>)>;

pub struct EntityStore<T> {
    name: &'static str,
    records: Vec<T>,
    next_seq: u64,
    listeners: Vec<Listener<T>>,
}

impl<T: Record> EntityStore<T> {
    pub fn new(name: &'static str) -> Self {
        EntityStore {
            name,
            records: vec![],
            next_seq: 0,
            listeners: vec![],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id().to_string()).collect()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Change<T>) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Inserts records at the end. A record whose id is already present
    /// replaces the stored one in place instead of duplicating it; see
    /// [`EntityStore::add_wire`] for partial records.
    pub fn add<I>(&mut self, records: I) -> Vec<Change<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut changes = vec![];
        for mut record in records {
            record.assign_id(self.next_seq);
            self.next_seq += 1;
            let change = match self.records.iter().position(|r| r.id() == record.id()) {
                Some(pos) if self.records[pos] == record => None,
                Some(pos) => {
                    let previous = std::mem::replace(&mut self.records[pos], record.clone());
                    Some(Change::Patch {
                        previous,
                        current: record,
                    })
                }
                None => {
                    self.records.push(record.clone());
                    Some(Change::Add(record))
                }
            };
            if let Some(change) = change {
                self.notify(&change);
                changes.push(change);
            }
        }
        changes
    }

    /// Replaces the whole collection and emits a single [`Change::Reset`].
    pub fn reset<I>(&mut self, records: I) -> Change<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut fresh: Vec<T> = vec![];
        for mut record in records {
            record.assign_id(self.next_seq);
            self.next_seq += 1;
            match fresh.iter().position(|r| r.id() == record.id()) {
                Some(pos) => fresh[pos] = record,
                None => fresh.push(record),
            }
        }
        self.records = fresh;
        let change = Change::Reset(self.records.clone());
        self.notify(&change);
        change
    }

    /// Removes records by id; absent ids are skipped.
    pub fn remove<S: AsRef<str>>(&mut self, ids: &[S]) -> Vec<Change<T>> {
        let mut changes = vec![];
        for id in ids {
            if let Some(record) = self.records.remove_first_where(|r| r.id() == id.as_ref()) {
                let change = Change::Remove(record);
                self.notify(&change);
                changes.push(change);
            }
        }
        changes
    }

    /// Drops the oldest records until at most `max` remain.
    pub fn trim_front(&mut self, max: usize) -> Vec<Change<T>> {
        let over = self.records.len().saturating_sub(max);
        let ids: Vec<String> = self.records[..over]
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        self.remove(ids.as_slice())
    }

    /// Applies `f` to the record with the given id. Returns `None` when the
    /// record came out unchanged.
    pub fn modify<F>(&mut self, id: &str, f: F) -> Result<Option<Change<T>>, UnknownEntityError>
    where
        F: FnOnce(&mut T),
    {
        let pos = self.position(id)?;
        let previous = self.records[pos].clone();
        f(&mut self.records[pos]);
        if self.records[pos] == previous {
            return Ok(None);
        }
        let change = Change::Patch {
            previous,
            current: self.records[pos].clone(),
        };
        self.notify(&change);
        Ok(Some(change))
    }

    fn position(&self, id: &str) -> Result<usize, UnknownEntityError> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| UnknownEntityError {
                store: self.name,
                id: id.to_string(),
            })
    }

    fn notify(&mut self, change: &Change<T>) {
        for listener in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

impl<T: Record + Serialize + DeserializeOwned> EntityStore<T> {
    /// Merges wire attributes into an existing record. The id itself cannot
    /// be patched.
    pub fn patch(&mut self, id: &str, fields: &Map<String, Value>) -> Result<Option<Change<T>>, SyncError> {
        let pos = self.position(id)?;
        let merged: T = merge_fields(&self.records[pos], fields)
            .map_err(|e| ProtocolError::malformed("set", e))?;
        if merged.id() != id {
            return Err(ProtocolError::malformed("set", "record id cannot be patched").into());
        }
        Ok(self.modify(id, |record| *record = merged)?)
    }

    /// Adds records as sent by the server. A record whose id is already
    /// stored has the sent attributes merged into it, so attributes the
    /// server left out (local selection state) survive. Nothing is stored
    /// unless every record decodes.
    pub fn add_wire(&mut self, tag: &str, records: Vec<Value>) -> Result<Vec<Change<T>>, SyncError> {
        let decoded = records
            .into_iter()
            .map(|value| {
                let record: T = serde_json::from_value(value.clone()).map_err(|e| ProtocolError::malformed(tag, e))?;
                Ok((record, value))
            })
            .collect::<Result<Vec<(T, Value)>, ProtocolError>>()?;

        let mut changes = vec![];
        for (record, value) in decoded {
            match value {
                Value::Object(fields) if self.contains(record.id()) => {
                    changes.extend(self.patch(record.id(), &fields)?);
                }
                _ => changes.extend(self.add(Some(record))),
            }
        }
        Ok(changes)
    }
}

impl<T: fmt::Debug> fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("name", &self.name)
            .field("records", &self.records)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

pub struct Singleton<T> {
    name: &'static str,
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T: Clone + PartialEq> Singleton<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Singleton {
            name,
            value,
            listeners: vec![],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Change<T>) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn replace(&mut self, value: T) -> Option<Change<T>> {
        if value == self.value {
            return None;
        }
        let previous = std::mem::replace(&mut self.value, value);
        let change = Change::Patch {
            previous,
            current: self.value.clone(),
        };
        for listener in self.listeners.iter_mut() {
            listener(&change);
        }
        Some(change)
    }

    pub fn modify<F>(&mut self, f: F) -> Option<Change<T>>
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.value.clone();
        f(&mut value);
        self.replace(value)
    }
}

impl<T: Clone + PartialEq + Serialize + DeserializeOwned> Singleton<T> {
    /// The record as it would look after merging `fields`, without storing it.
    pub fn merged(&self, fields: &Map<String, Value>) -> serde_json::Result<T> {
        merge_fields(&self.value, fields)
    }

    pub fn patch(&mut self, fields: &Map<String, Value>) -> Result<Option<Change<T>>, ProtocolError> {
        let value = self
            .merged(fields)
            .map_err(|e| ProtocolError::malformed("set", e))?;
        Ok(self.replace(value))
    }
}

impl<T: fmt::Debug> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

fn merge_fields<T>(record: &T, fields: &Map<String, Value>) -> serde_json::Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        for (key, field) in fields {
            map.insert(key.clone(), field.clone());
        }
    }
    serde_json::from_value(value)
}


#[cfg(test)]
mod proptests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag(String);

    impl Record for Tag {
        fn id(&self) -> &str {
            &self.0
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(Vec<u8>),
        Remove(Vec<u8>),
    }

    fn op() -> impl Strategy<Value = Op> {
        let ids = prop::collection::vec(0u8..8, 0..4);
        prop_oneof![ids.clone().prop_map(Op::Add), ids.prop_map(Op::Remove)]
    }

    proptest! {
        #[test]
        fn store_ids_follow_set_union_and_difference(ops in prop::collection::vec(op(), 0..40)) {
            let mut store = EntityStore::new("tags");
            let mut model: HashSet<String> = HashSet::new();

            for op in ops {
                match op {
                    Op::Add(ids) => {
                        let ids: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
                        store.add(ids.iter().cloned().map(Tag));
                        model.extend(ids);
                    }
                    Op::Remove(ids) => {
                        let ids: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
                        store.remove(ids.as_slice());
                        for id in &ids {
                            model.remove(id);
                        }
                    }
                }
            }

            let ids = store.ids();
            let unique: HashSet<String> = ids.iter().cloned().collect();
            prop_assert_eq!(unique.len(), ids.len());
            prop_assert_eq!(unique, model);
        }
    }
}
