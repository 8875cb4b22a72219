//! An insertion-ordered collection of keyed items with a traversal cursor.
//!
//! [`KeyedList`] is the backing store for the event bus (listener queues)
//! and the error log. It supports two access patterns: a positional cursor
//! walk ([`KeyedList::each`]) and key-indexed random access
//! ([`KeyedList::key_get`] and friends). Keys stay attached to their items
//! even as positions shift, which makes them the stable way to refer to an
//! item that may have been moved or reordered.

use crate::error::CollectionError;

/// An insertion-ordered mapping from a stable key to a value.
///
/// The cursor is clamped to `[-1, len]`: one before the first position and
/// one past the last act as sentinels, so a full forward walk ends with the
/// cursor parked at `len` and a full backward walk at `-1`.
///
/// Items added without a key get a generated `__N` key that is unique
/// within the list.
pub struct KeyedList<T> {
    keys: Vec<String>,
    items: Vec<T>,
    cursor: isize,
    serial: u64,
    validator: Option<fn(&T) -> bool>,
}

impl<T> Default for KeyedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KeyedList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            items: Vec::new(),
            cursor: 0,
            serial: 0,
            validator: None,
        }
    }

    /// Creates an empty list with a validation hook.
    ///
    /// Items rejected by the hook fail to append or insert with
    /// [`CollectionError::InvalidItem`].
    pub fn with_validator(validator: fn(&T) -> bool) -> Self {
        Self {
            validator: Some(validator),
            ..Self::new()
        }
    }

    fn allowed(&self, item: &T) -> bool {
        self.validator.is_none_or(|validator| validator(item))
    }

    fn gen_key(&mut self) -> String {
        loop {
            let key = format!("__{}", self.serial);
            self.serial += 1;
            if !self.keys.iter().any(|existing| *existing == key) {
                return key;
            }
        }
    }

    /// The number of items in the list.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if the cursor is on an actual position.
    pub fn valid(&self) -> bool {
        self.cursor >= 0 && (self.cursor as usize) < self.items.len()
    }

    //-----------------------------------------------------------------
    //   cursor moving methods
    //-----------------------------------------------------------------

    /// Rewinds the cursor to the start of the list.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the last position.
    pub fn end(&mut self) {
        self.cursor = self.items.len() as isize - 1;
    }

    /// Steps the cursor back and returns the item it lands on.
    ///
    /// Stepping back from the first position parks the cursor at the
    /// before-start sentinel and returns `None`.
    pub fn prev(&mut self) -> Option<&T> {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.current()
        } else {
            self.cursor = -1;
            None
        }
    }

    /// Advances the cursor and returns the item it lands on.
    ///
    /// Advancing past the last position parks the cursor at the past-end
    /// sentinel and returns `None`.
    pub fn next(&mut self) -> Option<&T> {
        let len = self.items.len() as isize;
        if self.cursor < len {
            self.cursor += 1;
            self.current()
        } else {
            self.cursor = len;
            None
        }
    }

    /// Moves the cursor to the position of the key passed.
    ///
    /// Returns true if the key exists.
    pub fn seek(&mut self, key: &str) -> bool {
        match self.key_offset(key) {
            Some(position) => {
                self.cursor = position as isize;
                true
            }
            None => false,
        }
    }

    /// Returns the entry at the cursor and advances the cursor.
    ///
    /// This is the safe forward-walk primitive: entries already visited may
    /// be removed without skipping the rest of the walk. It should not be
    /// mixed with [`KeyedList::remove`] or [`KeyedList::modify`], which act
    /// on the (already advanced) cursor.
    pub fn each(&mut self) -> Option<(String, &T)> {
        let position = self.cursor;
        if position >= 0 && (position as usize) < self.items.len() {
            self.cursor += 1;
            let index = position as usize;
            Some((self.keys[index].clone(), &self.items[index]))
        } else {
            None
        }
    }

    //-----------------------------------------------------------------
    //   modification methods
    //-----------------------------------------------------------------

    /// Appends an item with a generated key and returns the key.
    pub fn append(&mut self, item: T) -> Result<String, CollectionError> {
        let key = self.gen_key();
        self.append_keyed(key.clone(), item)?;
        Ok(key)
    }

    /// Appends an item under the key passed and returns the key.
    pub fn append_keyed(
        &mut self,
        key: impl Into<String>,
        item: T,
    ) -> Result<String, CollectionError> {
        if !self.allowed(&item) {
            return Err(CollectionError::InvalidItem);
        }
        let key = key.into();
        self.keys.push(key.clone());
        self.items.push(item);
        Ok(key)
    }

    /// Splices an item in at a specific position, shifting the items after
    /// it. The position must be an existing index or `len` (equivalent to
    /// an append). A missing key is generated.
    pub fn insert(
        &mut self,
        position: usize,
        key: Option<String>,
        item: T,
    ) -> Result<String, CollectionError> {
        if position > self.items.len() {
            return Err(CollectionError::OutOfBounds {
                position,
                len: self.items.len(),
            });
        }
        if !self.allowed(&item) {
            return Err(CollectionError::InvalidItem);
        }
        let key = key.unwrap_or_else(|| self.gen_key());
        self.keys.insert(position, key.clone());
        self.items.insert(position, item);
        Ok(key)
    }

    /// Inserts an item before the keyed entry. Returns `None` if the key
    /// does not exist.
    pub fn before(
        &mut self,
        key: &str,
        new_key: Option<String>,
        item: T,
    ) -> Option<Result<String, CollectionError>> {
        self.key_offset(key)
            .map(|position| self.insert(position, new_key, item))
    }

    /// Inserts an item after the keyed entry. Returns `None` if the key
    /// does not exist.
    pub fn after(
        &mut self,
        key: &str,
        new_key: Option<String>,
        item: T,
    ) -> Option<Result<String, CollectionError>> {
        self.key_offset(key)
            .map(|position| self.insert(position + 1, new_key, item))
    }

    /// Replaces the item at the cursor. Returns false if the cursor is on
    /// a sentinel position.
    pub fn modify(&mut self, item: T) -> bool {
        if self.valid() && self.allowed(&item) {
            self.items[self.cursor as usize] = item;
            true
        } else {
            false
        }
    }

    /// Removes the item at the cursor. Returns false if the cursor is on a
    /// sentinel position.
    pub fn remove(&mut self) -> bool {
        if self.valid() {
            self.remove_at(self.cursor as usize);
            true
        } else {
            false
        }
    }

    fn remove_at(&mut self, position: usize) {
        self.keys.remove(position);
        self.items.remove(position);
        if self.cursor >= self.items.len() as isize {
            self.cursor -= 1;
        }
    }

    /// Empties the list and rewinds the cursor.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.items.clear();
        self.rewind();
    }

    //-----------------------------------------------------------------
    //   retrieval methods
    //-----------------------------------------------------------------

    /// The item at the cursor, if the cursor is on an actual position.
    pub fn current(&self) -> Option<&T> {
        if self.valid() {
            self.items.get(self.cursor as usize)
        } else {
            None
        }
    }

    /// The key at the cursor, if the cursor is on an actual position.
    pub fn current_key(&self) -> Option<&str> {
        if self.valid() {
            self.keys.get(self.cursor as usize).map(String::as_str)
        } else {
            None
        }
    }

    /// The first item, without moving the cursor.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// The last item, without moving the cursor.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// The item at the position passed.
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    /// Iterates over `(key, item)` pairs in order, without the cursor.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.items.iter())
    }

    //-----------------------------------------------------------------
    //   key methods
    //-----------------------------------------------------------------

    /// Returns true if an item exists under the key.
    pub fn key_exists(&self, key: &str) -> bool {
        self.key_offset(key).is_some()
    }

    /// The position of the keyed item.
    pub fn key_offset(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|existing| existing == key)
    }

    /// The key at the position passed.
    pub fn offset_key(&self, position: usize) -> Option<&str> {
        self.keys.get(position).map(String::as_str)
    }

    /// The item under the key, if it exists.
    pub fn key_get(&self, key: &str) -> Option<&T> {
        self.key_offset(key).map(|position| &self.items[position])
    }

    /// Replaces the item under the key. Returns false if the key does not
    /// exist or the item is rejected by the validation hook.
    pub fn key_set(&mut self, key: &str, item: T) -> bool {
        match self.key_offset(key) {
            Some(position) if self.allowed(&item) => {
                self.items[position] = item;
                true
            }
            _ => false,
        }
    }

    /// Removes the item under the key, compacting the order. Returns the
    /// removed item, or `None` if the key does not exist.
    pub fn key_unset(&mut self, key: &str) -> Option<T> {
        let position = self.key_offset(key)?;
        self.keys.remove(position);
        let item = self.items.remove(position);
        if self.cursor >= self.items.len() as isize {
            self.cursor -= 1;
        }
        Some(item)
    }
}

impl<T: Clone> Clone for KeyedList<T> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            items: self.items.clone(),
            cursor: self.cursor,
            serial: self.serial,
            validator: self.validator,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for KeyedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.keys.iter().zip(self.items.iter()))
            .finish()
    }
}
