// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observable attribute cells backed by `tokio::sync::watch`.

use std::fmt;

use tokio::sync::watch;

/// One observable attribute of a live entity.
///
/// Observers obtained from [`Property::watch`] are notified only when the
/// value actually changes.
pub struct Property<T> {
    sender: watch::Sender<T>,
}

impl<T> Property<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Property { sender }
    }

    /// Subscribe to changes.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Edit in place; `f` returns whether it changed anything.
    pub fn modify(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.sender.send_if_modified(f)
    }
}

impl<T: Clone> Property<T> {
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

impl<T: PartialEq> Property<T> {
    /// Replace the value if it differs. Returns whether it changed.
    pub fn set(&self, value: T) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

impl<T: PartialEq> Property<Option<T>> {
    /// Apply an optional snapshot attribute: absent leaves the value alone.
    pub fn update(&self, value: Option<&T>) -> bool
    where
        T: Clone,
    {
        match value {
            Some(value) => self.set(Some(value.clone())),
            None => false,
        }
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| fmt::Debug::fmt(value, f))
    }
}

#[cfg(test)]
#[path = "property_tests.rs"]
mod tests;
