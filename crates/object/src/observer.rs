use std::fmt;

use crate::object::ModifiedEvent;

/// Failure reported by an observer callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("observer {subscription} failed: {message}")]
pub struct ObserverError {
    pub subscription: u64,
    pub message: String,
}

impl ObserverError {
    /// Convenience for callbacks; the subscription id is filled in on delivery.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            subscription: 0,
            message: message.into(),
        }
    }
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type ObserverFn = Box<dyn FnMut(&ModifiedEvent) -> Result<(), ObserverError>>;

type Entry = (Subscription, ObserverFn);

/// Ordered observer list: the notification capability's state block.
///
/// Owners that deliver through a shared cell [`detach`](Observers::detach)
/// the callbacks, notify them with no borrow held, then
/// [`reattach`](Observers::reattach). Callbacks may then subscribe,
/// unsubscribe or clear the list while an event is being delivered.
#[derive(Default)]
pub struct Observers {
    entries: Vec<Entry>,
    next: u64,
    delivering: usize,
    removed: Vec<Subscription>,
    cleared: bool,
}

/// Callbacks taken out of an [`Observers`] list for one delivery.
pub struct Detached(Vec<Entry>);

impl Detached {
    /// Same contract as [`Observers::notify`].
    pub fn notify(&mut self, event: &ModifiedEvent) -> Result<(), ObserverError> {
        notify_entries(&mut self.0, event)
    }
}

fn notify_entries(entries: &mut [Entry], event: &ModifiedEvent) -> Result<(), ObserverError> {
    for (sub, callback) in entries.iter_mut() {
        if let Err(mut err) = callback(event) {
            err.subscription = sub.0;
            tracing::debug!(object = %event.object, subscription = %sub, "observer failed, delivery stopped");
            return Err(err);
        }
    }
    Ok(())
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&ModifiedEvent) -> Result<(), ObserverError> + 'static,
    ) -> Subscription {
        self.next += 1;
        let sub = Subscription(self.next);
        self.entries.push((sub, Box::new(callback)));
        sub
    }

    /// Returns false when the subscription was not present. While a
    /// delivery is detached, any id this list handed out is accepted and
    /// dropped on reattach.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(s, _)| *s != sub);
        if self.entries.len() != before {
            return true;
        }
        if self.delivering > 0 && sub.0 <= self.next && !self.removed.contains(&sub) {
            self.removed.push(sub);
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if self.delivering > 0 {
            self.cleared = true;
        }
    }

    /// Take the callbacks out for delivery. Must be paired with
    /// [`reattach`](Observers::reattach).
    pub fn detach(&mut self) -> Detached {
        self.delivering += 1;
        Detached(std::mem::take(&mut self.entries))
    }

    /// Put detached callbacks back ahead of those subscribed during delivery,
    /// minus any unsubscribed or cleared meanwhile.
    pub fn reattach(&mut self, detached: Detached) {
        let mut entries = detached.0;
        if self.cleared {
            entries.clear();
        }
        entries.retain(|(s, _)| !self.removed.contains(s));
        entries.append(&mut self.entries);
        self.entries = entries;
        self.delivering = self.delivering.saturating_sub(1);
        if self.delivering == 0 {
            self.removed.clear();
            self.cleared = false;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` in subscription order.
    ///
    /// The first failing observer stops delivery; observers after it do not
    /// see this event. Its error is returned with the subscription filled in.
    pub fn notify(&mut self, event: &ModifiedEvent) -> Result<(), ObserverError> {
        notify_entries(&mut self.entries, event)
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
