//! Object model: capability composition, type tags, modified time, observers.
//!
//! Objects are assembled from an explicit, ordered list of capabilities.
//! Each capability contributes its tag and its properties; the resulting tag
//! list runs least- to most-derived and drives backend resolution.
//!
//! # Invariants
//! - Modified time only advances on an effective change.
//! - Modified times come from one process-wide clock and are comparable
//!   across objects.
//! - Observers are notified synchronously, in subscription order; the first
//!   failure stops delivery and is returned to the mutating caller.

mod hierarchy;
mod object;
mod observer;
mod types;
mod value;

pub use hierarchy::{Hierarchy, depth, first_ancestor_of_type};
pub use object::{Capability, ModifiedEvent, ObjectError, ObjectState, PropertyMap, extend};
pub use observer::{Detached, ObserverError, ObserverFn, Observers, Subscription};
pub use types::{ObjectId, TypeTag, current_mtime, next_mtime};
pub use value::Value;

pub fn crate_info() -> &'static str {
    "sceneview-object v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("object"));
    }
}
