use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::{Vec3, Vec4};
use sceneview_object::{
    Hierarchy, ModifiedEvent, ObjectError, ObjectId, ObjectState, Observers, ObserverError,
    PropertyMap, Subscription, TypeTag, Value, first_ancestor_of_type,
};

use crate::kinds::RenderableKind;

/// Errors from structural edits of the renderable tree.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("adding {child} under {parent} would create a cycle")]
    Cycle { parent: ObjectId, child: ObjectId },
    #[error(transparent)]
    Object(#[from] ObjectError),
}

struct Inner {
    state: RefCell<ObjectState>,
    observers: RefCell<Observers>,
    children: RefCell<Vec<Renderable>>,
    parent: RefCell<Weak<Inner>>,
}

/// Handle to a node of the client-owned renderable tree.
///
/// Cloning the handle shares the node. Parents hold their children
/// strongly and children hold their parent weakly. The tree is
/// single-threaded; mutate it between frames only.
#[derive(Clone)]
pub struct Renderable(Rc<Inner>);

/// Non-owning reference to a renderable, used by view nodes.
#[derive(Clone, Default)]
pub struct WeakRenderable(Weak<Inner>);

impl WeakRenderable {
    pub fn upgrade(&self) -> Option<Renderable> {
        self.0.upgrade().map(Renderable)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl Renderable {
    /// A renderable of `kind` with default property values.
    pub fn new(kind: RenderableKind) -> Self {
        Self::from_state(ObjectState::with_capabilities(&kind.capabilities()))
    }

    /// A renderable of `kind` with some properties overridden.
    pub fn with_values<K, V>(
        kind: RenderableKind,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, ObjectError>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let initial: PropertyMap = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let state = ObjectState::new_instance(&kind.capabilities(), &initial)?;
        Ok(Self::from_state(state))
    }

    /// Wrap an already composed object, e.g. one built from custom
    /// capabilities an embedding defines.
    pub fn from_state(state: ObjectState) -> Self {
        Self(Rc::new(Inner {
            state: RefCell::new(state),
            observers: RefCell::new(Observers::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
        }))
    }

    pub fn id(&self) -> ObjectId {
        self.0.state.borrow().id()
    }

    /// Tags ordered least- to most-derived.
    pub fn tags(&self) -> Vec<TypeTag> {
        self.0.state.borrow().tags().to_vec()
    }

    pub fn class_name(&self) -> TypeTag {
        self.0.state.borrow().class_name()
    }

    pub fn is_a(&self, tag: TypeTag) -> bool {
        self.0.state.borrow().is_a(tag)
    }

    pub fn mtime(&self) -> u64 {
        self.0.state.borrow().mtime()
    }

    pub fn is_deleted(&self) -> bool {
        self.0.state.borrow().is_deleted()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.state.borrow().get(name).cloned()
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ObjectError> {
        self.0.state.borrow().get_bool(name)
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, ObjectError> {
        self.0.state.borrow().get_i64(name)
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, ObjectError> {
        self.0.state.borrow().get_f64(name)
    }

    pub fn get_text(&self, name: &str) -> Result<String, ObjectError> {
        self.0.state.borrow().get_text(name).map(str::to_string)
    }

    pub fn get_vec3(&self, name: &str) -> Result<Vec3, ObjectError> {
        self.0.state.borrow().get_vec3(name)
    }

    pub fn get_vec4(&self, name: &str) -> Result<Vec4, ObjectError> {
        self.0.state.borrow().get_vec4(name)
    }

    /// Assign a property. Returns whether the value changed.
    ///
    /// On change the modified time advances and observers run synchronously,
    /// after the assignment is visible. An observer failure is returned here;
    /// the assignment itself stands.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<bool, ObjectError> {
        let event = self.0.state.borrow_mut().assign(name, value)?;
        match event {
            Some(event) => {
                self.deliver(&event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Assign several properties with one modified event. Nothing is written
    /// if any entry is unknown or of the wrong kind.
    pub fn set_many<K, V>(
        &self,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<bool, ObjectError>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let values: PropertyMap = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let event = self.0.state.borrow_mut().assign_many(&values)?;
        match event {
            Some(event) => {
                self.deliver(&event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Advance the modified time and notify observers without a property
    /// change.
    pub fn modified(&self) -> Result<(), ObjectError> {
        let event = self.0.state.borrow_mut().touch()?;
        self.deliver(&event)
    }

    /// Callbacks may edit this node. Changes made from inside a delivery are
    /// not re-delivered to the callbacks of that delivery, and subscriptions
    /// made there see only later events.
    pub fn on_modified(
        &self,
        callback: impl FnMut(&ModifiedEvent) -> Result<(), ObserverError> + 'static,
    ) -> Subscription {
        self.0.observers.borrow_mut().subscribe(callback)
    }

    pub fn unsubscribe(&self, sub: Subscription) -> bool {
        self.0.observers.borrow_mut().unsubscribe(sub)
    }

    /// Mark deleted and drop all observers. Later mutations fail.
    pub fn delete(&self) {
        self.0.state.borrow_mut().delete();
        self.0.observers.borrow_mut().clear();
    }

    /// Append `child`, detaching it from any previous parent first.
    ///
    /// Returns false if `child` is already a child of this node. Rejects
    /// edits that would make a node its own ancestor.
    pub fn add_child(&self, child: &Renderable) -> Result<bool, SceneError> {
        if self.contains_child(child) {
            return Ok(false);
        }
        if self.ptr_eq(child) || child.is_ancestor_of(self) {
            return Err(SceneError::Cycle {
                parent: self.id(),
                child: child.id(),
            });
        }
        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child)?;
        }
        self.0.children.borrow_mut().push(child.clone());
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        tracing::trace!(parent = %self.id(), child = %child.id(), class = %child.class_name(), "child added");
        self.modified()?;
        Ok(true)
    }

    /// Returns false if `child` was not a child of this node.
    pub fn remove_child(&self, child: &Renderable) -> Result<bool, SceneError> {
        let removed = {
            let mut children = self.0.children.borrow_mut();
            let before = children.len();
            children.retain(|c| !c.ptr_eq(child));
            children.len() != before
        };
        if !removed {
            return Ok(false);
        }
        *child.0.parent.borrow_mut() = Weak::new();
        tracing::trace!(parent = %self.id(), child = %child.id(), "child removed");
        self.modified()?;
        Ok(true)
    }

    pub fn remove_all_children(&self) -> Result<usize, SceneError> {
        let children = std::mem::take(&mut *self.0.children.borrow_mut());
        for child in &children {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        if !children.is_empty() {
            self.modified()?;
        }
        Ok(children.len())
    }

    /// Snapshot of the child list, in insertion order.
    pub fn children(&self) -> Vec<Renderable> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn contains_child(&self, child: &Renderable) -> bool {
        self.0.children.borrow().iter().any(|c| c.ptr_eq(child))
    }

    pub fn parent(&self) -> Option<Renderable> {
        self.0.parent.borrow().upgrade().map(Renderable)
    }

    pub fn first_ancestor_of_type(&self, tag: TypeTag) -> Option<Renderable> {
        first_ancestor_of_type(self, tag)
    }

    pub fn downgrade(&self) -> WeakRenderable {
        WeakRenderable(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Renderable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn is_ancestor_of(&self, node: &Renderable) -> bool {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if ancestor.ptr_eq(self) {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }

    /// Callbacks run with no borrow of this node held, so they may edit it.
    fn deliver(&self, event: &ModifiedEvent) -> Result<(), ObjectError> {
        let mut detached = self.0.observers.borrow_mut().detach();
        let result = detached.notify(event);
        self.0.observers.borrow_mut().reattach(detached);
        result?;
        Ok(())
    }
}

impl Hierarchy for Renderable {
    fn parent(&self) -> Option<Self> {
        Renderable::parent(self)
    }

    fn is_a(&self, tag: TypeTag) -> bool {
        Renderable::is_a(self, tag)
    }
}

impl PartialEq for Renderable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Renderable {}

impl fmt::Debug for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("Renderable")
            .field("id", &state.id())
            .field("class", &state.class_name())
            .field("mtime", &state.mtime())
            .field("children", &self.0.children.borrow().len())
            .finish()
    }
}

impl fmt::Debug for WeakRenderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(r) => write!(f, "WeakRenderable({:?})", r),
            None => f.write_str("WeakRenderable(<dropped>)"),
        }
    }
}
