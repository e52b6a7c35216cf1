use std::collections::BTreeMap;

use glam::{Vec3, Vec4};

use crate::observer::ObserverError;
use crate::types::{ObjectId, TypeTag, next_mtime};
use crate::value::Value;

/// Values supplied at construction, keyed by property name.
pub type PropertyMap = BTreeMap<String, Value>;

/// Errors from property access and mutation.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("unknown property `{name}` on {class}")]
    UnknownProperty { class: TypeTag, name: String },
    #[error("property `{name}` holds a {expected}, got a {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Observer(#[from] ObserverError),
    #[error("object {0} has been deleted")]
    Deleted(ObjectId),
}

/// One named capability: its tag plus the properties it contributes.
#[derive(Debug, Clone)]
pub struct Capability {
    tag: TypeTag,
    defaults: Vec<(&'static str, Value)>,
}

impl Capability {
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            defaults: Vec::new(),
        }
    }

    /// Declare a property with its default value.
    pub fn with(mut self, name: &'static str, default: impl Into<Value>) -> Self {
        self.defaults.push((name, default.into()));
        self
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn defaults(&self) -> &[(&'static str, Value)] {
        &self.defaults
    }
}

/// Emitted after an effective change.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedEvent {
    pub object: ObjectId,
    pub mtime: u64,
    /// `None` for structural or explicit modifications.
    pub property: Option<String>,
}

/// State block shared by every capability: identity, tag list, modified
/// time and the property map.
#[derive(Debug, Clone)]
pub struct ObjectState {
    id: ObjectId,
    tags: Vec<TypeTag>,
    mtime: u64,
    properties: BTreeMap<&'static str, Value>,
    deleted: bool,
}

impl ObjectState {
    /// An object with no capabilities yet.
    pub fn empty() -> Self {
        Self {
            id: ObjectId::new(),
            tags: Vec::new(),
            mtime: next_mtime(),
            properties: BTreeMap::new(),
            deleted: false,
        }
    }

    /// Build an object from `capabilities` with every property at its
    /// default.
    pub fn with_capabilities(capabilities: &[Capability]) -> Self {
        let mut state = Self::empty();
        for capability in capabilities {
            if !state.tags.contains(&capability.tag) {
                state.tags.push(capability.tag);
            }
            for (name, default) in &capability.defaults {
                state.properties.insert(*name, default.clone());
            }
        }
        state
    }

    /// Build an object by applying `capabilities` in order, least-derived
    /// first. Every key in `initial` must be declared by some capability.
    pub fn new_instance(
        capabilities: &[Capability],
        initial: &PropertyMap,
    ) -> Result<Self, ObjectError> {
        let mut state = Self::empty();
        for capability in capabilities {
            extend(&mut state, capability, initial)?;
        }
        if let Some(name) = initial
            .keys()
            .find(|k| !state.properties.contains_key(k.as_str()))
        {
            return Err(ObjectError::UnknownProperty {
                class: state.class_name(),
                name: name.clone(),
            });
        }
        Ok(state)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Tags ordered least- to most-derived.
    pub fn tags(&self) -> &[TypeTag] {
        &self.tags
    }

    /// Most-derived tag, or `Object` for an object with no capabilities.
    pub fn class_name(&self) -> TypeTag {
        self.tags
            .last()
            .copied()
            .unwrap_or(TypeTag::new("Object"))
    }

    pub fn is_a(&self, tag: TypeTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Property names in deterministic order.
    pub fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.keys().copied()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ObjectError> {
        match self.require(name)? {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(name, "bool", other)),
        }
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, ObjectError> {
        match self.require(name)? {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(name, "int", other)),
        }
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, ObjectError> {
        match self.require(name)? {
            Value::Float(v) => Ok(*v),
            other => Err(mismatch(name, "float", other)),
        }
    }

    pub fn get_text(&self, name: &str) -> Result<&str, ObjectError> {
        match self.require(name)? {
            Value::Text(v) => Ok(v),
            other => Err(mismatch(name, "text", other)),
        }
    }

    pub fn get_vec3(&self, name: &str) -> Result<Vec3, ObjectError> {
        match self.require(name)? {
            Value::Vec3(v) => Ok(*v),
            other => Err(mismatch(name, "vec3", other)),
        }
    }

    pub fn get_vec4(&self, name: &str) -> Result<Vec4, ObjectError> {
        match self.require(name)? {
            Value::Vec4(v) => Ok(*v),
            other => Err(mismatch(name, "vec4", other)),
        }
    }

    /// Assign a property without notifying anyone.
    ///
    /// Returns the event to deliver when the value changed, `None` when it
    /// was already equal. Callers owning observers deliver the event once
    /// they no longer hold a borrow of this state.
    pub fn assign(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<ModifiedEvent>, ObjectError> {
        if self.deleted {
            return Err(ObjectError::Deleted(self.id));
        }
        let value = value.into();
        let class = self.class_name();
        let Some((key, current)) = self.properties.get_key_value(name) else {
            return Err(ObjectError::UnknownProperty {
                class,
                name: name.to_string(),
            });
        };
        if !current.same_kind(&value) {
            return Err(mismatch(name, current.kind(), &value));
        }
        if *current == value {
            return Ok(None);
        }
        let key = *key;
        self.properties.insert(key, value);
        Ok(Some(self.advance(Some(key.to_string()))))
    }

    /// Assign several properties at once.
    ///
    /// Every entry is checked before anything is written, so an unknown name
    /// or a kind mismatch leaves the object untouched. Produces a single
    /// event if at least one value changed.
    pub fn assign_many(&mut self, values: &PropertyMap) -> Result<Option<ModifiedEvent>, ObjectError> {
        if self.deleted {
            return Err(ObjectError::Deleted(self.id));
        }
        for (name, value) in values {
            let current = self.require(name)?;
            if !current.same_kind(value) {
                return Err(mismatch(name, current.kind(), value));
            }
        }
        let mut changed = false;
        for (name, value) in values {
            if let Some(current) = self.properties.get_mut(name.as_str()) {
                if current != value {
                    *current = value.clone();
                    changed = true;
                }
            }
        }
        Ok(changed.then(|| self.advance(None)))
    }

    /// Advance the modified time without touching any property.
    pub fn touch(&mut self) -> Result<ModifiedEvent, ObjectError> {
        if self.deleted {
            return Err(ObjectError::Deleted(self.id));
        }
        Ok(self.advance(None))
    }

    /// Mark the object deleted. Later mutations fail with `Deleted`.
    pub fn delete(&mut self) {
        self.deleted = true;
    }

    fn advance(&mut self, property: Option<String>) -> ModifiedEvent {
        self.mtime = next_mtime();
        ModifiedEvent {
            object: self.id,
            mtime: self.mtime,
            property,
        }
    }

    fn require(&self, name: &str) -> Result<&Value, ObjectError> {
        self.properties
            .get(name)
            .ok_or_else(|| ObjectError::UnknownProperty {
                class: self.class_name(),
                name: name.to_string(),
            })
    }
}

/// Add `capability` to `target`: push its tag and install its property
/// defaults, taking values from `initial` where it supplies them.
pub fn extend(
    target: &mut ObjectState,
    capability: &Capability,
    initial: &PropertyMap,
) -> Result<(), ObjectError> {
    if !target.tags.contains(&capability.tag) {
        target.tags.push(capability.tag);
    }
    for (name, default) in &capability.defaults {
        let value = match initial.get(*name) {
            Some(v) if !v.same_kind(default) => return Err(mismatch(name, default.kind(), v)),
            Some(v) => v.clone(),
            None => default.clone(),
        };
        target.properties.insert(*name, value);
    }
    Ok(())
}

fn mismatch(name: &str, expected: &'static str, found: &Value) -> ObjectError {
    ObjectError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}
