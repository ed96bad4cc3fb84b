//! Request-scoped template variables.
//!
//! A [`TemplateVariableContainer`] collects values that a later rendering
//! step merges into its own variables. Middleware adds to it as the request
//! travels down the pipeline; handlers read from it.
//!
//! The container never changes in place. Every "mutation" returns a new
//! container and leaves the receiver as it was:
//!
//! ```rust
//! use trestle::{TemplateVariableContainer, Variable};
//!
//! let empty = TemplateVariableContainer::new();
//! let filled = empty.with("title", Variable::new("Home"));
//!
//! assert!(!empty.has("title"));
//! assert_eq!(filled.get("title").and_then(|v| v.downcast_ref::<&str>()), Some(&"Home"));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ── Variable ──────────────────────────────────────────────────────────────────

/// A single template variable: either an explicit null or a shared value.
///
/// Values are stored as `Arc<dyn Any + Send + Sync>`. Cloning a `Variable`
/// clones the `Arc`, so the same underlying instance is visible through every
/// container that holds it.
#[derive(Clone)]
pub enum Variable {
    Null,
    Value(Arc<dyn Any + Send + Sync>),
}

impl Variable {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    /// Wraps an already shared value without re-allocating it.
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self::Value(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as `T`, or `None` when null or of another type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Null => None,
            Self::Value(v) => v.downcast_ref::<T>(),
        }
    }

    /// Returns the shared handle when the variable is not null.
    pub fn as_arc(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        match self {
            Self::Null => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl<T: Any + Send + Sync> From<Option<Arc<T>>> for Variable {
    fn from(value: Option<Arc<T>>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(_) => f.write_str("Value(..)"),
        }
    }
}

// ── Container ─────────────────────────────────────────────────────────────────

/// Copy-on-write map of template variable names to [`Variable`]s.
///
/// Cloning is one `Arc` increment; clones are the *same instance* as far as
/// [`TemplateVariableContainer::ptr_eq`] is concerned. Writes allocate a
/// shallow copy of the map and return it as a new instance.
#[derive(Clone, Default)]
pub struct TemplateVariableContainer {
    vars: Arc<HashMap<String, Variable>>,
}

impl TemplateVariableContainer {
    /// Request attribute under which the container travels.
    pub const ATTRIBUTE: &'static str = "trestle::template::TemplateVariableContainer";

    /// Deprecated attribute name, still written for handlers that read the
    /// container from its former namespace.
    pub const LEGACY_ATTRIBUTE: &'static str = "trestle::helper::template::TemplateVariableContainer";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn has(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Returns `None` when `key` is absent and `Some(Variable::Null)` when it
    /// is present with a null value.
    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.vars.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a new container with `key` set to `value`.
    pub fn with(&self, key: impl Into<String>, value: Variable) -> Self {
        let mut vars = HashMap::clone(&self.vars);
        vars.insert(key.into(), value);
        Self { vars: Arc::new(vars) }
    }

    /// Returns a new container without `key`.
    pub fn without(&self, key: &str) -> Self {
        let mut vars = HashMap::clone(&self.vars);
        vars.remove(key);
        Self { vars: Arc::new(vars) }
    }

    /// Returns a new container holding the variables of both; `other` wins on
    /// conflicting keys.
    pub fn merge(&self, other: &TemplateVariableContainer) -> Self {
        let mut vars = HashMap::clone(&self.vars);
        vars.extend(other.iter().map(|(k, v)| (k.to_owned(), v.clone())));
        Self { vars: Arc::new(vars) }
    }

    /// Overlays template-specific `vars` on top of the container's variables
    /// and returns the result as a plain map. Values in `vars` win.
    pub fn merge_for_template(&self, vars: HashMap<String, Variable>) -> HashMap<String, Variable> {
        let mut merged = HashMap::clone(&self.vars);
        merged.extend(vars);
        merged
    }

    /// `true` when both handles refer to the same container instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.vars, &b.vars)
    }
}

impl fmt::Debug for TemplateVariableContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.vars.iter()).finish()
    }
}
