//! Composition and custom hooks.
//!
//! Both hooks are optional, typed over the backend's realized shape `R`, and
//! invoked at most once per synthesis pass: they are stored as `FnOnce` and
//! consumed by the driver. The composition hook always runs before the
//! custom hook.
//!
//! A hook body may fail with any error type; the driver hands it back
//! untouched inside [`Error::Hook`](crate::Error::Hook).

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::scope::DeploymentScope;

/// Error raised inside a hook body.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for hook bodies.
pub type HookResult<T> = std::result::Result<T, HookError>;

// ---------------------------------------------------------------------------
// HookKind / HookPresence / HookOutcome
// ---------------------------------------------------------------------------

/// The two extension points of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Cross-resource wiring over realized resources.
    Compose,
    /// Arbitrary infrastructure attached to the deployment scope.
    Custom,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compose => write!(f, "compose"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Whether a hook was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPresence {
    /// The hook is declared and will be invoked.
    Present,
    /// No hook: the step is skipped.
    Absent,
}

impl HookPresence {
    /// Whether the hook is declared.
    #[must_use]
    pub fn is_present(self) -> bool {
        self == Self::Present
    }
}

/// Presence of both hooks of a backend definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookSet {
    /// The composition hook.
    pub compose: HookPresence,
    /// The custom hook.
    pub custom: HookPresence,
}

/// What happened to one hook during a synthesis pass.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome<T> {
    /// No hook was declared, nothing was invoked.
    Absent,
    /// The hook ran once and returned `T`.
    Completed(T),
}

impl<T> HookOutcome<T> {
    /// Whether the hook ran.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The hook's return value, if it ran.
    #[must_use]
    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Absent => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Hook return values
// ---------------------------------------------------------------------------

/// A relationship declared by a composition hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Resource that gains access.
    pub from: String,
    /// Resource being accessed.
    pub to: String,
    /// Free-form relation, e.g. `"read"`.
    pub relation: String,
}

/// What a composition hook returns: the links it established.
///
/// A hook returning `()` yields an empty composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Composition {
    links: Vec<Link>,
}

impl Composition {
    /// Empty composition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` relates to `to`.
    pub fn link(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        self.links.push(Link {
            from: from.into(),
            to: to.into(),
            relation: relation.into(),
        });
        self
    }

    /// Links in declaration order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Whether no link was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl From<()> for Composition {
    fn from((): ()) -> Self {
        Self::default()
    }
}

/// What a custom hook returns: named outputs for the driver.
///
/// A hook returning `()` yields no outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomResources {
    outputs: IndexMap<String, serde_json::Value>,
}

impl CustomResources {
    /// No outputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output. A later output with the same name replaces the
    /// earlier one.
    pub fn output(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.outputs.insert(name.into(), value.into());
        self
    }

    /// Output by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.outputs.get(name)
    }

    /// Outputs in insertion order.
    pub fn outputs(&self) -> impl ExactSizeIterator<Item = (&str, &serde_json::Value)> {
        self.outputs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether there are no outputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl From<()> for CustomResources {
    fn from((): ()) -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// ComposeHook / CustomHook
// ---------------------------------------------------------------------------

type ComposeFn<R> = Box<dyn FnOnce(&mut R) -> HookResult<Composition> + Send>;
type CustomFn<R> =
    Box<dyn FnOnce(&mut R, &mut DeploymentScope) -> HookResult<CustomResources> + Send>;

/// Composition hook over realized resources `R`.
pub struct ComposeHook<R> {
    body: ComposeFn<R>,
}

impl<R: 'static> ComposeHook<R> {
    /// Wrap a closure returning `()` or a [`Composition`].
    pub fn new<F, O>(body: F) -> Self
    where
        F: FnOnce(&mut R) -> HookResult<O> + Send + 'static,
        O: Into<Composition>,
    {
        Self {
            body: Box::new(move |realized: &mut R| body(realized).map(Into::into)),
        }
    }

    /// Run the hook, consuming it.
    pub(crate) fn invoke(self, realized: &mut R) -> HookResult<Composition> {
        (self.body)(realized)
    }
}

impl<R> fmt::Debug for ComposeHook<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeHook").finish_non_exhaustive()
    }
}

/// Custom hook over realized resources `R` and the deployment scope.
pub struct CustomHook<R> {
    body: CustomFn<R>,
}

impl<R: 'static> CustomHook<R> {
    /// Wrap a closure returning `()` or [`CustomResources`].
    pub fn new<F, O>(body: F) -> Self
    where
        F: FnOnce(&mut R, &mut DeploymentScope) -> HookResult<O> + Send + 'static,
        O: Into<CustomResources>,
    {
        Self {
            body: Box::new(move |realized: &mut R, scope: &mut DeploymentScope| {
                body(realized, scope).map(Into::into)
            }),
        }
    }

    /// Run the hook, consuming it. The scope is only borrowed for the call.
    pub(crate) fn invoke(
        self,
        realized: &mut R,
        scope: &mut DeploymentScope,
    ) -> HookResult<CustomResources> {
        (self.body)(realized, scope)
    }
}

impl<R> fmt::Debug for CustomHook<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomHook").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Realized {
        granted: Vec<&'static str>,
    }

    #[test]
    fn compose_hook_returning_unit_yields_empty_composition() {
        let hook = ComposeHook::new(|r: &mut Realized| {
            r.granted.push("fn->bucket");
            Ok(())
        });
        let mut realized = Realized::default();
        let composition = hook.invoke(&mut realized).unwrap();
        assert!(composition.is_empty());
        assert_eq!(realized.granted, vec!["fn->bucket"]);
    }

    #[test]
    fn compose_hook_can_return_links() {
        let hook = ComposeHook::new(|_: &mut Realized| {
            Ok(Composition::new().link("handler", "storage", "read"))
        });
        let composition = hook.invoke(&mut Realized::default()).unwrap();
        assert_eq!(
            composition.links(),
            &[Link {
                from: "handler".into(),
                to: "storage".into(),
                relation: "read".into(),
            }]
        );
    }

    #[test]
    fn custom_hook_sees_scope_and_returns_outputs() {
        let hook = CustomHook::new(|_: &mut Realized, scope: &mut DeploymentScope| {
            Ok(CustomResources::new().output("scope", scope.name().to_string()))
        });
        let mut scope = DeploymentScope::new("sandbox");
        let out = hook.invoke(&mut Realized::default(), &mut scope).unwrap();
        assert_eq!(out.get("scope"), Some(&json!("sandbox")));
    }

    #[test]
    fn hook_error_keeps_its_type() {
        let hook = ComposeHook::new(|_: &mut Realized| -> HookResult<()> {
            Err(std::io::Error::other("boom").into())
        });
        let err = hook.invoke(&mut Realized::default()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn outcome_accessors() {
        let absent: HookOutcome<Composition> = HookOutcome::Absent;
        assert!(!absent.is_completed());
        assert!(absent.completed().is_none());
        assert!(HookOutcome::Completed(Composition::new()).is_completed());
        assert!(HookPresence::Present.is_present());
    }
}
