//! Route records and their definitions.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::location::Meta;
use crate::matcher::pattern::PathPattern;
use crate::matcher::Redirect;
use crate::navigation::guard::Guard;

/// Name of the view used when a component is registered without one.
pub const DEFAULT_VIEW: &str = "default";

/// Handle to a mounted component, owned by the rendering layer.
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

/// Stable identity of a record inside its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub usize);

/// A routable component with its in-component guards.
#[derive(Clone, Default)]
pub struct Component {
    name: String,
    before_route_enter: Option<Guard>,
    before_route_update: Option<Guard>,
    before_route_leave: Option<Guard>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn before_route_enter(mut self, guard: Guard) -> Self {
        self.before_route_enter = Some(guard);
        self
    }

    pub fn before_route_update(mut self, guard: Guard) -> Self {
        self.before_route_update = Some(guard);
        self
    }

    pub fn before_route_leave(mut self, guard: Guard) -> Self {
        self.before_route_leave = Some(guard);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enter_guard(&self) -> Option<&Guard> {
        self.before_route_enter.as_ref()
    }

    pub fn update_guard(&self) -> Option<&Guard> {
        self.before_route_update.as_ref()
    }

    pub fn leave_guard(&self) -> Option<&Guard> {
        self.before_route_leave.as_ref()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("has_enter_guard", &self.before_route_enter.is_some())
            .field("has_update_guard", &self.before_route_update.is_some())
            .field("has_leave_guard", &self.before_route_leave.is_some())
            .finish()
    }
}

/// Route definition used to build a [`RouteTable`](crate::matcher::RouteTable).
///
/// Child paths without a leading `/` are relative to their parent.
#[derive(Debug, Clone, Default)]
pub struct RouteDef {
    pub(crate) path: String,
    pub(crate) name: Option<String>,
    pub(crate) views: Vec<(String, Arc<Component>)>,
    pub(crate) before_enter: Vec<Guard>,
    pub(crate) redirect: Option<Redirect>,
    pub(crate) meta: Meta,
    pub(crate) children: Vec<RouteDef>,
}

impl RouteDef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register the component of the default view.
    pub fn component(self, component: Component) -> Self {
        self.view(DEFAULT_VIEW, component)
    }

    /// Register a component for a named view. Views keep declaration order.
    pub fn view(mut self, view: impl Into<String>, component: Component) -> Self {
        self.views.push((view.into(), Arc::new(component)));
        self
    }

    /// Add a `before_enter` guard; repeated calls build an ordered list.
    pub fn before_enter(mut self, guard: Guard) -> Self {
        self.before_enter.push(guard);
        self
    }

    pub fn redirect(mut self, redirect: impl Into<Redirect>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn child(mut self, child: RouteDef) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = RouteDef>) -> Self {
        self.children.extend(children);
        self
    }
}

/// An immutable registration entry of the route table.
///
/// Only the `instances` map changes after construction; the rendering layer
/// fills it through [`RouteRecord::mount`].
pub struct RouteRecord {
    id: RecordId,
    pattern: PathPattern,
    name: Option<String>,
    views: Vec<(String, Arc<Component>)>,
    before_enter: Vec<Guard>,
    redirect: Option<Redirect>,
    meta: Meta,
    parent: Option<RecordId>,
    instances: DashMap<String, ComponentInstance>,
}

impl RouteRecord {
    pub(crate) fn new(
        id: RecordId,
        pattern: PathPattern,
        def: &RouteDef,
        parent: Option<RecordId>,
    ) -> Self {
        Self {
            id,
            pattern,
            name: def.name.clone(),
            views: def.views.clone(),
            before_enter: def.before_enter.clone(),
            redirect: def.redirect.clone(),
            meta: def.meta.clone(),
            parent,
            instances: DashMap::new(),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Absolute path pattern.
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<RecordId> {
        self.parent
    }

    /// Views in declaration order.
    pub fn views(&self) -> impl Iterator<Item = (&str, &Arc<Component>)> {
        self.views.iter().map(|(view, component)| (view.as_str(), component))
    }

    pub fn before_enter(&self) -> &[Guard] {
        &self.before_enter
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Record a mounted component instance for `view`.
    pub fn mount(&self, view: impl Into<String>, instance: ComponentInstance) {
        self.instances.insert(view.into(), instance);
    }

    pub fn unmount(&self, view: &str) -> Option<ComponentInstance> {
        self.instances.remove(view).map(|(_, instance)| instance)
    }

    pub fn instance(&self, view: &str) -> Option<ComponentInstance> {
        self.instances.get(view).map(|entry| Arc::clone(entry.value()))
    }
}

impl fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRecord")
            .field("id", &self.id)
            .field("path", &self.pattern.as_str())
            .field("name", &self.name)
            .field("views", &self.views.iter().map(|(v, _)| v).collect::<Vec<_>>())
            .field("before_enter", &self.before_enter.len())
            .field("redirect", &self.redirect)
            .finish()
    }
}
