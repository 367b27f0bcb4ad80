//! Routes and the navigation fabric the screens talk to

use crate::{FloodcastError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Query parameters attached to a route
pub type RouteParams = BTreeMap<String, String>;

/// Screens reachable in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePath {
    Home,
    Map,
    Location,
}

impl RoutePath {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutePath::Home => "/",
            RoutePath::Map => "/map",
            RoutePath::Location => "/location",
        }
    }

    fn parse(path: &str) -> Option<Self> {
        match path {
            "/" | "" => Some(RoutePath::Home),
            "/map" => Some(RoutePath::Map),
            "/location" => Some(RoutePath::Location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: RoutePath,
    pub params: RouteParams,
}

impl Route {
    #[must_use]
    pub fn new(path: RoutePath) -> Self {
        Self {
            path,
            params: RouteParams::new(),
        }
    }

    #[must_use]
    pub fn home() -> Self {
        Self::new(RoutePath::Home)
    }

    #[must_use]
    pub fn map() -> Self {
        Self::new(RoutePath::Map)
    }

    #[must_use]
    pub fn location() -> Self {
        Self::new(RoutePath::Location)
    }

    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Render as a URL path with percent-encoded query parameters
    #[must_use]
    pub fn to_url(&self) -> String {
        if self.params.is_empty() {
            return self.path.as_str().to_string();
        }
        let query: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.path.as_str(), query.join("&"))
    }

    /// Parse a URL produced by [`Route::to_url`] or typed by hand
    pub fn parse(url: &str) -> Result<Self> {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let path = RoutePath::parse(path)
            .ok_or_else(|| FloodcastError::validation(format!("unknown route '{path}'")))?;

        let mut params = RouteParams::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key)
                .map_err(|e| FloodcastError::validation(format!("bad query key: {e}")))?;
            let value = urlencoding::decode(value)
                .map_err(|e| FloodcastError::validation(format!("bad query value: {e}")))?;
            params.insert(key.into_owned(), value.into_owned());
        }

        Ok(Self { path, params })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// Navigation stack the screens push to and replace on
pub trait NavigationFabric: Send + Sync {
    fn push(&self, route: Route);
    fn replace(&self, route: Route);
    /// Route currently on top of the stack
    fn current_route(&self) -> Route;
    /// Parameters of the current route
    fn current_params(&self) -> RouteParams {
        self.current_route().params
    }
}

/// In-memory navigation stack
#[derive(Debug)]
pub struct MemoryNavigator {
    stack: Mutex<Vec<Route>>,
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Route::home())
    }
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        Self {
            stack: Mutex::new(vec![initial]),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Route>> {
        self.stack.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    /// Pop the top route, keeping at least the root
    pub fn back(&self) -> Option<Route> {
        let mut stack = self.lock();
        if stack.len() > 1 { stack.pop() } else { None }
    }
}

impl NavigationFabric for MemoryNavigator {
    fn push(&self, route: Route) {
        debug!("push {}", route);
        self.lock().push(route);
    }

    fn replace(&self, route: Route) {
        debug!("replace with {}", route);
        let mut stack = self.lock();
        stack.pop();
        stack.push(route);
    }

    fn current_route(&self) -> Route {
        self.lock().last().cloned().unwrap_or_else(Route::home)
    }
}
