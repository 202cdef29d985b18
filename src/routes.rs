//! Route table, auth guard and navigation items.
//!
//! DESIGN
//! ======
//! Every route carries an [`AuthRequirement`]. [`decide`] is the whole guard
//! as a pure function of requirement and auth status; [`RouteGuard`] just
//! feeds it the live status and re-runs it when the status changes.
//!
//! `Unknown` status always yields [`GuardDecision::Loading`]: nothing is
//! rendered or redirected until the session lookup has resolved.

use std::fmt;

use tokio::sync::watch;

use crate::state::auth::{AuthState, AuthStatus};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    AllPosts,
    AddPost,
    EditPost(String),
    Post(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    Public,
    /// Signed-in users only.
    Required,
    /// Signed-out users only.
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    Render,
    Redirect(Route),
}

impl Route {
    /// Parse an app path. Query strings, fragments and a trailing slash are
    /// ignored; unknown paths are `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => path.starts_with('/').then_some(Self::Home),
            ["login"] => Some(Self::Login),
            ["signup"] => Some(Self::Signup),
            ["all-posts"] => Some(Self::AllPosts),
            ["add-post"] => Some(Self::AddPost),
            ["edit-post", slug] if !slug.is_empty() => Some(Self::EditPost((*slug).to_owned())),
            ["post", slug] if !slug.is_empty() => Some(Self::Post((*slug).to_owned())),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Login => "/login".into(),
            Self::Signup => "/signup".into(),
            Self::AllPosts => "/all-posts".into(),
            Self::AddPost => "/add-post".into(),
            Self::EditPost(slug) => format!("/edit-post/{slug}"),
            Self::Post(slug) => format!("/post/{slug}"),
        }
    }

    #[must_use]
    pub fn requirement(&self) -> AuthRequirement {
        match self {
            Self::Home | Self::Post(_) => AuthRequirement::Public,
            Self::Login | Self::Signup => AuthRequirement::Forbidden,
            Self::AllPosts | Self::AddPost | Self::EditPost(_) => AuthRequirement::Required,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[must_use]
pub fn decide(requirement: AuthRequirement, status: &AuthStatus) -> GuardDecision {
    match (requirement, status) {
        (_, AuthStatus::Unknown) => GuardDecision::Loading,
        (AuthRequirement::Required, AuthStatus::Unauthenticated) => GuardDecision::Redirect(Route::Login),
        (AuthRequirement::Forbidden, AuthStatus::Authenticated(_)) => GuardDecision::Redirect(Route::Home),
        _ => GuardDecision::Render,
    }
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Clone, Debug)]
pub struct RouteGuard {
    auth: AuthState,
}

impl RouteGuard {
    #[must_use]
    pub fn new(auth: AuthState) -> Self {
        Self { auth }
    }

    /// Decision for the current status, `Loading` included.
    #[must_use]
    pub fn check(&self, route: &Route) -> GuardDecision {
        decide(route.requirement(), &self.auth.status())
    }

    /// Wait out `Unknown`, then decide.
    pub async fn resolve(&self, route: &Route) -> GuardDecision {
        let mut rx = self.auth.subscribe();
        // The sender lives as long as `self.auth`, so this only fails if the
        // state is torn down underneath us; fall back to the current value.
        let status = match rx.wait_for(AuthStatus::is_known).await {
            Ok(status) => status.clone(),
            Err(_) => self.auth.status(),
        };
        decide(route.requirement(), &status)
    }

    /// Follow `route` across auth changes.
    #[must_use]
    pub fn watch(&self, route: Route) -> GuardWatch {
        GuardWatch { route, rx: self.auth.subscribe() }
    }
}

/// Stream of guard decisions for one route.
#[derive(Debug)]
pub struct GuardWatch {
    route: Route,
    rx: watch::Receiver<AuthStatus>,
}

impl GuardWatch {
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Decision for the status as last seen.
    #[must_use]
    pub fn current(&mut self) -> GuardDecision {
        decide(self.route.requirement(), &self.rx.borrow_and_update())
    }

    /// Next decision after an auth change. `None` once the state is gone.
    pub async fn next(&mut self) -> Option<GuardDecision> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    Route(Route),
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub target: NavTarget,
}

impl NavItem {
    fn route(label: &'static str, route: Route) -> Self {
        Self { label, target: NavTarget::Route(route) }
    }
}

/// Header entries for `status`. Only Home is shown while loading.
#[must_use]
pub fn nav_items(status: &AuthStatus) -> Vec<NavItem> {
    let mut items = vec![NavItem::route("Home", Route::Home)];
    match status {
        AuthStatus::Unknown => {}
        AuthStatus::Unauthenticated => {
            items.push(NavItem::route("Login", Route::Login));
            items.push(NavItem::route("Signup", Route::Signup));
        }
        AuthStatus::Authenticated(_) => {
            items.push(NavItem::route("All Posts", Route::AllPosts));
            items.push(NavItem::route("Add Post", Route::AddPost));
            items.push(NavItem { label: "Logout", target: NavTarget::Logout });
        }
    }
    items
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
