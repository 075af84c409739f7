use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Simulation,
    /// Multi-team dashboard.
    Ask,
    /// Single-team ask panel.
    Backend,
}

impl Route {
    pub const FALLBACK: Route = Route::Ask;

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Simulation => "/simulation",
            Route::Ask => "/ask",
            Route::Backend => "/backend",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed {
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/simulation" => Some(Route::Simulation),
            "/ask" => Some(Route::Ask),
            "/backend" => Some(Route::Backend),
            _ => None,
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Simulation | Route::Ask | Route::Backend)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Render(Route),
    Redirect(Route),
}

impl GateDecision {
    pub fn route(self) -> Route {
        match self {
            GateDecision::Render(r) | GateDecision::Redirect(r) => r,
        }
    }
}

/// Decides what a navigation to `path` shows. Unknown paths go to the
/// fallback route, and a protected route without a session goes to login
/// before anything protected is rendered.
pub fn resolve(path: &str, session: Option<&Session>) -> GateDecision {
    match Route::from_path(path) {
        Some(route) => guard(route, session),
        None => GateDecision::Redirect(guard(Route::FALLBACK, session).route()),
    }
}

pub fn guard(route: Route, session: Option<&Session>) -> GateDecision {
    if route.is_protected() && session.is_none() {
        GateDecision::Redirect(Route::Login)
    } else {
        GateDecision::Render(route)
    }
}
