//! Boundary to the route-guard collaborator.

/// Observer for session teardown. The API client clears the credential
/// store first and then calls [`session_expired`](Self::session_expired),
/// so implementations only need to handle navigation back to the login
/// surface. The nominal error path of the operation that hit the 401 is
/// never reached.
pub trait SessionGuard: Send + Sync {
    fn session_expired(&self);
}

/// Guard that swallows the notification. Useful where no login surface
/// exists to navigate to.
pub struct NullGuard;

impl SessionGuard for NullGuard {
    fn session_expired(&self) {}
}
