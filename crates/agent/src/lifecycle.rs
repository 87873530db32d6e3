//! Agent lifecycle state machine.
//!
//! The install/activate/fetch pattern is a small state machine. Transitions
//! are explicit typed events; an event that is not legal in the current
//! state is an error rather than a silent no-op.

use shellcache_core::Error;

/// Agent lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Initial state, nothing cached yet for this version
    Uninstalled,
    /// Install event in progress (shell being pre-cached)
    Installing,
    /// Installed successfully, waiting to activate
    Installed,
    /// Activate event in progress (stale namespaces being purged)
    Activating,
    /// Active and controlling clients
    Active,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Uninstalled => "uninstalled",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    BeginInstall,
    FinishInstall,
    BeginActivate,
    FinishActivate,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::BeginInstall => "begin install",
            LifecycleEvent::FinishInstall => "finish install",
            LifecycleEvent::BeginActivate => "begin activate",
            LifecycleEvent::FinishActivate => "finish activate",
        }
    }
}

/// Tracks the agent's position in the install → activate progression.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { state: LifecycleState::Uninstalled }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Apply an event, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if the event is not legal in the
    /// current state (e.g. activating before install completes).
    pub fn apply(&mut self, event: LifecycleEvent) -> Result<LifecycleState, Error> {
        use LifecycleEvent::*;
        use LifecycleState::*;

        let next = match (self.state, event) {
            (Uninstalled, BeginInstall) => Installing,
            (Installing, FinishInstall) => Installed,
            (Installed, BeginActivate) => Activating,
            (Activating, FinishActivate) => Active,
            (state, event) => {
                return Err(Error::InvalidTransition { state: state.as_str(), event: event.as_str() });
            }
        };

        self.state = next;
        Ok(next)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_progression() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Uninstalled);

        assert_eq!(lifecycle.apply(LifecycleEvent::BeginInstall).unwrap(), LifecycleState::Installing);
        assert_eq!(lifecycle.apply(LifecycleEvent::FinishInstall).unwrap(), LifecycleState::Installed);
        assert_eq!(lifecycle.apply(LifecycleEvent::BeginActivate).unwrap(), LifecycleState::Activating);
        assert_eq!(lifecycle.apply(LifecycleEvent::FinishActivate).unwrap(), LifecycleState::Active);
    }

    #[test]
    fn test_activate_before_install() {
        let mut lifecycle = Lifecycle::new();
        let result = lifecycle.apply(LifecycleEvent::BeginActivate);
        assert!(matches!(result, Err(Error::InvalidTransition { state: "uninstalled", event: "begin activate" })));
        assert_eq!(lifecycle.state(), LifecycleState::Uninstalled);
    }

    #[test]
    fn test_double_install() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.apply(LifecycleEvent::BeginInstall).unwrap();
        let result = lifecycle.apply(LifecycleEvent::BeginInstall);
        assert!(result.is_err());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LifecycleState::Active.to_string(), "active");
        assert_eq!(LifecycleState::Uninstalled.to_string(), "uninstalled");
    }
}
