use crate::common::Identity;

/// Holds the identity of the locally authenticated user for one chat view.
///
/// The current-user fetch is the only writer and the message sink the only
/// reader. Both run on the UI thread, so a plain `Option` is enough.
#[derive(Debug, Default)]
pub struct SessionContext {
    identity: Option<Identity>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Stores the identity unless one is already set. Returns whether the
    /// value was accepted.
    pub fn set(&mut self, identity: Identity) -> bool {
        if let Some(current) = &self.identity {
            log::warn!(
                "Ignoring identity `{}`; session already belongs to `{}`",
                identity.id,
                current.id
            );
            return false;
        }
        log::info!("Session identity resolved: {}", identity.name);
        self.identity = Some(identity);
        true
    }

    /// Forgets the identity when the chat view is left or reloaded.
    pub fn reset(&mut self) {
        self.identity = None;
    }

    /// Whether `sender` names the local user. An unset context never
    /// matches, so nothing is attributed to the user before the fetch lands.
    pub fn is_own(&self, sender: &str) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.matches(sender))
    }
}
