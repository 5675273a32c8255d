//! Authenticated principal issued by the identity provider.

/// An identity verified by the auth service.
///
/// The provider owns these; the session store and controllers only ever
/// hold a shared reference (`Arc<Identity>`), never a copy they mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned user ID
    pub uid: String,
    /// Email address (may be absent for some sign-in methods)
    pub email: Option<String>,
    /// Display name, if the provider has one
    pub display_name: Option<String>,
}
