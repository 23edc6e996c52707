//! Public user profile model matching the frontend PublicUser interface.

use serde::{Deserialize, Serialize};

/// The public slice of an identity-provider account, written to the `users`
/// collection on every successful sign-in (merge semantics, keyed by uid).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    // The frontend spells this one photoURL, not photoUrl.
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}
