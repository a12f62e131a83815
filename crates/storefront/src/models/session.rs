//! Member session state.
//!
//! Everything the storefront remembers about a browser lives here: the
//! form-login identity, the per-organization cart, the last store visited, the
//! pending OAuth organization and one-shot flash notices.
//!
//! A fresh session is empty. Logout clears the identity and the current org's
//! cart; moving to another organization's store clears the previous org's
//! cart.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use campus_points_core::{Cart, Flash, OrgPrefix};

use crate::api::{MemberOrg, MemberUser};

/// Session keys.
pub mod keys {
    /// Form-login user (`user` object of the login response).
    pub const MEMBER_USER: &str = "memberUser";

    /// Organization the member logged in to.
    pub const MEMBER_ORG: &str = "memberOrg";

    /// Organization prefix stashed before redirecting to the OAuth provider.
    pub const PENDING_MEMBER_ORG: &str = "pendingMemberOrg";

    /// Prefix of the last store page rendered.
    pub const STORE_ORG: &str = "store_org";

    /// How the last store page load authenticated.
    pub const STORE_AUTH: &str = "store_auth";

    /// Pending flash notice.
    pub const FLASH: &str = "flash";

    /// Cart key for an organization.
    #[must_use]
    pub fn cart(org: &str) -> String {
        format!("cart_{org}")
    }
}

/// Form-login identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
    pub user: MemberUser,
    pub org: MemberOrg,
}

/// Outcome of auth reconciliation on a store page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreAuth {
    Member,
    Provider,
    Anonymous,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreAuthRecord {
    org: String,
    auth: StoreAuth,
}

/// Typed access to the member's session.
#[derive(Debug, Clone)]
pub struct MemberSession {
    session: Session,
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

impl MemberSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// The form-login identity, if both halves are present.
    pub async fn identity(&self) -> SessionResult<Option<MemberIdentity>> {
        let user = self.session.get::<MemberUser>(keys::MEMBER_USER).await?;
        let org = self.session.get::<MemberOrg>(keys::MEMBER_ORG).await?;
        Ok(user.zip(org).map(|(user, org)| MemberIdentity { user, org }))
    }

    pub async fn set_identity(&self, user: &MemberUser, org: &MemberOrg) -> SessionResult<()> {
        self.session.insert(keys::MEMBER_USER, user).await?;
        self.session.insert(keys::MEMBER_ORG, org).await
    }

    /// Logout: drop the identity, this org's cart and any recorded auth.
    pub async fn logout(&self, org: &OrgPrefix) -> SessionResult<()> {
        self.session.remove::<MemberUser>(keys::MEMBER_USER).await?;
        self.session.remove::<MemberOrg>(keys::MEMBER_ORG).await?;
        self.session
            .remove::<StoreAuthRecord>(keys::STORE_AUTH)
            .await?;
        self.clear_cart(org).await
    }

    pub async fn set_pending_org(&self, org: &OrgPrefix) -> SessionResult<()> {
        self.session
            .insert(keys::PENDING_MEMBER_ORG, org.as_str())
            .await
    }

    /// Take the organization stashed before the OAuth hand-off.
    pub async fn take_pending_org(&self) -> SessionResult<Option<String>> {
        self.session.remove(keys::PENDING_MEMBER_ORG).await
    }

    /// Record a visit to `org`'s store.
    ///
    /// Returns `true` when the previous store org differed, in which case its
    /// cart has been cleared.
    pub async fn enter_store(&self, org: &OrgPrefix) -> SessionResult<bool> {
        let previous = self.session.get::<String>(keys::STORE_ORG).await?;
        let switched = match previous.as_deref() {
            Some(prev) if prev != org.as_str() => {
                self.session.remove::<Cart>(&keys::cart(prev)).await?;
                true
            }
            _ => false,
        };
        self.session.insert(keys::STORE_ORG, org.as_str()).await?;
        Ok(switched)
    }

    pub async fn cart(&self, org: &OrgPrefix) -> SessionResult<Cart> {
        Ok(self
            .session
            .get::<Cart>(&keys::cart(org.as_str()))
            .await?
            .unwrap_or_default())
    }

    pub async fn save_cart(&self, org: &OrgPrefix, cart: &Cart) -> SessionResult<()> {
        if cart.is_empty() {
            return self.clear_cart(org).await;
        }
        self.session.insert(&keys::cart(org.as_str()), cart).await
    }

    pub async fn clear_cart(&self, org: &OrgPrefix) -> SessionResult<()> {
        self.session
            .remove::<Cart>(&keys::cart(org.as_str()))
            .await?;
        Ok(())
    }

    pub async fn set_store_auth(&self, org: &OrgPrefix, auth: StoreAuth) -> SessionResult<()> {
        let record = StoreAuthRecord {
            org: org.as_str().to_string(),
            auth,
        };
        self.session.insert(keys::STORE_AUTH, record).await
    }

    /// How the last page load for `org` authenticated.
    pub async fn store_auth(&self, org: &OrgPrefix) -> SessionResult<StoreAuth> {
        let record = self
            .session
            .get::<StoreAuthRecord>(keys::STORE_AUTH)
            .await?;
        Ok(record
            .filter(|r| r.org == org.as_str())
            .map_or(StoreAuth::Anonymous, |r| r.auth))
    }

    /// Queue a notice for the next rendered page.
    pub async fn flash(&self, flash: Flash) -> SessionResult<()> {
        self.session.insert(keys::FLASH, flash).await
    }

    /// Take the pending notice, if any. It will not be shown again.
    pub async fn take_flash(&self) -> SessionResult<Option<Flash>> {
        self.session.remove::<Flash>(keys::FLASH).await
    }
}

impl<S> FromRequestParts<S> for MemberSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self::new(session))
    }
}
