//! Payloads exchanged with the points API by the member storefront.

use serde::{Deserialize, Serialize};

use campus_points_core::{OrderId, OrgId, OrgPrefix, Product, UserId};

/// `user` object returned by member login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUser {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub asu_id: Option<String>,
    #[serde(default)]
    pub discord_linked: bool,
}

/// `organization` object returned by member login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberOrg {
    pub id: OrgId,
    pub name: String,
    pub prefix: OrgPrefix,
}

/// Body of `POST /api/points/{org}/member_login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberLoginRequest {
    pub name: String,
    pub asu_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_standing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: MemberUser,
    pub organization: MemberOrg,
}

/// Body of `GET /api/points/{org}/member_profile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberProfile {
    #[serde(default)]
    pub user: Option<ProfileUser>,
    #[serde(default)]
    pub current_organization: Option<CurrentOrganization>,
    #[serde(default)]
    pub organizations: Vec<OrgMembership>,
    #[serde(default)]
    pub total_points_all_orgs: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub asu_id: Option<String>,
    #[serde(default)]
    pub discord_linked: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentOrganization {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub points: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrgMembership {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub is_current: bool,
}

/// Body of `GET /api/merch/{org}/store` and its members variant.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreCatalog {
    pub organization: StoreOrganization,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl StoreCatalog {
    /// Find a product by id.
    #[must_use]
    pub fn product(&self, id: campus_points_core::ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreOrganization {
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response to a successful member order.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacedOrder {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<OrderId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_login_request_omits_blank_optionals() {
        let request = MemberLoginRequest {
            name: "Sparky".to_string(),
            asu_id: "1200000000".to_string(),
            ..MemberLoginRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "Sparky", "asu_id": "1200000000"})
        );
    }

    #[test]
    fn test_login_response() {
        let response: LoginResponse = serde_json::from_value(json!({
            "message": "Login successful",
            "user": {"id": 7, "name": "Sparky", "username": null, "email": "s@asu.edu",
                     "asu_id": "1200000000", "discord_linked": false},
            "organization": {"id": 1, "name": "ACM", "prefix": "acm"}
        }))
        .unwrap();
        assert_eq!(response.user.id, UserId::new(7));
        assert_eq!(response.organization.prefix.as_str(), "acm");
    }

    #[test]
    fn test_store_catalog_lookup() {
        let catalog: StoreCatalog = serde_json::from_value(json!({
            "organization": {"name": "ACM", "prefix": "acm", "description": null},
            "products": [{"id": 3, "name": "Shirt", "price": 15.0, "stock": 2,
                          "description": null, "image_url": null}],
            "user_info": {"is_member": true}
        }))
        .unwrap();
        let shirt = catalog.product(campus_points_core::ProductId::new(3)).unwrap();
        assert_eq!(shirt.price.plain(), "15.00");
        assert!(catalog.product(campus_points_core::ProductId::new(4)).is_none());
    }
}
