use serde::{Deserialize, Serialize};

use super::common::{de_flag, de_opt_id};
use crate::api::Resource;

/// Role that unlocks user administration.
pub const ADMIN_ROLE: &str = "admin";

/// Identity of the signed-in user, from the token claims or the login answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDescriptor {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub role: String,
}

impl UserDescriptor {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// `Marie Dupont (admin)`
    pub fn display_name(&self) -> String {
        let name = [self.prenom.as_deref(), self.nom.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let name = if name.is_empty() {
            self.login.clone().unwrap_or_default()
        } else {
            name
        };
        if self.role.is_empty() {
            name
        } else {
            format!("{} ({})", name, self.role)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: UserDescriptor,
}

/// Account as listed by the administration view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub service_id: Option<i64>,
    #[serde(default, deserialize_with = "de_flag")]
    pub actif: bool,
}

impl Resource for AdminUser {
    const COLLECTION: &'static str = "users";
    const KIND: &'static str = "Utilisateur";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Create/update body. The password is only sent when set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserInput {
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mot_de_passe: Option<String>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub service_id: Option<i64>,
    pub actif: bool,
}

/// Role preselected in the new-user form.
pub const DEFAULT_USER_ROLE: &str = "lecteur";

impl UserInput {
    /// Blank new-user form: reader role, active.
    pub fn new_account() -> Self {
        Self {
            role: DEFAULT_USER_ROLE.to_string(),
            actif: true,
            ..Default::default()
        }
    }
}

/// Edit form. The password field always starts empty.
impl From<&AdminUser> for UserInput {
    fn from(user: &AdminUser) -> Self {
        Self {
            login: user.login.clone().unwrap_or_default(),
            mot_de_passe: None,
            nom: user.nom.clone(),
            prenom: user.prenom.clone(),
            email: user.email.clone(),
            role: user
                .role
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_ROLE.to_string()),
            service_id: user.service_id,
            actif: user.actif,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleRequest {
    pub actif: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let user = UserDescriptor {
            login: Some("mdupont".to_string()),
            nom: Some("Dupont".to_string()),
            prenom: Some("Marie".to_string()),
            role: "admin".to_string(),
        };
        assert_eq!(user.display_name(), "Marie Dupont (admin)");
        assert!(user.is_admin());

        let bare = UserDescriptor {
            login: Some("jdoe".to_string()),
            ..Default::default()
        };
        assert_eq!(bare.display_name(), "jdoe");
        assert!(!bare.is_admin());
    }

    #[test]
    fn test_password_omitted_when_unset() {
        let body = serde_json::to_value(UserInput {
            login: "x".to_string(),
            role: "lecteur".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(body.get("mot_de_passe").is_none());
    }
}
