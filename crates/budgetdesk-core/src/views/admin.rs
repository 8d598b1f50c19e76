//! User administration, gated on the `admin` role.
//!
//! The `/users` endpoints answer with the entity itself rather than
//! `{success}`, so their mutations are read leniently.

use tracing::warn;

use crate::api::{ApiError, Resource};
use crate::app::{Console, View};
use crate::error::ConsoleError;
use crate::models::{AdminUser, MutationOutcome, OrgService, ToggleRequest, UserInput};
use crate::ui::{Modal, Row, Table};
use crate::utils::or_placeholder;

use super::non_empty;

const CREDENTIALS_REQUIRED: &str = "Login et mot de passe obligatoires";

impl Console {
    /// Client-side role gate; the server enforces its own.
    pub fn ensure_admin(&self) -> Result<(), ConsoleError> {
        if self.is_admin() {
            Ok(())
        } else {
            self.fail(ConsoleError::AdminOnly)
        }
    }

    fn settle_lenient(
        &self,
        outcome: Result<MutationOutcome, ApiError>,
        success: &str,
    ) -> Result<MutationOutcome, ConsoleError> {
        match outcome
            .map_err(ConsoleError::from)
            .and_then(MutationOutcome::into_lenient_result)
        {
            Ok(outcome) => {
                self.notify_success(success);
                Ok(outcome)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Accounts and services are fetched together; the service column is
    /// resolved against the second list.
    pub async fn load_users(&mut self) -> Result<(), ConsoleError> {
        self.ensure_admin()?;
        let api = &self.api;
        let fetched = tokio::try_join!(
            api.list::<AdminUser>(Vec::new()),
            api.list::<OrgService>(Vec::new()),
        );
        let (users, services) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "User administration load failed");
                let err = ConsoleError::from(e);
                self.sink.banner(
                    &self
                        .notifier
                        .error(format!("Erreur chargement utilisateurs: {}", err)),
                );
                return Err(err);
            }
        };
        self.caches.services.replace(services);
        self.caches.users.replace(users);

        let rows = self
            .caches
            .users
            .items()
            .iter()
            .map(|u| {
                let service = match u.service_id {
                    Some(id) => self
                        .caches
                        .services
                        .find(id)
                        .ok()
                        .and_then(|s| s.nom.clone())
                        .unwrap_or_else(|| id.to_string()),
                    None => "Global".to_string(),
                };
                Row::new(
                    u.id,
                    vec![
                        or_placeholder(u.nom.as_deref()),
                        or_placeholder(u.prenom.as_deref()),
                        or_placeholder(u.login.as_deref()),
                        or_placeholder(u.email.as_deref()),
                        or_placeholder(u.role.as_deref()),
                        service,
                        if u.actif { "✓" } else { "✗" }.to_string(),
                    ],
                )
                .with_actions(vec![
                    "Modifier",
                    if u.actif { "Désactiver" } else { "Activer" },
                    "Suppr.",
                ])
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Admin,
            vec!["Nom", "Prénom", "Login", "Email", "Rôle", "Service", "Actif"],
            rows,
        ));
        Ok(())
    }

    pub fn open_new_user(&mut self) -> Result<UserInput, ConsoleError> {
        self.ensure_admin()?;
        self.open_modal(Modal::AddUser);
        Ok(UserInput::new_account())
    }

    pub async fn create_user(&mut self, mut input: UserInput) -> Result<(), ConsoleError> {
        self.ensure_admin()?;
        input.login = input.login.trim().to_string();
        let has_password = non_empty(input.mot_de_passe.as_deref()).is_some();
        if input.login.is_empty() || !has_password {
            return self.fail(ConsoleError::validation(CREDENTIALS_REQUIRED));
        }
        input.actif = true;

        let outcome = self.api.create::<AdminUser, _>(&input).await;
        self.settle_lenient(outcome, "Utilisateur créé")?;
        self.close_modal(Modal::AddUser);
        let reload = self.load_users().await;
        self.reloaded(reload)
    }

    pub fn edit_user(&mut self, id: i64) -> Result<UserInput, ConsoleError> {
        self.ensure_admin()?;
        let input = match self.caches.users.find(id) {
            Ok(user) => UserInput::from(user),
            Err(e) => return self.fail(e),
        };
        self.open_modal(Modal::EditUser);
        Ok(input)
    }

    /// A blank password leaves the stored one unchanged.
    pub async fn save_user(&mut self, id: i64, mut input: UserInput) -> Result<(), ConsoleError> {
        self.ensure_admin()?;
        input.login = input.login.trim().to_string();
        input.mot_de_passe = input.mot_de_passe.filter(|p| !p.is_empty());

        let outcome = self.api.update::<AdminUser, _>(id, &input).await;
        self.settle_lenient(outcome, "Utilisateur mis à jour")?;
        self.close_modal(Modal::EditUser);
        let reload = self.load_users().await;
        self.reloaded(reload)
    }

    pub async fn toggle_user(&mut self, id: i64, actif: bool) -> Result<(), ConsoleError> {
        self.ensure_admin()?;
        let path = format!("/{}/{}/toggle", AdminUser::COLLECTION, id);
        let outcome = self.api.post(&path, &ToggleRequest { actif }).await;
        let message = if actif { "Compte activé" } else { "Compte désactivé" };
        self.settle_lenient(outcome, message)?;
        let reload = self.load_users().await;
        self.reloaded(reload)
    }

    pub async fn delete_user(&mut self, id: i64) -> Result<(), ConsoleError> {
        self.ensure_admin()?;
        let outcome = self.api.remove::<AdminUser>(id).await;
        self.settle_lenient(outcome, "Utilisateur supprimé")?;
        let reload = self.load_users().await;
        self.reloaded(reload)
    }
}
