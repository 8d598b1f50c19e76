//! Organisational services.

use crate::app::{Console, View};
use crate::error::ConsoleError;
use crate::models::{OrgService, OrgServiceInput};
use crate::ui::{Row, Table};
use crate::utils::or_placeholder;

impl Console {
    pub async fn load_services(&mut self) -> Result<(), ConsoleError> {
        let services = match self.api.list::<OrgService>(Vec::new()).await {
            Ok(services) => services,
            Err(e) => return self.load_failed("services", e),
        };
        self.caches.services.replace(services);

        let rows = self
            .caches
            .services
            .items()
            .iter()
            .map(|s| {
                Row::new(
                    s.id,
                    vec![
                        s.id.to_string(),
                        or_placeholder(s.code.as_deref()),
                        or_placeholder(s.nom.as_deref()),
                        or_placeholder(s.responsable_nom.as_deref()),
                        or_placeholder(s.parent_nom.as_deref()),
                        s.nb_projets.to_string(),
                    ],
                )
                .with_actions(vec!["Suppr."])
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Services,
            vec!["ID", "Code", "Nom", "Responsable", "Parent", "Projets"],
            rows,
        ));
        Ok(())
    }

    /// Services feed the project selectors, so references follow.
    pub async fn create_service(&mut self, input: OrgServiceInput) -> Result<(), ConsoleError> {
        self.require(&input.nom, "Le nom est obligatoire")?;
        let outcome = self.api.create::<OrgService, _>(&input).await;
        self.settle(outcome, "Service ajouté")?;
        let reload = self.load_services().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }

    pub async fn delete_service(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<OrgService>(id).await;
        self.settle(outcome, "Service supprimé")?;
        let reload = self.load_services().await;
        self.refresh_references().await;
        self.reloaded(reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::testing::{references, signed_in};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_service_refreshes_references() {
        let (mut console, transport, sink, _) = signed_in("admin");
        transport.respond(Method::Post, "/service_org", 200, json!({"success": true}));
        transport.respond(
            Method::Get,
            "/service_org",
            200,
            json!({"list": [{"id": 40, "code": "SI", "nom": "Service info", "nb_projets": 2}]}),
        );
        transport.respond(Method::Get, "/referentiels", 200, references());

        console
            .create_service(OrgServiceInput {
                code: Some("SI".to_string()),
                nom: "Service info".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(sink.last_banner().unwrap().text, "Service ajouté");
        let table = sink.tables(View::Services).pop().unwrap();
        assert_eq!(table.rows[0].cells[5], "2");
        assert_eq!(transport.calls(Method::Get, "/referentiels").len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let (mut console, transport, _, _) = signed_in("admin");
        assert!(console.create_service(OrgServiceInput::default()).await.is_err());
        assert!(transport.requests().is_empty());
    }
}
