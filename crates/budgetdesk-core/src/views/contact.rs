//! Contacts, filtered server side by type and search text.

use crate::app::{Console, View};
use crate::error::ConsoleError;
use crate::models::{Contact, ContactFilter, ContactInput};
use crate::ui::{Modal, Row, Table};
use crate::utils::or_placeholder;

use super::non_empty;

impl Console {
    pub async fn load_contacts(&mut self) -> Result<(), ConsoleError> {
        let query = self.filters.contacts.query();
        let contacts = match self.api.list::<Contact>(query).await {
            Ok(contacts) => contacts,
            Err(e) => return self.load_failed("contacts", e),
        };
        self.caches.contacts.replace(contacts);

        let rows = self
            .caches
            .contacts
            .items()
            .iter()
            .map(|c| {
                Row::new(
                    c.id,
                    vec![
                        c.id.to_string(),
                        or_placeholder(c.nom.as_deref()),
                        or_placeholder(c.prenom.as_deref()),
                        or_placeholder(c.fonction.as_deref()),
                        or_placeholder(c.contact_type.as_deref()),
                        or_placeholder(c.telephone.as_deref()),
                        or_placeholder(c.email.as_deref()),
                        or_placeholder(
                            non_empty(c.organisation.as_deref()).or(c.service_nom.as_deref()),
                        ),
                    ],
                )
                .with_actions(vec!["Modifier", "Suppr."])
            })
            .collect();
        self.sink.render_table(&Table::new(
            View::Contacts,
            vec![
                "ID", "Nom", "Prénom", "Fonction", "Type", "Téléphone", "Email", "Organisation",
            ],
            rows,
        ));
        Ok(())
    }

    pub async fn set_contact_filter(&mut self, filter: ContactFilter) -> Result<(), ConsoleError> {
        self.filters.contacts = filter;
        self.load_contacts().await
    }

    pub async fn create_contact(&mut self, input: ContactInput) -> Result<(), ConsoleError> {
        self.require(&input.nom, "Le nom est obligatoire")?;
        let outcome = self.api.create::<Contact, _>(&input).await;
        self.settle(outcome, "Contact ajouté")?;
        let reload = self.load_contacts().await;
        self.reloaded(reload)
    }

    pub fn edit_contact(&mut self, id: i64) -> Result<ContactInput, ConsoleError> {
        let input = match self.caches.contacts.find(id) {
            Ok(contact) => ContactInput::from(contact),
            Err(e) => return self.fail(e),
        };
        self.open_modal(Modal::EditContact);
        Ok(input)
    }

    pub async fn save_contact(&mut self, id: i64, mut input: ContactInput) -> Result<(), ConsoleError> {
        self.require(&input.nom, "Le nom est obligatoire")?;
        input.contact_type = input.contact_type.filter(|t| !t.trim().is_empty());

        let outcome = self.api.update::<Contact, _>(id, &input).await;
        self.settle(outcome, "Contact mis à jour")?;
        self.close_modal(Modal::EditContact);
        let reload = self.load_contacts().await;
        self.reloaded(reload)
    }

    pub async fn delete_contact(&mut self, id: i64) -> Result<(), ConsoleError> {
        let outcome = self.api.remove::<Contact>(id).await;
        self.settle(outcome, "Contact supprimé")?;
        let reload = self.load_contacts().await;
        self.reloaded(reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::testing::signed_in;
    use serde_json::json;

    #[tokio::test]
    async fn test_filter_sent_as_query() {
        let (mut console, transport, sink, _) = signed_in("lecteur");
        transport.respond(
            Method::Get,
            "/contact",
            200,
            json!({"list": [
                {"id": 1, "nom": "Martin", "type": "EXTERNE", "organisation": ""},
                {"id": 2, "nom": "Durand", "type": "INTERNE", "service_nom": "SI", "organisation": "Mairie"}
            ]}),
        );

        console
            .set_contact_filter(ContactFilter {
                contact_type: Some("EXTERNE".to_string()),
                search: Some("mar".to_string()),
            })
            .await
            .unwrap();
        let sent = transport.calls(Method::Get, "/contact");
        assert_eq!(
            sent[0].query,
            vec![
                ("type".to_string(), "EXTERNE".to_string()),
                ("search".to_string(), "mar".to_string())
            ]
        );
        let table = sink.tables(View::Contacts).pop().unwrap();
        assert_eq!(table.rows[0].cells[7], "-");
        assert_eq!(table.rows[1].cells[7], "Mairie");
    }

    #[tokio::test]
    async fn test_save_sends_null_for_blank_type() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond(Method::Get, "/contact", 200, json!({"list": [{"id": 1, "nom": "Martin"}]}));
        transport.respond(Method::Put, "/contact/1", 200, json!({"success": true}));
        console.load_contacts().await.unwrap();

        let mut input = console.edit_contact(1).unwrap();
        input.contact_type = Some(" ".to_string());
        console.save_contact(1, input).await.unwrap();

        let body = transport.calls(Method::Put, "/contact/1")[0].body.clone().unwrap();
        assert_eq!(body["type"], json!(null));
        assert_eq!(sink.last_banner().unwrap().text, "Contact mis à jour");
        assert!(console.modals().is_empty());
    }

    #[tokio::test]
    async fn test_empty_mutation_body_is_generic_failure() {
        let (mut console, transport, sink, _) = signed_in("gestionnaire");
        transport.respond_raw(Method::Delete, "/contact/1", 200, "");

        let err = console.delete_contact(1).await.unwrap_err();
        assert_eq!(err.to_string(), "Erreur");
        assert!(sink.last_banner().unwrap().is_error());
        assert!(transport.calls(Method::Get, "/contact").is_empty());
    }
}
