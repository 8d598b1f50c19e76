use serde::{Deserialize, Serialize};

use crate::api::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub fonction: Option<String>,
    #[serde(default, rename = "type")]
    pub contact_type: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub organisation: Option<String>,
    #[serde(default)]
    pub service_nom: Option<String>,
}

impl Resource for Contact {
    const COLLECTION: &'static str = "contact";
    const KIND: &'static str = "Contact";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Server-side filters of the contact list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFilter {
    pub contact_type: Option<String>,
    pub search: Option<String>,
}

impl ContactFilter {
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(t) = self.contact_type.as_deref().filter(|t| !t.is_empty()) {
            query.push(("type".to_string(), t.to_string()));
        }
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), s.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactInput {
    pub nom: String,
    pub prenom: Option<String>,
    pub fonction: Option<String>,
    #[serde(rename = "type")]
    pub contact_type: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub organisation: Option<String>,
}

impl From<&Contact> for ContactInput {
    fn from(contact: &Contact) -> Self {
        Self {
            nom: contact.nom.clone().unwrap_or_default(),
            prenom: contact.prenom.clone(),
            fonction: contact.fonction.clone(),
            contact_type: contact.contact_type.clone(),
            telephone: contact.telephone.clone(),
            email: contact.email.clone(),
            organisation: contact.organisation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_query() {
        let filter = ContactFilter {
            contact_type: Some("EXTERNE".to_string()),
            search: None,
        };
        assert_eq!(filter.query(), vec![("type".to_string(), "EXTERNE".to_string())]);
        assert!(ContactFilter::default().query().is_empty());
    }

    #[test]
    fn test_type_field_rename() {
        let contact: Contact =
            serde_json::from_str(r#"{"id": 1, "nom": "Martin", "type": "INTERNE"}"#).unwrap();
        assert_eq!(contact.contact_type.as_deref(), Some("INTERNE"));
        let body = serde_json::to_value(ContactInput::from(&contact)).unwrap();
        assert_eq!(body["type"], "INTERNE");
    }
}
