use serde::{Deserialize, Serialize};

use super::common::de_string_or_number;
use crate::api::Resource;

/// Organisational service (department).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgService {
    pub id: i64,
    #[serde(default, deserialize_with = "de_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub responsable_nom: Option<String>,
    #[serde(default)]
    pub parent_nom: Option<String>,
    #[serde(default)]
    pub nb_projets: u64,
}

impl Resource for OrgService {
    const COLLECTION: &'static str = "service_org";
    const KIND: &'static str = "Service";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrgServiceInput {
    pub code: Option<String>,
    pub nom: String,
}
