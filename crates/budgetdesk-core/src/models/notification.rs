use serde::Deserialize;

use super::common::{de_flag, de_string_or_number};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "de_string_or_number")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub lue: bool,
    #[serde(default)]
    pub date_creation: Option<String>,
}

/// `GET /notifications`: latest notifications and the unread count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFeed {
    #[serde(default)]
    pub list: Vec<Notification>,
    #[serde(default)]
    pub non_lues: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_defaults() {
        let feed: NotificationFeed = serde_json::from_str("{}").unwrap();
        assert!(feed.list.is_empty());
        assert_eq!(feed.non_lues, 0);

        let feed: NotificationFeed = serde_json::from_str(
            r#"{"list": [{"id": 1, "titre": "Contrat expiré", "lue": 0}], "non_lues": 1}"#,
        )
        .unwrap();
        assert!(!feed.list[0].lue);
    }
}
