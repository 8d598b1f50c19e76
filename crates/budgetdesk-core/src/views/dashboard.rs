use serde_json::json;
use tracing::{debug, warn};

use crate::app::{Console, View};
use crate::error::ConsoleError;
use crate::models::{Dashboard, NotificationFeed};
use crate::ui::{Kpi, Row, Table};
use crate::utils::{format_amount, format_date, or_placeholder, PLACEHOLDER};

const DASHBOARD_PATH: &str = "/dashboard";
const NOTIFICATIONS_PATH: &str = "/notifications";

fn count(value: Option<u64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

impl Console {
    /// KPIs plus the most urgent contract alerts. Failures are logged only.
    pub async fn load_dashboard(&mut self) -> Result<(), ConsoleError> {
        let dashboard: Dashboard = match self.api.get(DASHBOARD_PATH).await {
            Ok(dashboard) => dashboard,
            Err(e) => {
                warn!(error = %e, "Dashboard load failed");
                return Err(e.into());
            }
        };

        let kpis = [
            Kpi::new("Projets", count(dashboard.kpi_projets)),
            Kpi::new("Budget", format_amount(dashboard.kpi_budget)),
            Kpi::new("Bons de commande", count(dashboard.kpi_bons_commande)),
            Kpi::new("Montant BC", format_amount(dashboard.kpi_montant_bc)),
            Kpi::new("Contrats", count(dashboard.kpi_contrats)),
            Kpi::new("Alertes contrats", count(dashboard.kpi_alertes_contrats)),
            Kpi::new("BC en attente", count(dashboard.kpi_bc_attente)),
        ];
        self.sink.render_kpis(View::Dashboard, &kpis);

        let rows = dashboard
            .top_alerts()
            .iter()
            .enumerate()
            .map(|(i, alert)| {
                Row::new(
                    i as i64,
                    vec![
                        or_placeholder(alert.numero_contrat.as_deref()),
                        or_placeholder(alert.objet.as_deref()),
                        or_placeholder(alert.fournisseur_nom.as_deref()),
                        format_date(alert.date_fin.as_deref()),
                        alert
                            .jours_restants
                            .map(|d| format!("{} j.", d))
                            .unwrap_or_else(|| PLACEHOLDER.to_string()),
                        alert.niveau_alerte.clone().unwrap_or_else(|| "OK".to_string()),
                    ],
                )
            })
            .collect();
        let table = Table::new(
            View::Dashboard,
            vec!["N° contrat", "Objet", "Fournisseur", "Fin", "Restant", "Alerte"],
            rows,
        )
        .titled("Alertes contrats")
        .empty_message("Aucune alerte.");
        self.sink.render_table(&table);
        Ok(())
    }

    /// Refresh the notification list and the unread badge. Best effort.
    pub async fn load_notifications(&mut self) {
        let feed: NotificationFeed = match self.api.get(NOTIFICATIONS_PATH).await {
            Ok(feed) => feed,
            Err(e) => {
                debug!(error = %e, "Notifications unavailable");
                return;
            }
        };

        self.sink.set_notification_badge(feed.non_lues);

        let rows = feed
            .list
            .iter()
            .map(|n| {
                let actions = if n.lue { Vec::new() } else { vec!["Marquer lue"] };
                Row::new(
                    n.id,
                    vec![
                        or_placeholder(n.titre.as_deref()),
                        n.message.clone().unwrap_or_default(),
                        format_date(n.date_creation.as_deref()),
                    ],
                )
                .with_actions(actions)
            })
            .collect();
        let table = Table::new(View::Notifications, vec!["Titre", "Message", "Date"], rows)
            .empty_message("Aucune notification.");
        self.sink.render_table(&table);
    }

    /// Mark one notification read, then reload the list. Silent on failure.
    pub async fn mark_notification_read(&mut self, id: i64) {
        let path = format!("{}/{}/lire", NOTIFICATIONS_PATH, id);
        if let Err(e) = self.api.post(&path, &json!({})).await {
            debug!(id, error = %e, "Failed to mark notification read");
            return;
        }
        self.load_notifications().await;
    }
}

#[cfg(test)]
mod tests {
    use crate::api::Method;
    use crate::app::View;
    use crate::testing::{signed_in, SinkEvent};
    use serde_json::json;

    #[tokio::test]
    async fn test_dashboard_caps_alerts() {
        let (mut console, transport, sink, _) = signed_in("lecteur");
        let alerts: Vec<_> = (0..8)
            .map(|i| json!({"numero_contrat": format!("C-{}", i), "jours_restants": i}))
            .collect();
        transport.respond(
            Method::Get,
            "/dashboard",
            200,
            json!({"kpi_projets": 4, "kpi_budget": 1500.5, "alertes_contrats": alerts}),
        );

        console.load_dashboard().await.unwrap();
        let kpis = sink.last_kpis(View::Dashboard).unwrap();
        assert_eq!(kpis[0].value, "4");
        assert_eq!(kpis[1].value, "1\u{202F}500,50");
        assert_eq!(kpis[2].value, "-");

        let table = sink.tables(View::Dashboard).pop().unwrap();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[2].cells[4], "2 j.");
    }

    #[tokio::test]
    async fn test_notifications_are_best_effort() {
        let (mut console, transport, sink, _) = signed_in("lecteur");
        transport.respond(Method::Get, "/notifications", 500, json!({"error": "boom"}));

        console.load_notifications().await;
        assert!(sink.last_banner().is_none());
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::Badge(_))), 0);
    }

    #[tokio::test]
    async fn test_mark_read_reloads_badge() {
        let (mut console, transport, sink, _) = signed_in("lecteur");
        transport.respond(Method::Post, "/notifications/3/lire", 200, json!({"success": true}));
        transport.respond(
            Method::Get,
            "/notifications",
            200,
            json!({"list": [{"id": 3, "titre": "BC validé", "lue": true}], "non_lues": 0}),
        );

        console.mark_notification_read(3).await;
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::Badge(0))), 1);
        let table = sink.tables(View::Notifications).pop().unwrap();
        assert!(table.rows[0].actions.is_empty());
    }
}
