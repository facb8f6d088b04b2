//! In-memory mirror of the last-known service list.

use serde_json::Value;
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{ServiceRecord, ServiceUnit};
use crate::sort::{self, SortDirective};

/// Snapshot of the remote service list. Replaced wholesale on every
/// successful [`refresh`](Self::refresh); a failed refresh leaves the
/// previous snapshot untouched. Descriptors are keyed by `name` and never
/// mutated in place: any state change goes through the API and comes back
/// with the next refresh.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    units: Vec<ServiceUnit>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        ServiceRegistry::default()
    }

    pub fn units(&self) -> &[ServiceUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ServiceUnit> {
        self.units.iter().find(|unit| unit.name == name)
    }

    /// Fetch the full list and replace the snapshot. Requires a present
    /// credential (the client tears the session down otherwise, exactly as
    /// for a 401, without issuing a request).
    #[instrument(skip(self, client))]
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<()> {
        let body = client.get_json("services").await?;
        let records = decode_service_list(body)?;
        self.units = records.into_iter().map(ServiceUnit::from).collect();
        tracing::debug!(count = self.units.len(), "service snapshot replaced");
        Ok(())
    }

    /// Derived ordering of the current snapshot. Never reorders the
    /// snapshot itself; recomputed on demand from the directive.
    pub fn sorted(&self, directive: &SortDirective) -> Vec<&ServiceUnit> {
        let mut view: Vec<&ServiceUnit> = self.units.iter().collect();
        view.sort_by(|a, b| sort::compare(a, b, directive));
        view
    }
}

fn decode_service_list(body: Value) -> Result<Vec<ServiceRecord>> {
    let Some(services) = body.get("services") else {
        return Err(ClientError::Format(
            "response has no services field".into(),
        ));
    };
    let Some(items) = services.as_array() else {
        return Err(ClientError::Format("services is not an array".into()));
    };
    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone())
                .map_err(|err| ClientError::Format(format!("bad service entry: {err}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortField, SortOrder};
    use crate::testutil::client_for;
    use tempfile::TempDir;

    const LIST_BODY: &str = r#"{
        "services": [
            {"name": "nginx.service", "status": "active", "enabled": "enabled",
             "description": "web server", "details": "{\"unit\":\"nginx.service\"}"},
            {"name": "backup.service", "status": "inactive", "enabled": false,
             "description": "nightly backup", "details": ""},
            {"name": "agent.service", "status": "failed", "enabled": true,
             "description": "", "details": "not-json"}
        ]
    }"#;

    #[tokio::test]
    async fn refresh_replaces_snapshot_and_normalizes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/services")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LIST_BODY)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let (client, _guard) = client_for(&server.url(), &dir);
        client.store().set("tok-1").unwrap();

        let mut registry = ServiceRegistry::new();
        registry.refresh(&client).await.unwrap();

        assert_eq!(registry.len(), 3);
        let nginx = registry.get("nginx.service").unwrap();
        assert!(nginx.is_active());
        assert!(nginx.enabled.on);
        assert!(matches!(
            nginx.details,
            crate::models::UnitDetails::Parsed(_)
        ));
        let agent = registry.get("agent.service").unwrap();
        assert!(matches!(
            agent.details,
            crate::models::UnitDetails::Unparsed { .. }
        ));

        // Default view: name ascending.
        let view = registry.sorted(&SortDirective::default());
        let names: Vec<&str> = view.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(
            names,
            ["agent.service", "backup.service", "nginx.service"]
        );
    }

    #[tokio::test]
    async fn refresh_rejects_non_array_services() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/services")
            .with_status(200)
            .with_body(r#"{"services": "oops"}"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let (client, _guard) = client_for(&server.url(), &dir);
        client.store().set("tok-1").unwrap();

        let mut registry = ServiceRegistry::new();
        let err = registry.refresh(&client).await.unwrap_err();
        assert!(matches!(err, ClientError::Format(_)));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let good = server
            .mock("GET", "/services")
            .with_status(200)
            .with_body(LIST_BODY)
            .expect(1)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let (client, _guard) = client_for(&server.url(), &dir);
        client.store().set("tok-1").unwrap();

        let mut registry = ServiceRegistry::new();
        registry.refresh(&client).await.unwrap();
        good.remove_async().await;

        server
            .mock("GET", "/services")
            .with_status(500)
            .with_body(r#"{"detail": "ssh connection failed"}"#)
            .create_async()
            .await;

        let err = registry.refresh(&client).await.unwrap_err();
        match err {
            ClientError::Application { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "ssh connection failed");
            }
            other => panic!("expected Application, got {other:?}"),
        }
        assert_eq!(registry.len(), 3, "snapshot must survive a failed refresh");
    }

    #[tokio::test]
    async fn sorted_view_does_not_reorder_snapshot() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/services")
            .with_status(200)
            .with_body(LIST_BODY)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let (client, _guard) = client_for(&server.url(), &dir);
        client.store().set("tok-1").unwrap();

        let mut registry = ServiceRegistry::new();
        registry.refresh(&client).await.unwrap();

        let directive = SortDirective {
            field: SortField::Status,
            order: SortOrder::Descending,
        };
        let _ = registry.sorted(&directive);
        assert_eq!(registry.units()[0].name, "nginx.service");
    }
}
