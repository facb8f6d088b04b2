//! Serialized lifecycle commands against the remote authority.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use tracing::instrument;

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{ControlReply, ControlRequest};
use crate::registry::ServiceRegistry;
use crate::unitfile::CreateServiceForm;

/// Commands sharing the control endpoint. Deletion is routed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "start" => Ok(ServiceAction::Start),
            "stop" => Ok(ServiceAction::Stop),
            "restart" => Ok(ServiceAction::Restart),
            "enable" => Ok(ServiceAction::Enable),
            "disable" => Ok(ServiceAction::Disable),
            other => Err(format!(
                "unknown action: {other}. Try: start, stop, restart, enable, disable"
            )),
        }
    }
}

/// In-flight command slots, one per service name. While a slot is held,
/// every further command for that name is rejected before it reaches the
/// API client; the controls for that row are effectively disabled until
/// the pending task settles.
#[derive(Debug, Clone, Default)]
pub struct PendingActions {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl PendingActions {
    pub fn new() -> Self {
        PendingActions::default()
    }

    /// Claim the slot for `name`. Fails when a command is already pending.
    pub fn begin(&self, name: &str) -> Result<PendingSlot> {
        let mut held = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !held.insert(name.to_string()) {
            return Err(ClientError::ActionPending(name.to_string()));
        }
        Ok(PendingSlot {
            set: Arc::clone(&self.inner),
            name: name.to_string(),
        })
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(name)
    }
}

/// Releases its slot on drop, success and failure paths alike.
#[derive(Debug)]
pub struct PendingSlot {
    set: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        if let Ok(mut held) = self.set.lock() {
            held.remove(&self.name);
        }
    }
}

/// Sends lifecycle commands and reconciles afterwards. Never patches the
/// targeted descriptor locally: the remote system is the only authority on
/// resulting state, so every success is followed by a full registry
/// refresh issued after the command's response has been fully received.
#[derive(Debug, Default)]
pub struct ActionDispatcher {
    pending: PendingActions,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        ActionDispatcher::default()
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Start/stop/restart/enable/disable through the shared control
    /// endpoint, then refresh.
    #[instrument(skip(self, client, registry))]
    pub async fn control(
        &self,
        client: &ApiClient,
        registry: &mut ServiceRegistry,
        name: &str,
        action: ServiceAction,
    ) -> Result<ControlReply> {
        let _slot = self.pending.begin(name)?;
        let body = client
            .post_json(
                "services/control",
                &ControlRequest {
                    name: name.to_string(),
                    action: action.as_str().to_string(),
                },
            )
            .await?;
        let reply = serde_json::from_value(body).unwrap_or_default();
        registry.refresh(client).await?;
        Ok(reply)
    }

    /// Remove a service via its dedicated endpoint, then refresh.
    #[instrument(skip(self, client, registry))]
    pub async fn delete(
        &self,
        client: &ApiClient,
        registry: &mut ServiceRegistry,
        name: &str,
    ) -> Result<ControlReply> {
        let _slot = self.pending.begin(name)?;
        let body = client
            .post_json(
                "services/delete",
                &ControlRequest {
                    name: name.to_string(),
                    action: "delete".to_string(),
                },
            )
            .await?;
        let reply = serde_json::from_value(body).unwrap_or_default();
        registry.refresh(client).await?;
        Ok(reply)
    }

    /// Create a service from validated form input, then refresh. Validation
    /// failures surface before any network traffic.
    #[instrument(skip_all, fields(name = %form.name))]
    pub async fn create(
        &self,
        client: &ApiClient,
        registry: &mut ServiceRegistry,
        form: &CreateServiceForm,
    ) -> Result<()> {
        let request = form.assemble()?;
        let _slot = self.pending.begin(&request.name)?;
        client.post_json("services/create", &request).await?;
        registry.refresh(client).await?;
        Ok(())
    }
}
