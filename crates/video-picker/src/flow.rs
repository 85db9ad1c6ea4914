//! Proxy flow: owns one chooser invocation from launch to delivery.
//!
//! ```text
//! Starting -> PickerLaunched -> Interpreting -> Succeeded | Cancelled | Failed -> Terminated
//! Starting -(checkpoint says launched)-> PickerLaunched
//! ```
//!
//! Each flow delivers at most one payload. The only silent exits are an
//! unrelated completion token and an unreachable host bridge.

use crate::config::FlowSettings;
use crate::errors::Result;
use crate::model::{
    Checkpoint, ChooserCompletion, ChooserRequest, ChooserStatus, ContentHandle, InvocationId,
    LaunchIntent, ReceiverAddress, SelectionItem,
};
use crate::payload::PickerOutcome;
use crate::platform::{deliver_outcome, FlowPorts};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Starting,
    PickerLaunched,
    Interpreting,
    Succeeded,
    Cancelled,
    Failed,
    Terminated,
}

pub struct ProxyFlow {
    id: InvocationId,
    address: ReceiverAddress,
    settings: FlowSettings,
    ports: FlowPorts,
    launched: bool,
    state: FlowState,
    outcome: Option<PickerOutcome>,
}

impl ProxyFlow {
    /// Runs the `Starting` state. Opens the chooser unless a checkpoint for
    /// this invocation says it is already open.
    pub fn start(intent: LaunchIntent, ports: FlowPorts, settings: FlowSettings) -> Self {
        let address = ReceiverAddress::resolve(
            intent.receiver_object.as_deref(),
            intent.callback_method.as_deref(),
            &settings.default_receiver_object,
            &settings.default_callback_method,
        );
        let launched = ports
            .checkpoints
            .load(&intent.invocation_id)
            .map(|c| c.launched)
            .unwrap_or(false);

        let mut flow = Self {
            id: intent.invocation_id,
            address,
            settings,
            ports,
            launched,
            state: FlowState::Starting,
            outcome: None,
        };

        if flow.launched {
            debug!("{}: resuming, chooser already open", flow.id);
            flow.state = FlowState::PickerLaunched;
        } else {
            flow.open_chooser();
        }
        flow
    }

    fn open_chooser(&mut self) {
        self.launched = true;
        if let Err(e) = self.save_checkpoint() {
            warn!("{}: checkpoint not saved: {e}", self.id);
        }

        let request = ChooserRequest::videos(self.settings.request_token, &self.settings.mime_filter);
        match self.ports.chooser.launch(&request) {
            Ok(()) => {
                debug!("{}: chooser open (token {})", self.id, request.request_token);
                self.state = FlowState::PickerLaunched;
            }
            Err(e) => {
                warn!("{}: chooser unavailable: {e}", self.id);
                self.conclude(PickerOutcome::failure(format!(
                    "System picker unavailable: {}",
                    e.native_message()
                )));
            }
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            launched: self.launched,
        }
    }

    /// Persist the resumption flag for this invocation.
    pub fn save_checkpoint(&self) -> Result<()> {
        self.ports.checkpoints.save(&self.id, self.checkpoint())
    }

    /// Handle the chooser's completion event.
    pub fn on_chooser_result(&mut self, completion: ChooserCompletion) {
        if self.state == FlowState::Terminated {
            debug!("{}: completion after termination ignored", self.id);
            return;
        }
        if completion.request_token != self.settings.request_token {
            debug!(
                "{}: completion for token {} is not ours",
                self.id, completion.request_token
            );
            self.terminate();
            return;
        }

        self.state = FlowState::Interpreting;
        let data = match (completion.status, completion.data) {
            (ChooserStatus::Ok, Some(data)) => data,
            _ => {
                self.conclude(PickerOutcome::Cancelled);
                return;
            }
        };

        let handles = data.unique_handles();
        if handles.is_empty() {
            self.conclude(PickerOutcome::Cancelled);
            return;
        }

        let outcome = match self.resolve_batch(&handles) {
            Ok(videos) => PickerOutcome::Success { videos },
            Err(e) => {
                warn!("{}: picker result unreadable: {e}", self.id);
                PickerOutcome::failure(format!(
                    "Failed to read picker result: {}",
                    e.native_message()
                ))
            }
        };
        self.conclude(outcome);
    }

    // All or nothing: the first metadata error aborts the batch.
    fn resolve_batch(&self, handles: &[ContentHandle]) -> Result<Vec<SelectionItem>> {
        let resolver = &self.ports.resolver;
        let mut videos = Vec::with_capacity(handles.len());
        for handle in handles {
            // Some providers refuse persistable grants; the session grant still works.
            let _ = resolver.take_persistable_read_grant(handle);

            let row = resolver.query_openable(handle)?.unwrap_or_default();
            let name = row
                .display_name
                .filter(|n| !n.is_empty())
                .or_else(|| handle.last_path_segment())
                .unwrap_or_else(|| self.settings.fallback_name.clone());
            let size = row.size.and_then(|s| u64::try_from(s).ok()).unwrap_or(0);

            videos.push(SelectionItem {
                uri: handle.clone(),
                name,
                size,
            });
        }
        Ok(videos)
    }

    fn conclude(&mut self, outcome: PickerOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.state = match outcome {
            PickerOutcome::Success { .. } => FlowState::Succeeded,
            PickerOutcome::Cancelled => FlowState::Cancelled,
            PickerOutcome::Failure { .. } => FlowState::Failed,
        };

        match deliver_outcome(self.ports.bridge.as_ref(), &self.address, &outcome) {
            Ok(()) => info!(
                "{}: delivered {} to {}.{}",
                self.id,
                outcome.label(),
                self.address.object,
                self.address.method
            ),
            Err(e) => debug!("{}: delivery dropped: {e}", self.id),
        }
        self.outcome = Some(outcome);
        self.terminate();
    }

    fn terminate(&mut self) {
        self.ports.checkpoints.clear(&self.id);
        self.ports.surface.finish();
        self.state = FlowState::Terminated;
    }

    pub fn id(&self) -> &InvocationId {
        &self.id
    }

    pub fn address(&self) -> &ReceiverAddress {
        &self.address
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == FlowState::Terminated
    }

    /// The outcome that was delivered, if any.
    pub fn outcome(&self) -> Option<&PickerOutcome> {
        self.outcome.as_ref()
    }
}
