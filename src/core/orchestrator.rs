// src/core/orchestrator.rs
//! Drives the dataset and custom workflows.
//!
//! Each workflow moves through `Idle -> Validating -> InFlight -> Idle`.
//! Validation and payload building are synchronous; the request to the
//! matching service is the only await. Submitting again while a request is
//! in flight is allowed: no request is cancelled, and under the default
//! [`ConsistencyPolicy::LastResponseWins`] whichever response settles last
//! owns the slot, even if it belongs to the older request.

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::file_store::{FileHandleStore, ResumeFile};
use crate::core::request_builder::{self, MatchPayload};
use crate::core::result_state::{ConsistencyPolicy, ResultStateManager, SlotUpdate};
use crate::core::service_client::{FromSuccessBody, MatchingClient};
use crate::error::{MatchFailure, ValidationError};
use crate::types::{MatchOutcome, Settled, Workflow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowStatus {
    pub phase: Phase,
    pub in_flight: usize,
    pub dispatched: u64,
    pub last_settled: Option<Settlement>,
}

impl WorkflowStatus {
    fn resting_phase(&self) -> Phase {
        if self.in_flight > 0 {
            Phase::InFlight
        } else {
            Phase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    Failure,
}

/// Transient, interruptive message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub workflow: Workflow,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn validation(workflow: Workflow, error: ValidationError) -> Self {
        Self {
            workflow,
            kind: NoticeKind::Validation,
            message: error.to_string(),
        }
    }

    /// Server messages are shown verbatim; everything else gets the
    /// workflow's generic text.
    fn failure(workflow: Workflow, failure: &MatchFailure) -> Self {
        let message = match failure {
            MatchFailure::Service { message, .. } => message.clone(),
            MatchFailure::Transport { .. } => workflow.generic_failure_notice().to_string(),
        };
        Self {
            workflow,
            kind: NoticeKind::Failure,
            message,
        }
    }
}

/// How a single submit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Rejected(ValidationError),
    Applied,
    /// Succeeded, but a later request had already been applied
    Superseded,
    Failed(MatchFailure),
}

impl WorkflowOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, WorkflowOutcome::Applied | WorkflowOutcome::Superseded)
    }
}

struct WorkflowMachine {
    workflow: Workflow,
    status: watch::Sender<WorkflowStatus>,
}

impl WorkflowMachine {
    fn new(workflow: Workflow) -> Self {
        let (status, _) = watch::channel(WorkflowStatus::default());
        Self { workflow, status }
    }

    fn begin(&self) {
        self.status.send_modify(|s| s.phase = Phase::Validating);
    }

    fn reject(&self) {
        self.status.send_modify(|s| s.phase = s.resting_phase());
    }

    fn dispatch(&self) -> InFlight<'_> {
        let mut sequence = 0;
        self.status.send_modify(|s| {
            s.dispatched += 1;
            s.in_flight += 1;
            s.phase = Phase::InFlight;
            sequence = s.dispatched;
        });
        InFlight {
            machine: self,
            sequence,
            settlement: None,
        }
    }
}

/// One outstanding request. Dropping it without settling (the submit future
/// was cancelled) still releases the in-flight count.
struct InFlight<'a> {
    machine: &'a WorkflowMachine,
    sequence: u64,
    settlement: Option<Settlement>,
}

impl InFlight<'_> {
    fn settle(mut self, settlement: Settlement) {
        self.settlement = Some(settlement);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let settlement = self.settlement;
        if settlement.is_none() {
            debug!(
                "{} request #{} abandoned before settling",
                self.machine.workflow, self.sequence
            );
        }
        self.machine.status.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            if settlement.is_some() {
                s.last_settled = settlement;
            }
            s.phase = s.resting_phase();
        });
    }
}

pub struct Orchestrator {
    files: FileHandleStore,
    job_description: watch::Sender<String>,
    client: MatchingClient,
    results: ResultStateManager,
    dataset: WorkflowMachine,
    custom: WorkflowMachine,
    notices: mpsc::UnboundedSender<Notice>,
}

impl Orchestrator {
    /// Returns the orchestrator and the receiving end of its notices.
    pub fn new(
        client: MatchingClient,
        policy: ConsistencyPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, notice_rx) = mpsc::unbounded_channel();
        let (job_description, _) = watch::channel(String::new());

        let orchestrator = Self {
            files: FileHandleStore::new(),
            job_description,
            client,
            results: ResultStateManager::new(policy),
            dataset: WorkflowMachine::new(Workflow::Dataset),
            custom: WorkflowMachine::new(Workflow::Custom),
            notices,
        };
        (orchestrator, notice_rx)
    }

    pub fn files(&self) -> &FileHandleStore {
        &self.files
    }

    pub fn select_file(&self, file: ResumeFile) {
        self.files.set_file(file);
    }

    pub fn set_job_description(&self, text: impl Into<String>) {
        self.job_description.send_replace(text.into());
    }

    pub fn job_description(&self) -> String {
        self.job_description.borrow().clone()
    }

    pub fn results(&self) -> &ResultStateManager {
        &self.results
    }

    fn machine(&self, workflow: Workflow) -> &WorkflowMachine {
        match workflow {
            Workflow::Dataset => &self.dataset,
            Workflow::Custom => &self.custom,
        }
    }

    pub fn status(&self, workflow: Workflow) -> WorkflowStatus {
        *self.machine(workflow).status.borrow()
    }

    pub fn subscribe_status(&self, workflow: Workflow) -> watch::Receiver<WorkflowStatus> {
        self.machine(workflow).status.subscribe()
    }

    pub async fn submit_dataset(&self) -> WorkflowOutcome {
        self.dataset.begin();
        let built = request_builder::build_dataset(self.files.get_file().as_deref());
        self.run(&self.dataset, built, |outcome| {
            self.results.update_dataset(outcome)
        })
        .await
    }

    pub async fn submit_custom(&self) -> WorkflowOutcome {
        self.custom.begin();
        let built = {
            let text = self.job_description.borrow();
            request_builder::build_custom(self.files.get_file().as_deref(), &text)
        };
        self.run(&self.custom, built, |outcome| {
            self.results.update_custom(outcome)
        })
        .await
    }

    async fn run<R, F>(
        &self,
        machine: &WorkflowMachine,
        built: Result<MatchPayload, ValidationError>,
        apply: F,
    ) -> WorkflowOutcome
    where
        R: FromSuccessBody,
        F: FnOnce(MatchOutcome<Settled<R>>) -> MatchOutcome<SlotUpdate>,
    {
        let workflow = machine.workflow;

        let payload = match built {
            Ok(payload) => payload,
            Err(error) => {
                machine.reject();
                warn!("{} submit rejected: {:?}", workflow, error);
                self.notify(Notice::validation(workflow, error));
                return WorkflowOutcome::Rejected(error);
            }
        };

        let in_flight = machine.dispatch();
        let sequence = in_flight.sequence;
        let request_id = Uuid::new_v4();
        let span = info_span!("match_request", %workflow, %request_id, sequence);

        let outcome = self
            .client
            .submit::<R>(&payload)
            .instrument(span)
            .await
            .map(|value| Settled::new(value, request_id, sequence));

        match apply(outcome) {
            Ok(SlotUpdate::Applied) => {
                in_flight.settle(Settlement::Success);
                info!("{} request #{} settled", workflow, sequence);
                WorkflowOutcome::Applied
            }
            Ok(SlotUpdate::Superseded) => {
                in_flight.settle(Settlement::Success);
                info!("{} request #{} settled after a newer one", workflow, sequence);
                WorkflowOutcome::Superseded
            }
            Err(failure) => {
                in_flight.settle(Settlement::Failure);
                self.notify(Notice::failure(workflow, &failure));
                WorkflowOutcome::Failed(failure)
            }
        }
    }

    fn notify(&self, notice: Notice) {
        // Nobody listening is fine; notices are transient.
        let _ = self.notices.send(notice);
    }
}
