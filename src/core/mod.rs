// src/core/mod.rs
//! Client-side matching core: file slot, payload building, service client,
//! result state and the workflow orchestrator

pub mod file_store;
pub mod orchestrator;
pub mod request_builder;
pub mod result_state;
pub mod service_client;

pub use file_store::{FileHandleStore, ResumeFile};
pub use orchestrator::{Notice, NoticeKind, Orchestrator, Phase, WorkflowOutcome, WorkflowStatus};
pub use request_builder::MatchPayload;
pub use result_state::{ConsistencyPolicy, ResultStateManager, SlotUpdate};
pub use service_client::{BaseUrl, MatchTransport, MatchingClient, RawResponse, ReqwestTransport};
