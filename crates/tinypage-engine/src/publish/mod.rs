//! Publish decisions and their execution.
//!
//! The engine never measures or renders anything itself. It serializes the
//! document, asks a [`Measurer`] how big the result is, asks [`Consent`]
//! before splitting, and hands the resulting plan to a [`Publisher`].

pub mod collaborators;
pub mod decision;
pub mod workflow;

pub use collaborators::{
    Consent, ConsentPrompt, Measurer, PageMeasurement, Preview, PublishReceipt, Publisher,
};
pub use decision::{
    Decision, HARD_SIZE_LIMIT, Limits, PageStrategy, PublishAbort, PublishPlan,
    SOFT_WARNING_THRESHOLD, ValidationError, decide, validate,
};
pub use workflow::{PublishOutcome, PublishWorkflow};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("a publish is already in progress")]
    AlreadyInProgress,
    #[error("collaborator failed: {0}")]
    Collaborator(#[source] anyhow::Error),
}
