use std::cell::Cell;

use crate::editing::Document;
use crate::publish::collaborators::{Consent, Measurer, PublishReceipt, Publisher};
use crate::publish::decision::{Decision, Limits, PublishAbort, decide};
use crate::publish::PublishError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(PublishReceipt),
    Aborted(PublishAbort),
}

/// Owns the collaborators and guards against overlapping attempts.
pub struct PublishWorkflow<M, P, C> {
    measurer: M,
    publisher: P,
    consent: C,
    limits: Limits,
    in_progress: Cell<bool>,
}

/// Clears the in-progress flag however the attempt ends.
struct InProgress<'a>(&'a Cell<bool>);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<M, P, C> PublishWorkflow<M, P, C>
where
    M: Measurer,
    P: Publisher,
    C: Consent,
{
    pub fn new(measurer: M, publisher: P, consent: C) -> Self {
        Self {
            measurer,
            publisher,
            consent,
            limits: Limits::default(),
            in_progress: Cell::new(false),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn consent(&self) -> &C {
        &self.consent
    }

    pub fn is_publishing(&self) -> bool {
        self.in_progress.get()
    }

    fn begin(&self) -> Result<InProgress<'_>, PublishError> {
        if self.in_progress.replace(true) {
            log::warn!("publish requested while another is in progress");
            return Err(PublishError::AlreadyInProgress);
        }
        Ok(InProgress(&self.in_progress))
    }

    /// Runs the decision engine without publishing.
    pub async fn decide(&self, document: &Document) -> Result<Decision, PublishError> {
        let _guard = self.begin()?;
        decide(document, &self.measurer, &self.consent, &self.limits).await
    }

    /// Decides, publishes on `Proceed`, and resets the editor afterwards.
    ///
    /// The publisher is only called for a plan; aborts return without
    /// touching it or the document.
    pub async fn publish(&self, document: &mut Document) -> Result<PublishOutcome, PublishError> {
        let _guard = self.begin()?;
        let plan = match decide(document, &self.measurer, &self.consent, &self.limits).await? {
            Decision::Proceed(plan) => plan,
            Decision::Aborted(abort) => return Ok(PublishOutcome::Aborted(abort)),
        };
        let receipt = self
            .publisher
            .publish(&plan.document)
            .await
            .map_err(PublishError::Collaborator)?;
        log::info!("published {}: {}", receipt.slug, receipt.summary());
        document.reset();
        Ok(PublishOutcome::Published(receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::collaborators::{ConsentPrompt, Preview};
    use crate::serialize::SerializedDocument;
    use async_trait::async_trait;

    struct Fixed(usize);

    #[async_trait(?Send)]
    impl Measurer for Fixed {
        async fn preview(&self, _: &SerializedDocument) -> anyhow::Result<Preview> {
            Ok(Preview {
                exceeded: false,
                bytes: self.0,
                measurements: None,
            })
        }
    }

    struct Unused;

    #[async_trait(?Send)]
    impl Publisher for Unused {
        async fn publish(&self, _: &SerializedDocument) -> anyhow::Result<PublishReceipt> {
            anyhow::bail!("publisher should not be reached")
        }
    }

    #[async_trait(?Send)]
    impl Consent for Unused {
        async fn confirm(&self, _: &ConsentPrompt) -> bool {
            false
        }
    }

    #[test]
    fn second_attempt_is_rejected_while_in_progress() {
        let workflow = PublishWorkflow::new(Fixed(10), Unused, Unused);
        let guard = workflow.begin().unwrap();
        assert!(workflow.is_publishing());
        assert!(matches!(
            workflow.begin(),
            Err(PublishError::AlreadyInProgress)
        ));

        let doc = Document::new();
        let result = pollster::block_on(workflow.decide(&doc));
        assert!(matches!(result, Err(PublishError::AlreadyInProgress)));

        drop(guard);
        assert!(!workflow.is_publishing());
    }

    #[test]
    fn flag_clears_after_collaborator_failure() {
        let workflow = PublishWorkflow::new(Fixed(10), Unused, Unused);
        let mut doc = Document::new();
        doc.set_title("Hello");
        let result = pollster::block_on(workflow.publish(&mut doc));
        assert!(matches!(result, Err(PublishError::Collaborator(_))));
        assert!(!workflow.is_publishing());
        assert_eq!(doc.title(), "Hello");
    }
}
