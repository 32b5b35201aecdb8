use uuid::Uuid;

use crate::editing::Document;
use crate::publish::collaborators::{Consent, ConsentPrompt, Measurer};
use crate::publish::PublishError;
use crate::serialize::SerializedDocument;

/// Largest page the host accepts.
pub const HARD_SIZE_LIMIT: usize = 14_336;
/// Pages above this size are offered a split even when they fit.
pub const SOFT_WARNING_THRESHOLD: usize = 14_336;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub hard_limit: usize,
    pub soft_threshold: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            hard_limit: HARD_SIZE_LIMIT,
            soft_threshold: SOFT_WARNING_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a title is required")]
    TitleRequired,
    #[error("add at least one block")]
    ContentRequired,
}

impl ValidationError {
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::TitleRequired => "editor.titleRequired",
            ValidationError::ContentRequired => "editor.blockRequired",
        }
    }
}

/// Checks run before anything is measured.
pub fn validate(document: &Document) -> Result<(), ValidationError> {
    if document.title().trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if document.tree().is_empty() {
        return Err(ValidationError::ContentRequired);
    }
    Ok(())
}

/// Why a publish attempt stopped without reaching the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PublishAbort {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("page is {bytes} bytes, over the {limit} byte limit, and the split into {pages} pages was declined")]
    SizeLimitExceeded {
        bytes: usize,
        limit: usize,
        pages: usize,
    },
    #[error("page is {bytes} bytes, over the {limit} byte limit, and cannot be split")]
    PaginationUnavailable { bytes: usize, limit: usize },
}

impl PublishAbort {
    pub fn message_key(&self) -> &'static str {
        match self {
            PublishAbort::Validation(err) => err.message_key(),
            PublishAbort::SizeLimitExceeded { .. } => "editor.tooLarge",
            PublishAbort::PaginationUnavailable { .. } => "editor.cannotSplit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    SinglePage { bytes: usize },
    Paginated { pages: usize, bytes: usize },
}

/// What to hand to the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub strategy: PageStrategy,
    pub document: SerializedDocument,
}

impl PublishPlan {
    pub fn is_paginated(&self) -> bool {
        matches!(self.strategy, PageStrategy::Paginated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed(PublishPlan),
    Aborted(PublishAbort),
}

impl Decision {
    pub fn plan(&self) -> Option<&PublishPlan> {
        match self {
            Decision::Proceed(plan) => Some(plan),
            Decision::Aborted(_) => None,
        }
    }
}

/// Turns a document into a publish decision.
///
/// Measures the unsplit page first. Only when it breaks the hard limit, or
/// sits above the soft threshold, is a split measured and offered. Declining
/// a required split aborts; declining an optional one publishes the unsplit
/// page. At most two previews and one prompt per call.
pub async fn decide<M, C>(
    document: &Document,
    measurer: &M,
    consent: &C,
    limits: &Limits,
) -> Result<Decision, PublishError>
where
    M: Measurer + ?Sized,
    C: Consent + ?Sized,
{
    if let Err(err) = validate(document) {
        log::info!("publish rejected: {err}");
        return Ok(Decision::Aborted(err.into()));
    }

    let build_id = Uuid::new_v4();
    let single = document.to_serialized(false, build_id);
    let preview = measurer
        .preview(&single)
        .await
        .map_err(PublishError::Collaborator)?;
    log::debug!(
        "single page preview: {} bytes, exceeded: {}",
        preview.bytes,
        preview.exceeded
    );
    let bytes = preview.bytes;
    let single_plan = |document| PublishPlan {
        strategy: PageStrategy::SinglePage { bytes },
        document,
    };

    let required = preview.exceeded;
    if !required && bytes <= limits.soft_threshold {
        log::info!("publishing {bytes} bytes as a single page");
        return Ok(Decision::Proceed(single_plan(single)));
    }

    let paginated = document.to_serialized(true, build_id);
    let split = measurer
        .preview(&paginated)
        .await
        .map_err(PublishError::Collaborator)?;
    let pages = split.split_page_count();
    log::debug!("paginated preview: {pages:?} pages");

    let decision = match (pages, required) {
        (Some(pages), _) => {
            let prompt = ConsentPrompt {
                bytes,
                pages,
                required,
            };
            if consent.confirm(&prompt).await {
                Decision::Proceed(PublishPlan {
                    strategy: PageStrategy::Paginated {
                        pages,
                        bytes: split.page_bytes(),
                    },
                    document: paginated,
                })
            } else if required {
                Decision::Aborted(PublishAbort::SizeLimitExceeded {
                    bytes,
                    limit: limits.hard_limit,
                    pages,
                })
            } else {
                Decision::Proceed(single_plan(single))
            }
        }
        (None, true) => Decision::Aborted(PublishAbort::PaginationUnavailable {
            bytes,
            limit: limits.hard_limit,
        }),
        (None, false) => Decision::Proceed(single_plan(single)),
    };
    match &decision {
        Decision::Proceed(plan) => log::info!("publish plan: {:?}", plan.strategy),
        Decision::Aborted(abort) => log::info!("publish aborted: {abort}"),
    }
    Ok(decision)
}
