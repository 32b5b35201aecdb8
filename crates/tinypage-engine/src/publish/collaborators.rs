use async_trait::async_trait;

use crate::serialize::SerializedDocument;

/// Size of one page of a split document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeasurement {
    pub bytes: usize,
}

/// What the compiler reports for a candidate document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preview {
    /// The output breaks the hard size limit.
    pub exceeded: bool,
    pub bytes: usize,
    /// One entry per page under the document's pagination setting.
    pub measurements: Option<Vec<PageMeasurement>>,
}

impl Preview {
    /// Page count when splitting produced a usable multi-page result.
    pub fn split_page_count(&self) -> Option<usize> {
        if self.exceeded {
            return None;
        }
        self.measurements
            .as_ref()
            .map(Vec::len)
            .filter(|&pages| pages > 1)
    }

    /// Sum of the per-page sizes, falling back to `bytes`.
    pub fn page_bytes(&self) -> usize {
        match &self.measurements {
            Some(pages) if !pages.is_empty() => pages.iter().map(|p| p.bytes).sum(),
            _ => self.bytes,
        }
    }
}

/// Result of a publish. Single pages report `bytes`, split pages report
/// `page_count` and `total_bytes`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishReceipt {
    pub slug: String,
    pub bytes: Option<usize>,
    pub page_count: Option<usize>,
    pub total_bytes: Option<usize>,
}

impl PublishReceipt {
    /// Human readable size, e.g. `3 pages, 30112 bytes` or `9000 bytes`.
    pub fn summary(&self) -> String {
        match (self.page_count, self.total_bytes) {
            (Some(pages), Some(total)) if pages > 1 => format!("{pages} pages, {total} bytes"),
            _ => format!("{} bytes", self.bytes.or(self.total_bytes).unwrap_or(0)),
        }
    }
}

/// Question put to the user before splitting a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentPrompt {
    pub bytes: usize,
    pub pages: usize,
    /// True when declining aborts the publish.
    pub required: bool,
}

impl ConsentPrompt {
    pub const MESSAGE_KEY: &'static str = "editor.splitConfirm";

    pub fn message_key(&self) -> &'static str {
        Self::MESSAGE_KEY
    }

    /// English text for front ends without a translation table.
    pub fn message(&self) -> String {
        format!(
            "This page is {} bytes. Split it into {} pages?",
            self.bytes, self.pages
        )
    }
}

/// Compiler dry run. Must be a pure function of its input.
#[async_trait(?Send)]
pub trait Measurer {
    async fn preview(&self, document: &SerializedDocument) -> anyhow::Result<Preview>;
}

#[async_trait(?Send)]
pub trait Publisher {
    async fn publish(&self, document: &SerializedDocument) -> anyhow::Result<PublishReceipt>;
}

/// Asks the user to confirm a split. Resolves exactly once per prompt.
#[async_trait(?Send)]
pub trait Consent {
    async fn confirm(&self, prompt: &ConsentPrompt) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pages(n: usize) -> Option<Vec<PageMeasurement>> {
        Some(vec![PageMeasurement { bytes: 1 }; n])
    }

    #[rstest]
    #[case(false, pages(2), Some(2))]
    #[case(false, pages(1), None)]
    #[case(false, None, None)]
    #[case(true, pages(3), None)]
    fn split_page_count(
        #[case] exceeded: bool,
        #[case] measurements: Option<Vec<PageMeasurement>>,
        #[case] expected: Option<usize>,
    ) {
        let preview = Preview {
            exceeded,
            bytes: 0,
            measurements,
        };
        assert_eq!(preview.split_page_count(), expected);
    }

    #[test]
    fn receipt_summary() {
        let single = PublishReceipt {
            slug: "a".into(),
            bytes: Some(9000),
            ..Default::default()
        };
        assert_eq!(single.summary(), "9000 bytes");

        let split = PublishReceipt {
            slug: "a".into(),
            page_count: Some(3),
            total_bytes: Some(30112),
            ..Default::default()
        };
        assert_eq!(split.summary(), "3 pages, 30112 bytes");
    }
}
