//! Notification presenter.

use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use scanfill_core::{NotifyPolicy, Page, Severity};

/// Shared banner look; the severity only swaps the palette.
const BANNER_BASE_STYLE: &str = "position:fixed;top:16px;right:16px;z-index:2147483647;\
    padding:12px 18px;border-radius:6px;font:14px/1.4 sans-serif;\
    box-shadow:0 2px 8px rgba(0,0,0,0.25);";

/// Reminder attached to the blocking acknowledgment: nothing was saved or
/// submitted on the operator's behalf.
const REVIEW_REMINDER: &str =
    "Review every filled value, then save and submit the form yourself. \
     Nothing has been saved or submitted automatically.";

/// Renders transient and blocking feedback to the operator.
pub struct NotificationPresenter {
    banner_ttl: Duration,
}

impl NotificationPresenter {
    pub fn new(policy: &NotifyPolicy) -> Self {
        Self {
            banner_ttl: Duration::from_secs(policy.banner_ttl_secs),
        }
    }

    /// Show a transient banner styled for `severity`; `Success`
    /// additionally raises a blocking acknowledgment carrying the
    /// manual-review reminder.
    pub async fn notify(&self, page: &dyn Page, message: &str, severity: Severity) -> Result<()> {
        debug!(%severity, message, "Notifying operator");
        page.show_banner(message, &banner_style(severity), self.banner_ttl)
            .await?;

        if severity == Severity::Success {
            page.show_alert(&format!("{message}\n\n{REVIEW_REMINDER}"))
                .await?;
        }
        Ok(())
    }
}

fn banner_style(severity: Severity) -> String {
    let palette = match severity {
        Severity::Info => "background:#e3f2fd;color:#0d47a1;border:1px solid #64b5f6;",
        Severity::Success => "background:#e8f5e9;color:#1b5e20;border:1px solid #34a853;",
        Severity::Warning => "background:#fff8e1;color:#7f6000;border:1px solid #fbc02d;",
        Severity::Error => "background:#fdecea;color:#b71c1c;border:1px solid #e57373;",
    };
    format!("{BANNER_BASE_STYLE}{palette}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanfill_core::FakePage;

    fn presenter() -> NotificationPresenter {
        NotificationPresenter::new(&NotifyPolicy::default())
    }

    #[tokio::test]
    async fn info_shows_a_banner_and_no_acknowledgment() {
        let page = FakePage::new("https://host/apply");
        presenter()
            .notify(&page, "Extracting document…", Severity::Info)
            .await
            .unwrap();

        let banners = page.banners().await;
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].0, "Extracting document…");
        assert!(page.alerts().await.is_empty());
    }

    #[tokio::test]
    async fn success_also_raises_the_blocking_acknowledgment() {
        let page = FakePage::new("https://host/apply");
        presenter()
            .notify(&page, "Filled 16 of 16 fields", Severity::Success)
            .await
            .unwrap();

        let alerts = page.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("Filled 16 of 16 fields"));
        assert!(alerts[0].contains("submit the form yourself"));
    }

    #[tokio::test]
    async fn severities_get_distinct_palettes() {
        let styles: Vec<_> = [
            Severity::Info,
            Severity::Success,
            Severity::Warning,
            Severity::Error,
        ]
        .into_iter()
        .map(banner_style)
        .collect();
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a, b);
            }
            assert!(a.starts_with(BANNER_BASE_STYLE));
        }
    }
}
