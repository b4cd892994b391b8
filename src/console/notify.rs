use std::time::Duration;

use super::page::Page;

/// Time until a notice starts fading out.
pub const NOTICE_FADE_AFTER: Duration = Duration::from_millis(2800);
/// Time until a notice is removed from the page.
pub const NOTICE_LIFETIME: Duration = Duration::from_millis(3200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Inline colours of a notice box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticePalette {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

impl NoticeKind {
    pub fn class_name(self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }

    pub fn palette(self) -> NoticePalette {
        match self {
            NoticeKind::Info => NoticePalette {
                background: "#eef4ff",
                text: "#1e3a8a",
                border: "#2563eb",
            },
            NoticeKind::Success => NoticePalette {
                background: "#eaffef",
                text: "#065f46",
                border: "#16a34a",
            },
            NoticeKind::Error => NoticePalette {
                background: "#ffe8e6",
                text: "#7f1d1d",
                border: "#dc2626",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

/// Shows a transient notice. Notices are independent: several calls in a
/// row simply stack on screen.
pub fn display<P: Page + ?Sized>(page: &P, message: impl Into<String>, kind: NoticeKind) {
    let notice = Notice {
        message: message.into(),
        kind,
    };
    page.show_notice(&notice, NOTICE_LIFETIME);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::memory::MemoryPage;

    #[test]
    fn lifetime_fits_inside_three_and_a_half_seconds() {
        assert!(NOTICE_FADE_AFTER < NOTICE_LIFETIME);
        assert!(NOTICE_LIFETIME <= Duration::from_millis(3500));
    }

    #[test]
    fn error_notices_use_the_error_palette() {
        assert_eq!(NoticeKind::Error.palette().border, "#dc2626");
        assert_eq!(NoticeKind::Success.class_name(), "success");
    }

    #[tokio::test(start_paused = true)]
    async fn notices_stack_and_expire_regardless_of_kind() {
        let page = MemoryPage::new();
        display(&page, "first", NoticeKind::Info);
        display(&page, "second", NoticeKind::Error);
        tokio::time::advance(Duration::from_millis(1000)).await;
        display(&page, "third", NoticeKind::Success);

        let shown: Vec<_> = page.notices().into_iter().map(|n| n.message).collect();
        assert_eq!(shown, vec!["first", "second", "third"]);

        tokio::time::advance(Duration::from_millis(2500)).await;
        let shown: Vec<_> = page.notices().into_iter().map(|n| n.message).collect();
        assert_eq!(shown, vec!["third"]);

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(page.notices().is_empty());
    }
}
