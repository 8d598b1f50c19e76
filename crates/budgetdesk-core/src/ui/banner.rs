use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Transient message, auto-dismissed after `dismiss_after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    pub kind: BannerKind,
    pub dismiss_after: Duration,
}

impl Banner {
    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}

/// Builds banners with the configured display time.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    dismiss_after: Duration,
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        Self { dismiss_after }
    }

    pub fn success(&self, text: impl Into<String>) -> Banner {
        self.build(text, BannerKind::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> Banner {
        self.build(text, BannerKind::Error)
    }

    fn build(&self, text: impl Into<String>, kind: BannerKind) -> Banner {
        Banner {
            text: text.into(),
            kind,
            dismiss_after: self.dismiss_after,
        }
    }
}
