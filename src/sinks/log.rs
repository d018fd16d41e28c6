//! # LogSink — simple directive printer
//!
//! A minimal sink that prints incoming [`Directive`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [create] domain="tracker.example" count=1 width=296.4 color=teal
//! [update] domain="tracker.example" count=2 width=301.8
//! [icon-ready] domain="tracker.example" icon=resolved
//! [remove] domain="tracker.example"
//! [remove-all]
//! ```

use async_trait::async_trait;

use crate::events::{Directive, DirectiveKind};
use crate::icons::IconOutcome;
use crate::sinks::RenderSink;

/// Directive writer sink.
#[derive(Default)]
pub struct LogSink;

impl LogSink {
    /// Construct a new [`LogSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderSink for LogSink {
    async fn on_directive(&self, d: &Directive) {
        match d.kind {
            DirectiveKind::Create => {
                println!(
                    "[create] domain={:?} count={:?} width={:?} color={:?}",
                    d.domain,
                    d.count,
                    d.width,
                    d.color.map(|c| c.as_label()),
                );
            }
            DirectiveKind::Update => {
                println!(
                    "[update] domain={:?} count={:?} width={:?}",
                    d.domain, d.count, d.width
                );
            }
            DirectiveKind::IconReady => {
                let icon = match d.icon {
                    Some(IconOutcome::Resolved(_)) => "resolved",
                    Some(IconOutcome::Fallback) => "fallback",
                    None => "unknown",
                };
                println!("[icon-ready] domain={:?} icon={}", d.domain, icon);
            }
            DirectiveKind::Remove => {
                println!("[remove] domain={:?}", d.domain);
            }
            DirectiveKind::RemoveAll => {
                println!("[remove-all]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogSink"
    }
}
