#![forbid(unsafe_code)]

//! Message extraction.
//!
//! The host markup is the one part of the system expected to change without
//! notice, so extraction sits behind [`MessageExtractor`]. [`SelectorExtractor`]
//! is the stock CSS-selector strategy; a host that needs something smarter
//! swaps in its own implementation.

use tracing::debug;

use crate::config::NavigatorConfig;
use crate::host::HostDocument;
use crate::message::{AuthorRole, MessageRecord};

/// Turns the current host document into an ordered list of user messages.
pub trait MessageExtractor<D: HostDocument> {
    /// Scan `doc` from scratch. Must not fail: unreadable messages are skipped.
    fn extract(&self, doc: &D) -> Vec<MessageRecord<D::Node>>;
}

/// Counters from one extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractionReport {
    /// Nodes carrying an author role.
    pub scanned: usize,
    /// User messages with readable text.
    pub user_messages: usize,
    /// User messages skipped because their text container was missing.
    pub soft_misses: usize,
}

/// Selector-based extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorExtractor {
    message_selector: String,
    role_attribute: String,
    text_selector: String,
}

impl SelectorExtractor {
    pub fn new(
        message_selector: impl Into<String>,
        role_attribute: impl Into<String>,
        text_selector: impl Into<String>,
    ) -> Self {
        Self {
            message_selector: message_selector.into(),
            role_attribute: role_attribute.into(),
            text_selector: text_selector.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::new(
            config.message_selector.as_str(),
            config.role_attribute.as_str(),
            config.text_selector.as_str(),
        )
    }

    /// Extract user messages and report what was skipped.
    pub fn extract_with_report<D: HostDocument>(
        &self,
        doc: &D,
    ) -> (Vec<MessageRecord<D::Node>>, ExtractionReport) {
        let nodes = doc.query_all(&self.message_selector);
        let mut report = ExtractionReport {
            scanned: nodes.len(),
            ..ExtractionReport::default()
        };
        let mut records = Vec::new();

        for (index, node) in nodes.into_iter().enumerate() {
            let Some(role) = doc.attribute(&node, &self.role_attribute) else {
                continue;
            };
            let role = AuthorRole::parse(&role);
            if !role.is_user() {
                continue;
            }
            match doc.query_text(&node, &self.text_selector) {
                Some(text) => {
                    records.push(MessageRecord::new(text, node, role));
                    report.user_messages += 1;
                }
                None => {
                    report.soft_misses += 1;
                    debug!(
                        index,
                        selector = %self.text_selector,
                        "user message has no text container; skipping"
                    );
                }
            }
        }
        (records, report)
    }
}

impl Default for SelectorExtractor {
    fn default() -> Self {
        Self::from_config(&NavigatorConfig::default())
    }
}

impl<D: HostDocument> MessageExtractor<D> for SelectorExtractor {
    fn extract(&self, doc: &D) -> Vec<MessageRecord<D::Node>> {
        let (records, report) = self.extract_with_report(doc);
        debug!(
            scanned = report.scanned,
            user_messages = report.user_messages,
            soft_misses = report.soft_misses,
            "extraction pass complete"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ScrollOptions;
    use pretty_assertions::assert_eq;

    /// Flat list of `(role, text)` message nodes; node handles are indices.
    struct ListDoc {
        nodes: Vec<(Option<&'static str>, Option<&'static str>)>,
    }

    impl HostDocument for ListDoc {
        type Node = usize;

        fn query_all(&self, selector: &str) -> Vec<usize> {
            assert_eq!(selector, "div[data-message-author-role]");
            (0..self.nodes.len()).collect()
        }

        fn query_first(&self, _selector: &str) -> Option<usize> {
            None
        }

        fn attribute(&self, node: &usize, name: &str) -> Option<String> {
            assert_eq!(name, "data-message-author-role");
            self.nodes[*node].0.map(str::to_owned)
        }

        fn query_text(&self, node: &usize, selector: &str) -> Option<String> {
            assert_eq!(selector, ".break-words > div");
            self.nodes[*node].1.map(str::to_owned)
        }

        fn scroll_into_view(&self, _node: &usize, _options: ScrollOptions) {}
    }

    #[test]
    fn keeps_user_messages_in_document_order() {
        let doc = ListDoc {
            nodes: vec![
                (Some("user"), Some("first")),
                (Some("assistant"), Some("reply")),
                (Some("user"), Some("second")),
                (Some("system"), Some("note")),
                (Some("user"), Some("third")),
            ],
        };
        let records = SelectorExtractor::default().extract(&doc);
        let texts: Vec<_> = records.iter().map(|r| r.display_text.as_str()).collect();
        let handles: Vec<_> = records.iter().map(|r| r.source_handle).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(handles, vec![0, 2, 4]);
        assert!(records.iter().all(|r| r.author_role == AuthorRole::User));
    }

    #[test]
    fn missing_text_container_is_a_soft_miss() {
        let doc = ListDoc {
            nodes: vec![
                (Some("user"), None),
                (Some("user"), Some("  kept  ")),
                (None, Some("no role")),
            ],
        };
        let (records, report) = SelectorExtractor::default().extract_with_report(&doc);
        assert_eq!(records.len(), 1);
        assert_eq!(
            report,
            ExtractionReport {
                scanned: 3,
                user_messages: 1,
                soft_misses: 1,
            }
        );
    }

    #[test]
    fn text_is_kept_verbatim_even_when_blank() {
        let doc = ListDoc {
            nodes: vec![
                (Some("user"), Some("   \n")),
                (Some("user"), Some("  padded  ")),
            ],
        };
        let records = SelectorExtractor::default().extract(&doc);
        let texts: Vec<_> = records.iter().map(|r| r.display_text.as_str()).collect();
        assert_eq!(texts, vec!["   \n", "  padded  "]);
    }

    #[test]
    fn empty_document_yields_nothing() {
        let doc = ListDoc { nodes: Vec::new() };
        assert!(SelectorExtractor::default().extract(&doc).is_empty());
    }

    // ── Log capture ─────────────────────────────────────────────────────

    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level: tracing::Level,
        message: String,
        fields: Vec<(String, String)>,
    }

    struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

    struct FieldVisitor(Vec<(String, String)>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
        fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor(Vec::new());
            event.record(&mut visitor);
            let message = visitor
                .0
                .iter()
                .find(|(name, _)| name == "message")
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            self.0.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                message,
                fields: visitor.0,
            });
        }
    }

    fn with_captured_events(f: impl FnOnce()) -> Vec<CapturedEvent> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(EventCapture(events.clone()));
        tracing::subscriber::with_default(subscriber, f);
        let captured = events.lock().unwrap().clone();
        captured
    }

    #[test]
    fn soft_miss_is_logged_at_debug_with_index() {
        let doc = ListDoc {
            nodes: vec![(Some("user"), Some("ok")), (Some("user"), None)],
        };
        let events = with_captured_events(|| {
            SelectorExtractor::default().extract(&doc);
        });

        let miss = events
            .iter()
            .find(|e| e.message.contains("no text container"))
            .expect("soft miss logged");
        assert_eq!(miss.level, tracing::Level::DEBUG);
        assert!(miss.fields.iter().any(|(k, v)| k == "index" && v == "1"));

        let summary = events
            .iter()
            .find(|e| e.message.contains("extraction pass complete"))
            .expect("summary logged");
        assert!(
            summary
                .fields
                .iter()
                .any(|(k, v)| k == "soft_misses" && v == "1")
        );
    }
}
