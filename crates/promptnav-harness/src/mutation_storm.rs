#![forbid(unsafe_code)]

//! Deterministic mutation-batch generators.
//!
//! | Pattern | Shape |
//! |---------|-------|
//! | [`BurstPattern::StreamingReply`] | one `childList` batch per streamed token |
//! | [`BurstPattern::AttributeNoise`] | attribute/text churn that adds no nodes |
//! | [`BurstPattern::Mixed`] | noise interleaved with occasional additions |

use core::time::Duration;

use promptnav_core::{MutationKind, MutationRecord};

/// Shape of a generated storm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstPattern {
    /// Batches that each append a node, like a reply streaming in.
    StreamingReply { batches: usize },
    /// Batches that never add nodes.
    AttributeNoise { batches: usize },
    /// Every `every`-th batch adds a node; the rest are noise.
    Mixed { batches: usize, every: usize },
}

impl BurstPattern {
    /// Human-readable name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StreamingReply { .. } => "streaming_reply",
            Self::AttributeNoise { .. } => "attribute_noise",
            Self::Mixed { .. } => "mixed",
        }
    }

    const fn batch_count(&self) -> usize {
        match self {
            Self::StreamingReply { batches }
            | Self::AttributeNoise { batches }
            | Self::Mixed { batches, .. } => *batches,
        }
    }
}

/// A timed sequence of observer batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationStorm {
    pattern: BurstPattern,
    /// Time between consecutive batches.
    spacing: Duration,
}

impl MutationStorm {
    #[must_use]
    pub const fn new(pattern: BurstPattern, spacing: Duration) -> Self {
        Self { pattern, spacing }
    }

    #[must_use]
    pub const fn pattern(&self) -> BurstPattern {
        self.pattern
    }

    /// `(offset from start, batch)` pairs in delivery order.
    #[must_use]
    pub fn batches(&self) -> Vec<(Duration, Vec<MutationRecord>)> {
        (0..self.pattern.batch_count())
            .map(|i| {
                let at = self.spacing.saturating_mul(i as u32);
                (at, self.batch(i))
            })
            .collect()
    }

    /// Offset of the last batch.
    #[must_use]
    pub fn span(&self) -> Duration {
        let last = self.pattern.batch_count().saturating_sub(1);
        self.spacing.saturating_mul(last as u32)
    }

    fn batch(&self, index: usize) -> Vec<MutationRecord> {
        let noise = vec![
            MutationRecord {
                kind: MutationKind::Attributes,
                added_nodes: 0,
            },
            MutationRecord {
                kind: MutationKind::CharacterData,
                added_nodes: 0,
            },
        ];
        match self.pattern {
            BurstPattern::StreamingReply { .. } => vec![MutationRecord::child_list(1)],
            BurstPattern::AttributeNoise { .. } => noise,
            BurstPattern::Mixed { every, .. } => {
                if every > 0 && index % every == 0 {
                    let mut batch = noise;
                    batch.push(MutationRecord::child_list(1));
                    batch
                } else {
                    noise
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn streaming_batches_are_evenly_spaced() {
        let storm = MutationStorm::new(
            BurstPattern::StreamingReply { batches: 3 },
            Duration::from_millis(10),
        );
        let offsets: Vec<_> = storm.batches().into_iter().map(|(at, _)| at).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(10),
                Duration::from_millis(20)
            ]
        );
        assert_eq!(storm.span(), Duration::from_millis(20));
        assert_eq!(storm.pattern().name(), "streaming_reply");
    }

    #[test]
    fn noise_never_adds_nodes() {
        let storm = MutationStorm::new(
            BurstPattern::AttributeNoise { batches: 5 },
            Duration::from_millis(1),
        );
        assert!(
            storm
                .batches()
                .iter()
                .flat_map(|(_, batch)| batch)
                .all(|record| !record.adds_nodes())
        );
    }

    #[test]
    fn mixed_adds_on_schedule() {
        let storm = MutationStorm::new(
            BurstPattern::Mixed {
                batches: 6,
                every: 3,
            },
            Duration::from_millis(1),
        );
        let adding: Vec<_> = storm
            .batches()
            .iter()
            .map(|(_, batch)| batch.iter().any(MutationRecord::adds_nodes))
            .collect();
        assert_eq!(adding, vec![true, false, false, true, false, false]);
    }
}
