//! Annotation emitter
//!
//! Converts detector matches from bar indices to `{timestamp, value}` points
//! and hands them to the rendering collaborator, one annotation per match.

use serde::Serialize;

use crate::{Direction, PatternId, PatternKind, PatternMatch, OHLCV};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotationPoint {
    pub timestamp: i64,
    pub value: f64,
}

/// Label data for colour/label selection only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotationMetadata {
    pub pattern: PatternId,
    pub kind: PatternKind,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub points: Vec<AnnotationPoint>,
    pub label: String,
    pub metadata: AnnotationMetadata,
}

/// Receiver of annotations (the rendering collaborator).
pub trait AnnotationSink {
    fn create_annotation(&mut self, annotation: Annotation);
}

impl AnnotationSink for Vec<Annotation> {
    fn create_annotation(&mut self, annotation: Annotation) {
        self.push(annotation);
    }
}

/// `None` if any point indexes past the end of `bars`.
pub fn to_annotation<T: OHLCV>(bars: &[T], m: &PatternMatch) -> Option<Annotation> {
    let points = m
        .points
        .iter()
        .map(|p| {
            bars.get(p.index).map(|bar| AnnotationPoint {
                timestamp: bar.timestamp(),
                value: p.value,
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(Annotation {
        points,
        label: m.pattern_id.to_string(),
        metadata: AnnotationMetadata {
            pattern: m.pattern_id,
            kind: m.kind,
            direction: m.direction,
        },
    })
}

/// Annotations for every mappable match, in match order.
pub fn to_annotations<T: OHLCV>(bars: &[T], matches: &[PatternMatch]) -> Vec<Annotation> {
    matches.iter().filter_map(|m| to_annotation(bars, m)).collect()
}

/// Send one annotation per match to `sink`; returns how many were sent.
pub fn emit<T, S>(bars: &[T], matches: &[PatternMatch], sink: &mut S) -> usize
where
    T: OHLCV,
    S: AnnotationSink + ?Sized,
{
    let mut sent = 0;
    for annotation in matches.iter().filter_map(|m| to_annotation(bars, m)) {
        sink.create_annotation(annotation);
        sent += 1;
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bar, PatternPoint};

    fn bars() -> Vec<Bar> {
        (0..3)
            .map(|i| Bar::new(1_000 + i * 60, 10.0, 11.0, 9.0, 10.5, 1.0))
            .collect()
    }

    fn doji_at(index: usize) -> PatternMatch {
        PatternMatch {
            pattern_id: PatternId::DOJI,
            kind: PatternKind::Candlestick,
            direction: Direction::Neutral,
            points: vec![PatternPoint::new(index, 11.0)],
        }
    }

    #[test]
    fn test_points_use_bar_timestamps() {
        let a = to_annotation(&bars(), &doji_at(2)).unwrap();
        assert_eq!(a.label, "Doji");
        assert_eq!(a.points, vec![AnnotationPoint { timestamp: 1_120, value: 11.0 }]);
        assert_eq!(a.metadata.direction, Direction::Neutral);
    }

    #[test]
    fn test_out_of_range_match_is_dropped() {
        let mut sink: Vec<Annotation> = Vec::new();
        let sent = emit(&bars(), &[doji_at(1), doji_at(7)], &mut sink);
        assert_eq!(sent, 1);
        assert_eq!(sink.len(), 1);
    }
}
