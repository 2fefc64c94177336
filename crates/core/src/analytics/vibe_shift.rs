use super::THRESHOLD_EPSILON;
use crate::config::ShiftThreshold;
use crate::transcript::SentimentSegment;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShiftDirection {
    Improving,
    Worsening,
}

/// A sentiment jump between two adjacent segments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VibeShiftEvent {
    pub from: SentimentSegment,
    pub to: SentimentSegment,
    /// `to.score - from.score`
    pub delta: f64,
    pub direction: ShiftDirection,
}

/// Emits one event per adjacent pair whose score delta reaches the threshold
/// (inclusive), in timeline order.
pub fn detect_vibe_shifts(
    segments: &[SentimentSegment],
    threshold: ShiftThreshold,
) -> Vec<VibeShiftEvent> {
    segments
        .windows(2)
        .filter_map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            let delta = to.score - from.score;
            if delta.abs() + THRESHOLD_EPSILON < threshold.value() {
                return None;
            }
            let direction = if delta < 0.0 {
                ShiftDirection::Worsening
            } else {
                ShiftDirection::Improving
            };
            Some(VibeShiftEvent {
                from: from.clone(),
                to: to.clone(),
                delta,
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{SentimentLabel, TranscriptSegment};
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn timeline(scores: &[f64]) -> Vec<SentimentSegment> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| SentimentSegment {
                segment: TranscriptSegment::new(format!("seg{}", i + 1), i * 10, i * 10 + 9),
                label: SentimentLabel::from_score(score),
                score,
            })
            .collect()
    }

    fn threshold(v: f64) -> ShiftThreshold {
        ShiftThreshold::new(v).expect("valid threshold")
    }

    #[test]
    fn positive_to_neutral_drop_is_worsening() {
        let shifts = detect_vibe_shifts(&timeline(&[0.6, 0.1]), threshold(0.4));
        assert_eq!(shifts.len(), 1);
        assert_relative_eq!(shifts[0].delta, -0.5, epsilon = 1e-12);
        assert_eq!(shifts[0].direction, ShiftDirection::Worsening);
        assert_eq!(shifts[0].from.text(), "seg1");
        assert_eq!(shifts[0].to.text(), "seg2");
    }

    #[test]
    fn rise_is_improving() {
        let shifts = detect_vibe_shifts(&timeline(&[-0.6, 0.2]), threshold(0.4));
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].direction, ShiftDirection::Improving);
        assert!(shifts[0].delta > 0.0);
    }

    #[test]
    fn delta_exactly_at_threshold_counts() {
        // 0.25 and 0.75 are exact in binary, so the delta is exactly 0.5.
        let shifts = detect_vibe_shifts(&timeline(&[0.25, 0.75, 0.25]), threshold(0.5));
        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].delta, 0.5);
        assert_eq!(shifts[1].delta, -0.5);
    }

    #[test]
    fn delta_at_threshold_counts_despite_rounding() {
        let shifts = detect_vibe_shifts(&timeline(&[0.5, 0.1]), threshold(0.4));
        assert_eq!(shifts.len(), 1);
    }

    #[test]
    fn delta_just_below_threshold_is_ignored() {
        let shifts = detect_vibe_shifts(&timeline(&[0.25, 0.7499]), threshold(0.5));
        assert!(shifts.is_empty());
    }

    #[test]
    fn fewer_than_two_segments_yield_nothing() {
        assert!(detect_vibe_shifts(&[], threshold(0.1)).is_empty());
        assert!(detect_vibe_shifts(&timeline(&[0.9]), threshold(0.1)).is_empty());
    }

    #[rstest]
    #[case(&[0.9, -0.9, 0.9, -0.9, 0.9])]
    #[case(&[0.0, 0.0, 0.0])]
    #[case(&[-1.0, 1.0])]
    #[case(&[0.1, 0.6, 0.2, -0.3, -0.3, 0.8])]
    fn never_more_than_n_minus_one_events(#[case] scores: &[f64]) {
        let n = scores.len();
        let shifts = detect_vibe_shifts(&timeline(scores), threshold(0.01));
        assert!(shifts.len() <= n - 1);
    }

    #[test]
    fn oscillating_timeline_shifts_at_every_pair() {
        let shifts = detect_vibe_shifts(&timeline(&[0.9, -0.9, 0.9, -0.9]), threshold(0.4));
        let directions: Vec<_> = shifts.iter().map(|s| s.direction).collect();
        assert_eq!(
            directions,
            [
                ShiftDirection::Worsening,
                ShiftDirection::Improving,
                ShiftDirection::Worsening
            ]
        );
    }

    #[test]
    fn sample_meeting_timeline() {
        let shifts = detect_vibe_shifts(&timeline(&[0.6, 0.1, -0.7, -0.5]), threshold(0.4));
        let pairs: Vec<_> = shifts
            .iter()
            .map(|s| (s.from.text().to_owned(), s.to.text().to_owned()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("seg1".to_owned(), "seg2".to_owned()),
                ("seg2".to_owned(), "seg3".to_owned())
            ]
        );
    }
}
