//! Frame delta-time history and extrapolation.

/// Shift register of the 7 most recent raw frame delta-times, newest first.
///
/// Prediction runs a cascade of unclamped linear extrapolations from the
/// oldest sample toward the newest, so the most recent trend dominates:
/// frame pacing that is speeding up predicts a shorter next frame and vice
/// versa. A flat history predicts itself exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameTimingPredictor {
    deltas: [f32; 7],
}

impl FrameTimingPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw delta-time of the frame that just ended, discarding
    /// the oldest sample.
    pub fn push(&mut self, delta_time: f32) {
        self.deltas.rotate_right(1);
        self.deltas[0] = delta_time;
    }

    /// Extrapolate the delta-time of the next frame.
    pub fn predict_next(&self) -> f32 {
        const T: f32 = 7.0 / 6.0;
        let d = &self.deltas;
        let mut predicted = lerp_unclamped(d[6], d[5], T);
        predicted = lerp_unclamped(predicted, d[4], T);
        predicted = lerp_unclamped(predicted, d[3], T);
        predicted = lerp_unclamped(predicted, d[2], T);
        predicted = lerp_unclamped(predicted, d[1], T);
        lerp_unclamped(predicted, d[0], T)
    }
}

fn lerp_unclamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(deltas: &[f32]) -> FrameTimingPredictor {
        let mut p = FrameTimingPredictor::new();
        for &d in deltas {
            p.push(d);
        }
        p
    }

    #[test]
    fn test_constant_history_predicts_itself() {
        let p = filled(&[1.0 / 60.0; 7]);
        assert_eq!(p.predict_next(), 1.0 / 60.0);
    }

    #[test]
    fn test_push_discards_oldest() {
        let mut p = filled(&[1.0; 7]);
        for _ in 0..7 {
            p.push(2.0);
        }
        // Old samples fully flushed, so the prediction is flat again.
        assert_eq!(p.predict_next(), 2.0);
    }

    #[test]
    fn test_upward_trend_amplifies() {
        // Deltas growing by 1ms per frame; the cascade should predict past
        // the newest sample.
        let p = filled(&[0.010, 0.011, 0.012, 0.013, 0.014, 0.015, 0.016]);
        assert!(p.predict_next() > 0.016);
    }

    #[test]
    fn test_downward_trend_undershoots() {
        let p = filled(&[0.020, 0.019, 0.018, 0.017, 0.016, 0.015, 0.014]);
        assert!(p.predict_next() < 0.014);
    }
}
