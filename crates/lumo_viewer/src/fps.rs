//! Frame rate tracking.

/// Counts frames and reports once per elapsed second.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    total_seconds: f64,
    current_seconds: f64,
    frames_drawn: u64,
    frames_per_second: f64,
    overflow: bool,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame that took `seconds`.
    pub fn update(&mut self, seconds: f64) {
        self.total_seconds += seconds;
        self.current_seconds += seconds;
        self.overflow = self.current_seconds > 1.0;

        self.frames_drawn += 1;
        self.frames_per_second = if seconds > 0.0 { 1.0 / seconds } else { 0.0 };

        self.current_seconds %= 1.0;
    }

    /// Rate implied by the last frame alone.
    pub fn current_fps(&self) -> f64 {
        self.frames_per_second
    }

    /// Seconds into the current one-second window.
    pub fn current_time(&self) -> f64 {
        self.current_seconds
    }

    pub fn average_fps(&self) -> f64 {
        if self.total_seconds > 0.0 {
            self.frames_drawn as f64 / self.total_seconds
        } else {
            0.0
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// True when the last update crossed a one-second boundary.
    pub fn overflow(&self) -> bool {
        self.overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_once_per_second() {
        let mut fps = FpsCounter::new();
        let mut overflows = 0;

        // 0.375 is exact in binary, so the window sums carry no rounding
        for _ in 0..10 {
            fps.update(0.375);
            if fps.overflow() {
                overflows += 1;
            }
        }

        // Window passes 1.0 on frames 3 and 6, lands exactly on 1.0 on frame 8
        assert_eq!(overflows, 2);
        assert_eq!(fps.frames_drawn(), 10);
        assert_eq!(fps.average_fps(), 10.0 / 3.75);
        assert_eq!(fps.current_fps(), 1.0 / 0.375);
        assert_eq!(fps.current_time(), 0.75);
    }

    #[test]
    fn test_exact_second_does_not_overflow() {
        let mut fps = FpsCounter::new();
        for _ in 0..3 {
            fps.update(0.25);
            assert!(!fps.overflow());
        }

        fps.update(0.25);
        assert!(!fps.overflow());
        assert_eq!(fps.current_time(), 0.0);

        fps.update(1.5);
        assert!(fps.overflow());
        assert_eq!(fps.current_time(), 0.5);
    }

    #[test]
    fn test_zero_length_frame() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.average_fps(), 0.0);

        fps.update(0.0);
        assert_eq!(fps.current_fps(), 0.0);
        assert!(!fps.overflow());
    }
}
