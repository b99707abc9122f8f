use std::time::Instant;

/// High-level behaviour requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RenderPolicy {
    /// Time advances every frame.
    #[default]
    Animate,
    /// Every frame is evaluated at the same timestamp (seconds).
    Still { time: f32 },
}

/// Snapshot of the clock handed to the host for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds since the source started.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
    /// Whether consecutive samples can differ; still sources never do.
    fn is_animated(&self) -> bool {
        true
    }
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    /// Creates a system time source initialised to `Instant::now()`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let elapsed = self.origin.elapsed();
        let sample = TimeSample::new(elapsed.as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }

    fn is_animated(&self) -> bool {
        false
    }
}

/// Simulated clock advancing by a constant step per sample, starting at zero.
#[derive(Debug, Clone, Copy)]
pub struct SteppedTimeSource {
    step: f32,
    frame: u64,
}

impl SteppedTimeSource {
    /// Non-finite or negative steps are treated as zero.
    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() { step.max(0.0) } else { 0.0 };
        Self { step, frame: 0 }
    }
}

impl TimeSource for SteppedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        // Multiply rather than accumulate so long runs do not drift.
        let sample = TimeSample::new(self.frame as f32 * self.step, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_time_never_goes_backwards() {
        let mut source = SystemTimeSource::new();
        let mut previous = source.sample();
        for _ in 0..100 {
            let next = source.sample();
            assert!(next.seconds >= previous.seconds);
            assert_eq!(next.frame_index, previous.frame_index + 1);
            previous = next;
        }
    }

    #[test]
    fn reset_restarts_frame_counter() {
        let mut source = SteppedTimeSource::new(0.25);
        source.sample();
        source.sample();
        source.reset();
        assert_eq!(source.sample(), TimeSample::new(0.0, 0));
    }

    #[test]
    fn stepped_source_rejects_bad_steps() {
        let mut source = SteppedTimeSource::new(f32::NAN);
        source.sample();
        assert_eq!(source.sample().seconds, 0.0);
        let mut negative = SteppedTimeSource::new(-1.0);
        negative.sample();
        assert_eq!(negative.sample().seconds, 0.0);
    }

    #[test]
    fn fixed_source_reports_its_time() {
        let mut source = FixedTimeSource::new(2.5);
        assert_eq!(source.time(), 2.5);
        assert_eq!(source.sample(), TimeSample::new(2.5, 0));
        assert_eq!(source.sample(), TimeSample::new(2.5, 1));
        assert!(!source.is_animated());
    }
}
