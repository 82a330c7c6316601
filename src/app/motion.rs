use super::config::FILTER_WINDOW;
use super::types::SensorSample;

/// Fixed-size FIFO moving average over one axis. The window never grows past
/// `FILTER_WINDOW`; the average of an empty window is zero.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AxisFilter {
    window: [i32; FILTER_WINDOW],
    len: usize,
    next: usize,
    sum: i32,
}

impl AxisFilter {
    pub(crate) const fn new() -> Self {
        Self {
            window: [0; FILTER_WINDOW],
            len: 0,
            next: 0,
            sum: 0,
        }
    }

    pub(crate) fn push(&mut self, value: i32) {
        if self.len == FILTER_WINDOW {
            self.sum -= self.window[self.next];
        } else {
            self.len += 1;
        }
        self.window[self.next] = value;
        self.sum += value;
        self.next = (self.next + 1) % FILTER_WINDOW;
    }

    pub(crate) fn average(&self) -> i32 {
        if self.len == 0 {
            return 0;
        }
        self.sum / self.len as i32
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

/// One filter per accelerometer axis, pushed together on every poll.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FilterBank {
    x: AxisFilter,
    y: AxisFilter,
    z: AxisFilter,
}

impl FilterBank {
    pub(crate) const fn new() -> Self {
        Self {
            x: AxisFilter::new(),
            y: AxisFilter::new(),
            z: AxisFilter::new(),
        }
    }

    pub(crate) fn push(&mut self, sample: SensorSample) {
        self.x.push(sample.x);
        self.y.push(sample.y);
        self.z.push(sample.z);
    }

    pub(crate) fn average(&self) -> SensorSample {
        SensorSample::new(self.x.average(), self.y.average(), self.z.average())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_averages_to_zero() {
        let filter = AxisFilter::new();
        assert_eq!(filter.len(), 0);
        assert_eq!(filter.average(), 0);
    }

    #[test]
    fn window_length_is_capped_at_configured_size() {
        let mut filter = AxisFilter::new();
        for value in 0..20 {
            filter.push(value);
            assert!(filter.len() <= FILTER_WINDOW);
        }
        assert_eq!(filter.len(), FILTER_WINDOW);
    }

    #[test]
    fn step_input_converges_within_window_size_ticks() {
        let mut filter = AxisFilter::new();
        for _ in 0..FILTER_WINDOW {
            filter.push(0);
        }
        // FIFO eviction: each step pushes out one old zero.
        let expected = [20, 40, 60, 80, 100];
        for (tick, want) in expected.into_iter().enumerate() {
            filter.push(100);
            assert_eq!(filter.average(), want, "tick {tick}");
        }
        assert_eq!(filter.average(), 100);
    }

    #[test]
    fn average_reflects_only_most_recent_samples() {
        let mut filter = AxisFilter::new();
        for value in [500, 500, 500, 10, 20, 30, 40, 50] {
            filter.push(value);
        }
        assert_eq!(filter.average(), (10 + 20 + 30 + 40 + 50) / 5);
    }

    #[test]
    fn bank_tracks_axes_independently() {
        let mut bank = FilterBank::new();
        bank.push(SensorSample::new(100, -40, 1000));
        bank.push(SensorSample::new(200, -60, 1000));
        assert_eq!(bank.average(), SensorSample::new(150, -50, 1000));
    }
}
