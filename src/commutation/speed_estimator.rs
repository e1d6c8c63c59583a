// Rotational speed estimation from sector-1 tick deltas

use crate::commutation::TickSample;
use crate::error::Error;
use embassy_time::Instant;

/// Speed derived from the average electrical period
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedReading {
    /// Average electrical period [µs]
    pub period_us: u32,
    /// Mechanical rotational frequency [Hz]
    pub hz: f32,
    /// Mechanical speed [RPM]
    pub rpm: f32,
}

impl SpeedReading {
    /// Convert an average electrical period into mechanical speed
    ///
    /// # Arguments
    /// * `period_us` - Average electrical period [µs]
    /// * `pole_pairs` - Motor pole pairs
    ///
    /// # Returns
    /// * `Err(Error::NoSpeedData)` when the period or pole pairs are zero
    pub fn from_period(period_us: u32, pole_pairs: u8) -> Result<Self, Error> {
        if period_us == 0 || pole_pairs == 0 {
            return Err(Error::NoSpeedData);
        }

        // f = 1 / (P · p)
        let period_s = period_us as f32 * 1e-6;
        let hz = 1.0 / (period_s * pole_pairs as f32);

        Ok(Self {
            period_us,
            hz,
            rpm: 60.0 * hz,
        })
    }
}

/// Moving-average filter over the last `N` electrical periods
///
/// Every slot counts towards the average, including slots never written.
/// Readings taken before the buffer has wrapped are therefore biased low.
pub struct SpeedEstimator<const N: usize> {
    deltas: [u32; N],
    index: usize,
    previous: Option<Instant>,
}

impl<const N: usize> SpeedEstimator<N> {
    pub const fn new() -> Self {
        Self {
            deltas: [0; N],
            index: 0,
            previous: None,
        }
    }

    /// Record a sector-1 tick
    ///
    /// The first tick after construction or [`restart`](Self::restart) only
    /// sets the reference point.
    pub fn record(&mut self, tick: TickSample) {
        if let Some(previous) = self.previous {
            let delta = tick
                .at
                .checked_duration_since(previous)
                .map(|d| d.as_micros().min(u32::MAX as u64) as u32)
                .unwrap_or(0);
            self.push_delta(delta);
        }
        self.previous = Some(tick.at);
    }

    /// Store a period at the write index and advance it, wrapping at `N`
    pub fn push_delta(&mut self, delta_us: u32) {
        if N == 0 {
            return;
        }
        self.deltas[self.index] = delta_us;
        self.index = (self.index + 1) % N;
    }

    /// Forget the reference tick, keep the filter contents
    pub fn restart(&mut self) {
        self.previous = None;
    }

    /// Clear the filter
    pub fn reset(&mut self) {
        self.deltas = [0; N];
        self.index = 0;
        self.previous = None;
    }

    /// Mean of all `N` slots [µs], `None` while it is zero
    pub fn average_period_us(&self) -> Option<u32> {
        if N == 0 {
            return None;
        }
        let sum: u64 = self.deltas.iter().map(|d| *d as u64).sum();
        match (sum / N as u64) as u32 {
            0 => None,
            avg => Some(avg),
        }
    }

    /// Speed derived from the average period
    pub fn speed(&self, pole_pairs: u8) -> Result<SpeedReading, Error> {
        let period_us = self.average_period_us().ok_or(Error::NoSpeedData)?;
        SpeedReading::from_period(period_us, pole_pairs)
    }

    /// Next slot to be written
    pub fn write_index(&self) -> usize {
        self.index
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for SpeedEstimator<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tick(us: u64) -> TickSample {
        TickSample {
            at: Instant::from_micros(us),
        }
    }

    #[test]
    fn test_no_data_before_any_tick() {
        let est = SpeedEstimator::<8>::new();
        assert_eq!(est.average_period_us(), None);
        assert_eq!(est.speed(7), Err(Error::NoSpeedData));
    }

    #[test]
    fn test_single_tick_is_only_a_reference() {
        let mut est = SpeedEstimator::<8>::new();
        est.record(tick(12_345));
        assert_eq!(est.average_period_us(), None);
        assert_eq!(est.write_index(), 0);
    }

    #[test]
    fn test_full_buffer_average() {
        let mut est = SpeedEstimator::<540>::new();
        for i in 0..=540u64 {
            est.record(tick(i * 1000));
        }
        assert_eq!(est.average_period_us(), Some(1000));
        assert_eq!(est.write_index(), 0);

        let reading = est.speed(7).unwrap();
        assert_eq!(reading.period_us, 1000);
        assert_relative_eq!(reading.hz, 142.857_14, epsilon = 0.01);
        assert_relative_eq!(reading.rpm, 8571.428, epsilon = 0.1);
    }

    #[test]
    fn test_partial_buffer_is_biased_low() {
        let mut est = SpeedEstimator::<4>::new();
        est.push_delta(1000);
        est.push_delta(1000);
        assert_eq!(est.average_period_us(), Some(500));
    }

    #[test]
    fn test_ring_overwrites_oldest() {
        let mut est = SpeedEstimator::<3>::new();
        for delta in [100, 200, 300, 900] {
            est.push_delta(delta);
        }
        // 900 replaced 100
        assert_eq!(est.average_period_us(), Some((900 + 200 + 300) / 3));
        assert_eq!(est.write_index(), 1);
    }

    #[test]
    fn test_restart_drops_reference_only() {
        let mut est = SpeedEstimator::<2>::new();
        est.record(tick(0));
        est.record(tick(800));
        est.restart();
        est.record(tick(1_000_000));
        assert_eq!(est.average_period_us(), Some(400));
        est.reset();
        assert_eq!(est.average_period_us(), None);
    }

    #[test]
    fn test_zero_pole_pairs_is_no_data() {
        assert_eq!(SpeedReading::from_period(1000, 0), Err(Error::NoSpeedData));
    }
}
