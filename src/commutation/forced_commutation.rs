// Open-loop forced commutation used to spin the rotor up before hall-sensor
// commutation takes over

use embassy_time::Duration;

use crate::commutation::Sector;
use crate::config::DriveConfig;
use crate::timebase::Timebase;

/// Fixed-rate sector sequencer
///
/// Walks sectors 1 → 6 for `repetitions × pole_pairs` electrical cycles,
/// holding each sector for `dwell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedCommutation {
    repetitions: u32,
    pole_pairs: u8,
    dwell: Duration,
}

impl ForcedCommutation {
    pub const fn new(repetitions: u32, pole_pairs: u8, dwell: Duration) -> Self {
        Self {
            repetitions,
            pole_pairs,
            dwell,
        }
    }

    pub const fn from_config(config: &DriveConfig) -> Self {
        Self::new(
            config.forced_repetitions,
            config.pole_pairs,
            config.forced_dwell,
        )
    }

    /// Number of sector writes the sequencer performs
    pub const fn total_steps(&self) -> u32 {
        self.repetitions
            .saturating_mul(self.pole_pairs as u32)
            .saturating_mul(6)
    }

    pub const fn dwell(&self) -> Duration {
        self.dwell
    }

    /// Sectors in the order they are written
    pub fn sequence(&self) -> impl Iterator<Item = Sector> {
        Sector::ALL.into_iter().cycle().take(self.total_steps() as usize)
    }

    /// Run the sequence
    ///
    /// Each step writes the sector and then waits until `dwell` has elapsed
    /// since the step started, so the time spent in `write` counts towards
    /// the dwell.
    ///
    /// # Returns
    /// Number of steps written
    pub async fn run<T: Timebase>(&self, timer: &mut T, mut write: impl FnMut(Sector)) -> u32 {
        debug!(
            "Forced commutation: {} steps, dwell {} us",
            self.total_steps(),
            self.dwell.as_micros()
        );

        let mut written = 0;
        for sector in self.sequence() {
            let start = timer.now();
            write(sector);
            written += 1;
            timer.wait_until(start + self.dwell).await;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTimebase;
    use embassy_futures::block_on;

    #[test]
    fn test_total_steps() {
        let seq = ForcedCommutation::new(8, 7, Duration::from_micros(100));
        assert_eq!(seq.total_steps(), 336);
        assert_eq!(seq.sequence().count(), 336);

        let seq = ForcedCommutation::from_config(&DriveConfig::default());
        assert_eq!(seq.total_steps(), 8 * 7 * 6);
    }

    #[test]
    fn test_sequence_order() {
        let seq = ForcedCommutation::new(2, 1, Duration::from_micros(100));
        let numbers: Vec<u8> = seq.sequence().map(Sector::number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_run_waits_dwell_per_step() {
        let mut timer = FakeTimebase::new();
        let clock = timer.clock();
        let seq = ForcedCommutation::new(2, 1, Duration::from_micros(100));

        let mut writes = Vec::new();
        let written = block_on(seq.run(&mut timer, |sector| {
            writes.push((sector.number(), clock.get().as_micros()));
        }));

        assert_eq!(written, 12);
        assert_eq!(writes.len(), 12);
        for (i, (number, at)) in writes.iter().enumerate() {
            assert_eq!(*number as usize, i % 6 + 1);
            assert_eq!(*at, i as u64 * 100);
        }
        assert_eq!(timer.now().as_micros(), 1200);
    }

    #[test]
    fn test_run_with_zero_repetitions_writes_nothing() {
        let mut timer = FakeTimebase::new();
        let seq = ForcedCommutation::new(0, 7, Duration::from_micros(100));
        let written = block_on(seq.run(&mut timer, |_| panic!("unexpected write")));
        assert_eq!(written, 0);
    }
}
