//! Commutation context shared between the control loop and the edge context
//!
//! Everything both contexts touch lives here: the output stage and the hall
//! decoder behind one blocking mutex, the speed filter behind another, and the
//! flags, sector and motor state as atomics.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::commutation::{
    HallTransitionDecoder, ModulationController, MotorState, Sector, SpeedEstimator, SpeedReading,
};
use crate::config::SPEED_FILTER_LEN;
use crate::error::Error;
use crate::hall::{HallCode, HallEdge};
use crate::phase_output::PhaseOutput;

struct OutputStage<P> {
    output: P,
    decoder: HallTransitionDecoder,
}

impl<P: PhaseOutput> OutputStage<P> {
    fn write(&mut self, sector: Sector, modulation: &ModulationController) {
        let duty = modulation.duty(self.output.max_duty());
        self.output.apply(&sector.pattern(), duty);
        self.output.set_sector_marker(sector == Sector::S1);
    }
}

/// Shared commutation context
///
/// Pattern writes happen with the output-stage lock held, so the edge context
/// and the control loop never interleave inside a write. The armed flag is
/// checked under the same lock, which orders [`force_off`](Self::force_off)
/// against in-flight edges: once `force_off` returns, no edge re-asserts a
/// pattern until the decoder is armed again.
pub struct Commutator<M: RawMutex, P: PhaseOutput, const N: usize = SPEED_FILTER_LEN> {
    stage: Mutex<M, RefCell<OutputStage<P>>>,
    speed: Mutex<M, RefCell<SpeedEstimator<N>>>,
    modulation: ModulationController,
    armed: AtomicBool,
    active: AtomicBool,
    /// Sector number, 0 while de-energized
    sector: AtomicU8,
    state: AtomicU8,
    dropped_edges: AtomicU32,
}

impl<M: RawMutex, P: PhaseOutput, const N: usize> Commutator<M, P, N> {
    pub const fn new(output: P) -> Self {
        Self {
            stage: Mutex::new(RefCell::new(OutputStage {
                output,
                decoder: HallTransitionDecoder::new(),
            })),
            speed: Mutex::new(RefCell::new(SpeedEstimator::new())),
            modulation: ModulationController::new(0),
            armed: AtomicBool::new(false),
            active: AtomicBool::new(false),
            sector: AtomicU8::new(0),
            state: AtomicU8::new(MotorState::Stopped as u8),
            dropped_edges: AtomicU32::new(0),
        }
    }

    pub fn modulation(&self) -> &ModulationController {
        &self.modulation
    }

    /// Write the pattern of `sector` with the current modulation
    ///
    /// Used by the forced sequencer. Skipped once the motor has been stopped.
    ///
    /// # Returns
    /// * `true` if the pattern was written
    pub fn write_sector(&self, sector: Sector) -> bool {
        self.stage.lock(|stage| {
            if self.motor_state() == MotorState::Stopped {
                return false;
            }
            stage.borrow_mut().write(sector, &self.modulation);
            self.sector.store(sector.number(), Ordering::Release);
            true
        })
    }

    /// Register the decoder against hall edges
    ///
    /// Clears the active flag and the decoder, optionally seeding the tracked
    /// hall code from a direct read of the sensors. The speed filter keeps its
    /// contents; only its reference tick is dropped.
    ///
    /// # Returns
    /// * `false` if the motor was stopped in the meantime; nothing is armed
    pub fn arm(&self, seed: Option<HallCode>) -> bool {
        let armed = self.stage.lock(|stage| {
            if self.motor_state() == MotorState::Stopped {
                return false;
            }
            let mut stage = stage.borrow_mut();
            stage.decoder.reset();
            if let Some(code) = seed {
                stage.decoder.seed(code);
            }
            self.active.store(false, Ordering::Release);
            self.speed.lock(|speed| speed.borrow_mut().restart());
            self.armed.store(true, Ordering::Release);
            true
        });
        if armed {
            debug!("Hall decoder armed");
        }
        armed
    }

    /// Deregister the decoder and de-energize every phase
    ///
    /// Callable from any context. Publishes [`MotorState::Stopped`].
    pub fn force_off(&self) {
        self.armed.store(false, Ordering::Release);
        self.stage.lock(|stage| {
            self.set_motor_state(MotorState::Stopped);
            stage.borrow_mut().output.all_off();
            self.sector.store(0, Ordering::Release);
            self.active.store(false, Ordering::Release);
        });
    }

    /// Process one hall edge from the edge context
    ///
    /// # Returns
    /// * `Some(sector)` when a pattern was written
    /// * `None` when the decoder is not armed or the edge was ignored
    pub fn handle_edge(&self, edge: &HallEdge) -> Option<Sector> {
        self.stage.lock(|stage| {
            if !self.armed.load(Ordering::Acquire) {
                return None;
            }
            let mut stage = stage.borrow_mut();
            let transition = stage.decoder.update(edge)?;
            stage.write(transition.sector, &self.modulation);
            self.sector.store(transition.sector.number(), Ordering::Release);
            self.active.store(true, Ordering::Release);
            // Recorded under the stage lock so a concurrent re-arm cannot
            // pick up a tick from before the restart
            if let Some(tick) = transition.tick {
                self.speed.lock(|speed| speed.borrow_mut().record(tick));
            }
            Some(transition.sector)
        })
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Whether a recognized edge arrived since the last [`arm`](Self::arm)
    pub fn decoder_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Sector currently applied, `None` while de-energized
    pub fn sector(&self) -> Option<Sector> {
        Sector::new(self.sector.load(Ordering::Acquire))
    }

    /// Hall code tracked by the decoder
    pub fn hall_code(&self) -> HallCode {
        self.stage.lock(|stage| stage.borrow().decoder.hall_code())
    }

    pub fn average_period_us(&self) -> Option<u32> {
        self.speed.lock(|speed| speed.borrow().average_period_us())
    }

    pub fn speed(&self, pole_pairs: u8) -> Result<SpeedReading, Error> {
        self.speed.lock(|speed| speed.borrow().speed(pole_pairs))
    }

    /// Run `f` with exclusive access to the phase output
    pub fn with_output<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        self.stage.lock(|stage| f(&mut stage.borrow_mut().output))
    }

    /// Published motor state
    pub fn motor_state(&self) -> MotorState {
        MotorState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_motor_state(&self, state: MotorState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to`, failing if another context changed the state
    pub(crate) fn transition(&self, from: MotorState, to: MotorState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Count an edge the edge context had to drop
    pub fn note_dropped_edge(&self) {
        self.dropped_edges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_edges(&self) -> u32 {
        self.dropped_edges.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commutation::Phase;
    use crate::config::MODULATION_UNITY;
    use crate::hall::HallLine;
    use crate::test_support::{forward_edges, RecordingOutput, TEST_MAX_DUTY};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::Instant;

    type TestCommutator = Commutator<CriticalSectionRawMutex, RecordingOutput, 4>;

    fn running() -> TestCommutator {
        let c = TestCommutator::new(RecordingOutput::new());
        c.modulation().set(MODULATION_UNITY as i64 / 2);
        c.set_motor_state(MotorState::ClosedLoopRunning);
        c
    }

    #[test]
    fn test_edges_ignored_until_armed() {
        let c = running();
        let edge = HallEdge::rising(HallLine::C, Instant::from_micros(0));
        assert_eq!(c.handle_edge(&edge), None);
        assert!(!c.decoder_active());
        assert!(c.with_output(|o| o.is_de_energized()));

        assert!(c.arm(None));
        assert_eq!(c.handle_edge(&edge), Some(Sector::S1));
        assert!(c.decoder_active());
        assert_eq!(c.sector(), Some(Sector::S1));
    }

    #[test]
    fn test_edge_writes_pattern_and_marker() {
        let c = running();
        c.arm(None);
        c.handle_edge(&HallEdge::rising(HallLine::C, Instant::from_micros(0)));
        c.with_output(|o| {
            assert_eq!(o.enables, [true, false, true]);
            assert_eq!(o.enabled_count(), 2);
            assert_eq!(o.duties[Phase::U.index()], TEST_MAX_DUTY / 2);
            assert_eq!(o.duties[Phase::W.index()], 0);
            assert!(o.marker);
        });

        c.handle_edge(&HallEdge::falling(HallLine::B, Instant::from_micros(100)));
        c.with_output(|o| {
            assert_eq!(o.enables, [false, true, true]);
            assert_eq!(o.duties[Phase::V.index()], TEST_MAX_DUTY / 2);
            assert!(!o.marker);
        });
    }

    #[test]
    fn test_ignored_event_keeps_pattern() {
        let c = running();
        c.arm(None);
        c.handle_edge(&HallEdge::falling(HallLine::B, Instant::from_micros(0)));
        let before = c.with_output(|o| (o.enables, o.duties));
        assert_eq!(
            c.handle_edge(&HallEdge::unchanged(HallLine::A, Instant::from_micros(10))),
            None
        );
        assert_eq!(c.with_output(|o| (o.enables, o.duties)), before);
        assert_eq!(c.sector(), Some(Sector::S2));
    }

    #[test]
    fn test_ticks_feed_speed_filter() {
        let c = running();
        c.arm(None);
        // 5 electrical cycles of 6 edges at 100 µs
        for edge in forward_edges(0, 100, 31) {
            c.handle_edge(&edge);
        }
        assert_eq!(c.average_period_us(), Some(600));
        let reading = c.speed(1).unwrap();
        assert_eq!(reading.period_us, 600);
    }

    #[test]
    fn test_rearm_drops_reference_tick() {
        let c = running();
        c.arm(None);
        // One 600 µs period in a 4-slot filter
        for edge in forward_edges(0, 100, 7) {
            c.handle_edge(&edge);
        }
        assert_eq!(c.average_period_us(), Some(150));

        c.force_off();
        c.set_motor_state(MotorState::ClosedLoopRunning);
        assert!(c.arm(None));

        // The first sector-1 entry after the restart only sets the reference
        let edges = forward_edges(1_000_000, 100, 7);
        c.handle_edge(&edges[0]);
        assert_eq!(c.average_period_us(), Some(150));
        for edge in &edges[1..] {
            c.handle_edge(edge);
        }
        assert_eq!(c.average_period_us(), Some(300));
    }

    #[test]
    fn test_speed_without_edges_is_no_data() {
        let c = running();
        assert_eq!(c.speed(7), Err(Error::NoSpeedData));
    }

    #[test]
    fn test_force_off_disarms_and_de_energizes() {
        let c = running();
        c.arm(None);
        for edge in forward_edges(0, 100, 3) {
            c.handle_edge(&edge);
        }
        c.force_off();

        assert!(!c.is_armed());
        assert_eq!(c.sector(), None);
        assert_eq!(c.motor_state(), MotorState::Stopped);
        assert!(c.with_output(|o| o.is_de_energized() && !o.marker));

        for edge in forward_edges(300, 100, 6) {
            assert_eq!(c.handle_edge(&edge), None);
        }
        assert!(c.with_output(|o| o.is_de_energized()));
    }

    #[test]
    fn test_write_sector_and_arm_refused_after_stop() {
        let c = running();
        c.force_off();
        assert!(!c.write_sector(Sector::S3));
        assert!(!c.arm(None));
        assert!(c.with_output(|o| o.is_de_energized()));
    }

    #[test]
    fn test_arm_seeds_hall_code() {
        let c = running();
        c.arm(Some(HallCode::new(0b010)));
        assert_eq!(c.hall_code().bits(), 0b010);
        c.handle_edge(&HallEdge::rising(HallLine::C, Instant::from_micros(0)));
        assert_eq!(c.hall_code().bits(), 0b011);
    }

    #[test]
    fn test_force_off_races_edge_context() {
        let c = running();
        c.arm(None);
        let edges = forward_edges(0, 10, 5000);

        std::thread::scope(|s| {
            s.spawn(|| {
                for edge in &edges {
                    c.handle_edge(edge);
                }
            });
            s.spawn(|| {
                std::thread::yield_now();
                c.force_off();
            });
        });

        // Whatever the interleaving, nothing is re-asserted after force_off
        assert!(!c.is_armed());
        assert!(c.with_output(|o| o.is_de_energized()));
        let enables = c.with_output(|o| o.enable_count);
        for edge in forward_edges(50_000, 10, 12) {
            c.handle_edge(&edge);
        }
        assert_eq!(c.with_output(|o| o.enable_count), enables);
    }

    #[test]
    fn test_dropped_edges_counter() {
        let c = running();
        c.note_dropped_edge();
        c.note_dropped_edge();
        assert_eq!(c.dropped_edges(), 2);
    }
}
