// Host-side doubles for the output stage and the timebase

use core::cell::Cell;
use std::rc::Rc;

use embassy_time::Instant;

use crate::commutation::Phase;
use crate::hall::{HallCode, HallEdge, HallLine};
use crate::hall_input::HallInput;
use crate::phase_output::PhaseOutput;
use crate::timebase::Timebase;

// Provides the critical-section implementation for CriticalSectionRawMutex
use critical_section as _;

pub const TEST_MAX_DUTY: u16 = 1000;

/// Phase output that records every call
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub enables: [bool; 3],
    pub duties: [u16; 3],
    pub marker: bool,
    /// Number of times a phase was switched on
    pub enable_count: usize,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled_count(&self) -> usize {
        self.enables.iter().filter(|e| **e).count()
    }

    pub fn is_de_energized(&self) -> bool {
        self.enables == [false; 3] && self.duties == [0; 3]
    }
}

impl PhaseOutput for RecordingOutput {
    fn max_duty(&self) -> u16 {
        TEST_MAX_DUTY
    }

    fn set_duty(&mut self, phase: Phase, duty: u16) {
        self.duties[phase.index()] = duty;
    }

    fn set_enable(&mut self, phase: Phase, enabled: bool) {
        if enabled {
            self.enable_count += 1;
        }
        self.enables[phase.index()] = enabled;
    }

    fn set_sector_marker(&mut self, high: bool) {
        self.marker = high;
    }
}

/// Hall sensors stuck at one code
#[derive(Debug)]
pub struct FixedHallInput(pub HallCode);

impl FixedHallInput {
    pub fn new(bits: u8) -> Self {
        Self(HallCode::new(bits))
    }
}

impl HallInput for FixedHallInput {
    fn read(&mut self) -> HallCode {
        self.0
    }
}

/// Simulated clock; `wait_until` jumps straight to the deadline
pub struct FakeTimebase<'a> {
    clock: Rc<Cell<Instant>>,
    on_wait: Option<Box<dyn FnMut(Instant) + 'a>>,
}

impl<'a> FakeTimebase<'a> {
    pub fn new() -> Self {
        Self {
            clock: Rc::new(Cell::new(Instant::from_micros(0))),
            on_wait: None,
        }
    }

    /// Call `hook` with the deadline each time a wait completes
    pub fn with_hook(hook: impl FnMut(Instant) + 'a) -> Self {
        Self {
            on_wait: Some(Box::new(hook)),
            ..Self::new()
        }
    }

    /// Shared handle to the simulated clock
    pub fn clock(&self) -> Rc<Cell<Instant>> {
        self.clock.clone()
    }
}

impl Timebase for FakeTimebase<'_> {
    fn now(&self) -> Instant {
        self.clock.get()
    }

    async fn wait_until(&mut self, deadline: Instant) {
        if deadline > self.clock.get() {
            self.clock.set(deadline);
        }
        if let Some(hook) = self.on_wait.as_mut() {
            hook(deadline);
        }
    }
}

/// Hall edges of forward rotation: C↑ B↓ A↑ C↓ B↑ A↓, repeating
pub fn forward_edges(start_us: u64, step_us: u64, count: usize) -> Vec<HallEdge> {
    const ORDER: [(HallLine, bool); 6] = [
        (HallLine::C, true),
        (HallLine::B, false),
        (HallLine::A, true),
        (HallLine::C, false),
        (HallLine::B, true),
        (HallLine::A, false),
    ];

    (0..count)
        .map(|i| {
            let (line, high) = ORDER[i % ORDER.len()];
            let at = Instant::from_micros(start_us + i as u64 * step_us);
            if high {
                HallEdge::rising(line, at)
            } else {
                HallEdge::falling(line, at)
            }
        })
        .collect()
}
