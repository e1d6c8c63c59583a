//! Motor lifecycle: forced start, hand-over to hall commutation, stop
//!
//! ```text
//! Stopped ──start──▶ ForcedStart ──edge seen──▶ ClosedLoopRunning
//!    ▲                    │                            │
//!    └──── no edge ───────┘                            │
//!    └──────────────── stop / shutdown / force_off ────┘
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::command::{Command, Response};
use crate::commutation::{ForcedCommutation, MotorState};
use crate::commutator::Commutator;
use crate::config::{DriveConfig, SPEED_FILTER_LEN};
use crate::error::Error;
use crate::hall::HallCode;
use crate::hall_input::HallInput;
use crate::phase_output::PhaseOutput;
use crate::timebase::Timebase;

/// Drives state transitions from the control loop
///
/// The motor state itself is published by the [`Commutator`], so a
/// [`force_off`](Commutator::force_off) from another context is seen here on
/// the next call.
pub struct CommutationSupervisor<
    'a,
    M: RawMutex,
    P: PhaseOutput,
    H: HallInput,
    const N: usize = SPEED_FILTER_LEN,
> {
    commutator: &'a Commutator<M, P, N>,
    hall: H,
    config: DriveConfig,
    sequencer: ForcedCommutation,
}

impl<'a, M: RawMutex, P: PhaseOutput, H: HallInput, const N: usize>
    CommutationSupervisor<'a, M, P, H, N>
{
    pub fn new(
        commutator: &'a Commutator<M, P, N>,
        hall: H,
        config: DriveConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            commutator,
            hall,
            config,
            sequencer: ForcedCommutation::from_config(&config),
        })
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn state(&self) -> MotorState {
        self.commutator.motor_state()
    }

    /// Execute one operator command
    pub async fn execute<T: Timebase>(
        &mut self,
        command: Command,
        timer: &mut T,
    ) -> Result<Response, Error> {
        match command {
            Command::Start => self.start(timer).await,
            Command::Stop => Ok(self.stop()),
            Command::RaiseModulation => Ok(self.raise_modulation()),
            Command::LowerModulation => Ok(self.lower_modulation()),
            Command::QuerySpeed => self.speed(),
            Command::Shutdown => Ok(self.shutdown()),
        }
    }

    /// Forced start followed by the hand-over to hall-sensor commutation
    ///
    /// Blocks for the forced sequence plus the confirmation delay. If no hall
    /// edge is decoded within the delay the phases are switched off and
    /// `Err(Error::StartupFailed)` is returned.
    pub async fn start<T: Timebase>(&mut self, timer: &mut T) -> Result<Response, Error> {
        if !self
            .commutator
            .transition(MotorState::Stopped, MotorState::ForcedStart)
        {
            debug!("Start ignored: already running");
            return Ok(Response::AlreadyRunning);
        }

        info!(
            "Forced start: {} steps at modulation {}",
            self.sequencer.total_steps(),
            self.config.forced_modulation
        );
        let commutator = self.commutator;
        commutator
            .modulation()
            .set(self.config.forced_modulation as i64);
        self.sequencer
            .run(timer, |sector| {
                commutator.write_sector(sector);
            })
            .await;
        info!("Forced start finished");

        commutator
            .modulation()
            .set(self.config.closed_loop_modulation as i64);
        if !commutator.arm(self.read_hall_code()) {
            return Err(self.fail_start());
        }

        let deadline = timer.now() + self.config.confirmation_delay;
        timer.wait_until(deadline).await;

        if !commutator.decoder_active()
            || !commutator.transition(MotorState::ForcedStart, MotorState::ClosedLoopRunning)
        {
            return Err(self.fail_start());
        }

        info!(
            "Hall commutation running, code {}",
            commutator.hall_code().bits()
        );
        Ok(Response::Started)
    }

    /// Sensor code to seed the decoder with, `None` if the read is invalid
    fn read_hall_code(&mut self) -> Option<HallCode> {
        let code = self.hall.read();
        match code.sector() {
            Some(sector) => {
                debug!("Hall code {} at hand-over: sector {}", code.bits(), sector.number());
                Some(code)
            }
            None => {
                warn!("Invalid hall code {} at hand-over", code.bits());
                None
            }
        }
    }

    fn fail_start(&self) -> Error {
        self.commutator.force_off();
        error!(
            "Startup failed: no hall edge within {} ms",
            self.config.confirmation_delay.as_millis()
        );
        Error::StartupFailed
    }

    /// Deregister the decoder and switch all phases off
    pub fn stop(&mut self) -> Response {
        if self.state() == MotorState::Stopped {
            return Response::AlreadyStopped;
        }
        self.commutator.force_off();
        info!("Motor stopped");
        Response::Stopped
    }

    /// Stop unconditionally; the caller ends its command loop afterwards
    pub fn shutdown(&mut self) -> Response {
        self.commutator.force_off();
        info!("Shutdown");
        Response::ShutDown
    }

    fn adjust_modulation(&mut self, step: i64) -> Response {
        let index = self.commutator.modulation().adjust(step);
        info!("Modulation index: {}", index);
        Response::Modulation(index)
    }

    pub fn raise_modulation(&mut self) -> Response {
        self.adjust_modulation(self.config.modulation_step as i64)
    }

    pub fn lower_modulation(&mut self) -> Response {
        self.adjust_modulation(-(self.config.modulation_step as i64))
    }

    pub fn speed(&self) -> Result<Response, Error> {
        self.commutator
            .speed(self.config.pole_pairs)
            .map(Response::Speed)
    }
}
