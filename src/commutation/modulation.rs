// Modulation index storage shared between the control loop and the edge context

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::MODULATION_UNITY;

/// Clamped modulation index in [0, MODULATION_UNITY]
///
/// Backed by a single atomic so the output stage can read it from the edge
/// context while the control loop adjusts it.
pub struct ModulationController {
    index: AtomicU32,
}

impl ModulationController {
    /// Create a controller, `initial` is clamped to unity
    pub const fn new(initial: u32) -> Self {
        let initial = if initial > MODULATION_UNITY {
            MODULATION_UNITY
        } else {
            initial
        };
        Self {
            index: AtomicU32::new(initial),
        }
    }

    /// Current modulation index
    pub fn get(&self) -> u32 {
        self.index.load(Ordering::Acquire)
    }

    /// Set an absolute modulation index
    ///
    /// # Returns
    /// The stored (clamped) value
    pub fn set(&self, value: i64) -> u32 {
        let clamped = clamp(value);
        self.index.store(clamped, Ordering::Release);
        clamped
    }

    /// Adjust the modulation index by a signed step
    ///
    /// # Returns
    /// The stored (clamped) value
    pub fn adjust(&self, step: i64) -> u32 {
        let mut current = self.index.load(Ordering::Acquire);
        loop {
            let next = clamp(current as i64 + step);
            match self.index.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Duty value for a PWM channel whose full scale is `max_duty`
    pub fn duty(&self, max_duty: u16) -> u16 {
        (self.get() as u64 * max_duty as u64 / MODULATION_UNITY as u64) as u16
    }

    /// Modulation index as a fraction of unity
    pub fn ratio(&self) -> f32 {
        self.get() as f32 / MODULATION_UNITY as f32
    }
}

impl Default for ModulationController {
    fn default() -> Self {
        Self::new(0)
    }
}

fn clamp(value: i64) -> u32 {
    value.clamp(0, MODULATION_UNITY as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps() {
        let m = ModulationController::new(0);
        assert_eq!(m.set(-100), 0);
        assert_eq!(m.set(2 * MODULATION_UNITY as i64), MODULATION_UNITY);
        assert_eq!(m.set(400_000), 400_000);
        assert_eq!(m.get(), 400_000);
    }

    #[test]
    fn test_adjust_stays_in_range() {
        let m = ModulationController::new(990_000);
        assert_eq!(m.adjust(20_000), MODULATION_UNITY);
        assert_eq!(m.adjust(20_000), MODULATION_UNITY);

        m.set(10_000);
        assert_eq!(m.adjust(-20_000), 0);
        assert_eq!(m.adjust(-20_000), 0);
    }

    #[test]
    fn test_new_clamps() {
        let m = ModulationController::new(u32::MAX);
        assert_eq!(m.get(), MODULATION_UNITY);
    }

    #[test]
    fn test_duty_scaling() {
        let m = ModulationController::new(400_000);
        assert_eq!(m.duty(1000), 400);
        assert_eq!(m.duty(0), 0);
        m.set(MODULATION_UNITY as i64);
        assert_eq!(m.duty(u16::MAX), u16::MAX);
        assert!((m.ratio() - 1.0).abs() < f32::EPSILON);
    }
}
