// Sector → phase drive pattern lookup

/// Motor phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    U,
    V,
    W,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::U, Phase::V, Phase::W];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Commutation sector (1-6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Sector {
    S1 = 1,
    S2 = 2,
    S3 = 3,
    S4 = 4,
    S5 = 5,
    S6 = 6,
}

impl Sector {
    /// Sectors in forward rotation order
    pub const ALL: [Sector; 6] = [
        Sector::S1,
        Sector::S2,
        Sector::S3,
        Sector::S4,
        Sector::S5,
        Sector::S6,
    ];

    /// Sector from its number, `None` outside 1-6
    pub const fn new(number: u8) -> Option<Self> {
        match number {
            1 => Some(Sector::S1),
            2 => Some(Sector::S2),
            3 => Some(Sector::S3),
            4 => Some(Sector::S4),
            5 => Some(Sector::S5),
            6 => Some(Sector::S6),
            _ => None,
        }
    }

    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Next sector in forward rotation (6 wraps to 1)
    pub const fn next(self) -> Self {
        match self {
            Sector::S1 => Sector::S2,
            Sector::S2 => Sector::S3,
            Sector::S3 => Sector::S4,
            Sector::S4 => Sector::S5,
            Sector::S5 => Sector::S6,
            Sector::S6 => Sector::S1,
        }
    }

    /// Output pattern of this sector
    pub const fn pattern(self) -> PhasePattern {
        SECTOR_TABLE[self as usize - 1]
    }
}

/// Role of a single phase within a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseDrive {
    /// Enabled, carries the modulated duty
    Modulated,
    /// Enabled, held at zero duty
    Low,
    /// Enable de-asserted
    Floating,
}

/// Phase outputs for one sector
///
/// Exactly one phase is modulated and exactly one floats; the remaining phase
/// is enabled at zero duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhasePattern {
    pub modulated: Phase,
    pub low: Phase,
    pub floating: Phase,
}

impl PhasePattern {
    pub const fn drive(&self, phase: Phase) -> PhaseDrive {
        if phase as u8 == self.modulated as u8 {
            PhaseDrive::Modulated
        } else if phase as u8 == self.low as u8 {
            PhaseDrive::Low
        } else {
            PhaseDrive::Floating
        }
    }

    /// Enable line states indexed by [`Phase::index`]
    pub fn enables(&self) -> [bool; 3] {
        Phase::ALL.map(|phase| phase != self.floating)
    }

    /// Duty values indexed by [`Phase::index`]
    pub fn duties(&self, duty: u16) -> [u16; 3] {
        Phase::ALL.map(|phase| if phase == self.modulated { duty } else { 0 })
    }
}

const fn pattern(modulated: Phase, low: Phase, floating: Phase) -> PhasePattern {
    PhasePattern {
        modulated,
        low,
        floating,
    }
}

/// Six-step table, sector 1 first
///
/// Each step moves either the modulated or the low role, never both.
const SECTOR_TABLE: [PhasePattern; 6] = [
    pattern(Phase::U, Phase::W, Phase::V), // S1: U+ W- V open
    pattern(Phase::V, Phase::W, Phase::U), // S2: V+ W- U open
    pattern(Phase::V, Phase::U, Phase::W), // S3: V+ U- W open
    pattern(Phase::W, Phase::U, Phase::V), // S4: W+ U- V open
    pattern(Phase::W, Phase::V, Phase::U), // S5: W+ V- U open
    pattern(Phase::U, Phase::V, Phase::W), // S6: U+ V- W open
];
