//! Direct read of the hall sensor lines

use crate::hall::HallCode;

/// Current levels of the three hall lines
///
/// Read once per start to seed the code the decoder tracks from edges.
pub trait HallInput {
    fn read(&mut self) -> HallCode;
}
