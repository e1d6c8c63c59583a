//! defmt / no-op logging shim
//!
//! With the `defmt` feature the macros forward to defmt; without it they only
//! borrow their arguments so host builds need no global logger.
#![macro_use]
#![allow(unused)]

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::defmt::trace!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        { let _ = ($( &($x) ),*); }
    };
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::defmt::debug!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        { let _ = ($( &($x) ),*); }
    };
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::defmt::info!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        { let _ = ($( &($x) ),*); }
    };
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::defmt::warn!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        { let _ = ($( &($x) ),*); }
    };
}

#[cfg(feature = "defmt")]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::defmt::error!($s $(, $x)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        { let _ = ($( &($x) ),*); }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_accept_casts_and_trailing_commas() {
        let bits = 0b011u8;
        trace!("hall code {}", bits);
        debug!("sector {} of {}", bits as u32, 6);
        info!("armed");
        warn!("dropped {} edges", bits as u16,);
        error!("startup failed after {} ms", 50u64);
    }
}
