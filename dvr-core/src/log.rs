//! Logging shims.
//!
//! Routes to `defmt` on probe-attached targets, to `tracing` for host
//! simulation, and compiles to nothing otherwise. Arguments are still
//! evaluated in the no-op case so feature builds do not diverge in warnings.

#![allow(unused_macros)]

#[cfg(feature = "defmt")]
macro_rules! debug { ($($arg:tt)*) => { defmt::debug!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! info { ($($arg:tt)*) => { defmt::info!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! warn { ($($arg:tt)*) => { defmt::warn!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! error { ($($arg:tt)*) => { defmt::error!($($arg)*) }; }

#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
macro_rules! debug { ($($arg:tt)*) => { tracing::debug!($($arg)*) }; }
#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
macro_rules! info { ($($arg:tt)*) => { tracing::info!($($arg)*) }; }
#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
macro_rules! warn { ($($arg:tt)*) => { tracing::warn!($($arg)*) }; }
#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
macro_rules! error { ($($arg:tt)*) => { tracing::error!($($arg)*) }; }

#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! debug { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }
#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! info { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }
#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! warn { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }
#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! error { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }
