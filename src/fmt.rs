//! Logging shims
//!
//! The crate logs through `defmt` on the embedded target and through the
//! `log` facade on the host. With neither backend enabled the macros
//! compile away; arguments are still borrowed so they count as used.
#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "embedded")]
        ::defmt::trace!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::trace!($s $(, $x)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ($(&$x,)*);
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "embedded")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::debug!($s $(, $x)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ($(&$x,)*);
    }};
}

macro_rules! warn_ {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "embedded")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::warn!($s $(, $x)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ($(&$x,)*);
    }};
}

pub(crate) use {debug, trace, warn_ as warn};
