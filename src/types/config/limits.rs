//! Request, file, rate and thread limit configuration types

use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};

nonzero_newtype! {
    /// Maximum number of bytes accepted for one request line
    ///
    /// # Examples
    /// ```
    /// use gopher_server::types::MaxRequestBytes;
    ///
    /// let max = MaxRequestBytes::new(512).unwrap();
    /// assert_eq!(max.get(), 512);
    /// assert!(MaxRequestBytes::new(0).is_none());
    /// ```
    pub struct MaxRequestBytes(NonZeroUsize: usize, serialize as serialize_u64);
}

impl MaxRequestBytes {
    /// Default request ceiling (1 KiB)
    pub const DEFAULT: Self = Self(NonZeroUsize::new(1024).unwrap());
}

impl Default for MaxRequestBytes {
    fn default() -> Self {
        Self::DEFAULT
    }
}

nonzero_newtype! {
    /// Maximum size of a file the server will read and send
    pub struct MaxFileBytes(NonZeroU64: u64, serialize as serialize_u64);
}

impl MaxFileBytes {
    /// Default file ceiling (10 MiB)
    pub const DEFAULT: Self = Self(NonZeroU64::new(10 * 1024 * 1024).unwrap());
}

impl Default for MaxFileBytes {
    fn default() -> Self {
        Self::DEFAULT
    }
}

nonzero_newtype! {
    /// Number of requests one client address may make per rate-limit window
    #[doc(alias = "rate_limit")]
    pub struct RequestCeiling(NonZeroU32: u32, serialize as serialize_u32);
}

impl RequestCeiling {
    /// Default ceiling (100 requests per window)
    pub const DEFAULT: Self = Self(NonZeroU32::new(100).unwrap());
}

impl Default for RequestCeiling {
    fn default() -> Self {
        Self::DEFAULT
    }
}

nonzero_newtype! {
    /// A non-zero thread count
    ///
    /// Ensures the runtime always has at least 1 worker thread.
    pub struct ThreadCount(NonZeroUsize: usize, serialize as serialize_u64);
}

impl ThreadCount {
    /// Default thread count
    pub const DEFAULT: Self = Self(NonZeroUsize::new(1).unwrap());
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::str::FromStr for ThreadCount {
    type Err = std::num::ParseIntError;

    /// `0` means "one thread per CPU core"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse::<usize>()?;
        Ok(Self::new(value).unwrap_or_else(|| {
            let cores = std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1);
            Self::new(cores).unwrap_or(Self::DEFAULT)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(MaxRequestBytes::DEFAULT.get(), 1024);
        assert_eq!(MaxFileBytes::DEFAULT.get(), 10 * 1024 * 1024);
        assert_eq!(RequestCeiling::DEFAULT.get(), 100);
        assert_eq!(ThreadCount::DEFAULT.get(), 1);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(MaxRequestBytes::new(0).is_none());
        assert!(MaxFileBytes::new(0).is_none());
        assert!(RequestCeiling::new(0).is_none());
        assert!(ThreadCount::new(0).is_none());
    }

    #[test]
    fn test_ordering() {
        let small = RequestCeiling::new(5).unwrap();
        let large = RequestCeiling::new(50).unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_thread_count_from_str() {
        let threads: ThreadCount = "4".parse().unwrap();
        assert_eq!(threads.get(), 4);
    }

    #[test]
    fn test_thread_count_zero_means_cpu_cores() {
        let threads: ThreadCount = "0".parse().unwrap();
        assert!(threads.get() >= 1);
    }

    #[test]
    fn test_thread_count_invalid() {
        assert!("many".parse::<ThreadCount>().is_err());
    }
}
