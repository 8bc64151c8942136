//! Network-related configuration types

use std::num::NonZeroU16;
use std::str::FromStr;

use crate::types::ValidationError;

nonzero_newtype! {
    /// A validated network port number that cannot be zero
    ///
    /// Used both for the listen port and for the port advertised in every
    /// menu line, so a zero here would produce unreachable menu entries.
    ///
    /// # Examples
    /// ```
    /// use gopher_server::types::Port;
    ///
    /// let port = Port::new(7070).unwrap();
    /// assert_eq!(port.get(), 7070);
    ///
    /// // Port 0 is invalid
    /// assert!(Port::new(0).is_none());
    ///
    /// // Standard Gopher port
    /// assert_eq!(Port::GOPHER.get(), 70);
    /// ```
    #[doc(alias = "port_number")]
    #[doc(alias = "tcp_port")]
    pub struct Port(NonZeroU16: u16, serialize as serialize_u16);
}

impl Port {
    /// Gopher port (70)
    pub const GOPHER: Self = Self(NonZeroU16::new(70).unwrap());
}

impl Default for Port {
    fn default() -> Self {
        Self::GOPHER
    }
}

impl FromStr for Port {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let port = s
            .parse::<u16>()
            .map_err(|_| ValidationError::InvalidPortNumber(s.to_string()))?;
        Self::new(port).ok_or(ValidationError::InvalidPort)
    }
}

impl TryFrom<u16> for Port {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ValidationError::InvalidPort)
    }
}
