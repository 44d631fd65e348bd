use std::{fmt::Display, time::Duration};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct Seconds(u16);

impl Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl From<u16> for Seconds {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Seconds> for u64 {
    fn from(value: Seconds) -> Self {
        value.0 as u64
    }
}

impl Seconds {
    /// Zero means no timeout at all
    pub fn as_timeout(&self) -> Option<Duration> {
        if self.0 == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(*self)))
        }
    }
}
