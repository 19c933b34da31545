/// Number of hops a trace probes unless configured otherwise.
pub const MAX_HOPS: u8 = 30;

/// IP time-to-live of a probe; doubles as the hop number.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ttl(pub u8);

impl Ttl {
    pub(crate) fn next(self) -> Option<Ttl> {
        self.0.checked_add(1).map(Ttl)
    }
}

impl From<u8> for Ttl {
    fn from(integer: u8) -> Self {
        Ttl(integer)
    }
}

impl From<Ttl> for u8 {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

impl From<Ttl> for u32 {
    fn from(ttl: Ttl) -> Self {
        u32::from(ttl.0)
    }
}

impl std::fmt::Display for Ttl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
