/// Sequence field of the next echo request. Probes are numbered from 1 and
/// the numbering continues across traces run on the same tracer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct SequenceNumber(u16);

impl SequenceNumber {
    const FIRST: u16 = 1;

    pub(crate) fn start_value() -> Self {
        SequenceNumber(Self::FIRST)
    }

    /// The number after this one. `u16::MAX` is followed by 1, so 0 never
    /// goes out on the wire.
    pub(crate) fn next(self) -> Self {
        match self.0.checked_add(1) {
            Some(n) => SequenceNumber(n),
            None => Self::start_value(),
        }
    }
}

impl From<SequenceNumber> for u16 {
    fn from(value: SequenceNumber) -> Self {
        value.0
    }
}
