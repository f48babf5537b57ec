//! `PartAttributes` (§6): bit flags carried in the part header, most importantly the
//! `LastPacket`/`ResultSetClosed` flags that drive result-set fetch and LOB streaming.

/// Decodes the bit-flag byte carried in a part header.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct PartAttributes(i8);

const LAST_PACKET: i8 = 0b0000_0001;
const RESULT_SET_CLOSED: i8 = 0b0000_0010;

impl PartAttributes {
    pub(crate) fn new(raw: i8) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> i8 {
        self.0
    }

    /// Whether this part carried the server's "last data" indication (§4.5, §4.6):
    /// no further fetch / `ReadLob` round-trip is needed for this row chunk / LOB.
    pub(crate) fn is_last_packet(self) -> bool {
        self.0 & LAST_PACKET != 0
    }

    pub(crate) fn is_result_set_closed(self) -> bool {
        self.0 & RESULT_SET_CLOSED != 0
    }
}
