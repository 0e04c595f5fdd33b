//! Packet layout on the wire.
//!
//! The first four payload bytes carry a little-endian `u32` tag. The
//! 42-byte header overhead models Ethernet, IP and UDP headers and is
//! accounted for, never transmitted.

pub const TAG_SIZE: usize = 4;
pub const HEADER_OVERHEAD: usize = 42;
pub const MIN_WIRE_PACKET: usize = TAG_SIZE + HEADER_OVERHEAD;

/// Reads the tag from the front of a datagram, if it is long enough.
#[must_use]
pub fn decode_tag(payload: &[u8]) -> Option<u32> {
    let bytes: [u8; TAG_SIZE] = payload.get(..TAG_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// How one burst splits into packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    pub full: usize,
    /// Wire size of the trailing short packet, if any.
    pub residual: Option<usize>,
}

impl Burst {
    #[must_use]
    pub fn packets(&self) -> usize {
        self.full.saturating_add(usize::from(self.residual.is_some()))
    }
}

/// Effective packet geometry for one sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireLayout {
    /// Wire size of a full packet, header included.
    pub packet_size: usize,
    /// Bytes actually written for a full packet.
    pub payload_size: usize,
}

impl WireLayout {
    #[must_use]
    pub fn new(packet_size: usize) -> Self {
        let payload_size = packet_size.saturating_sub(HEADER_OVERHEAD).max(TAG_SIZE);
        Self {
            packet_size: payload_size.saturating_add(HEADER_OVERHEAD),
            payload_size,
        }
    }

    #[must_use]
    pub fn partition(&self, size: u64) -> Burst {
        let size = usize::try_from(size).unwrap_or(usize::MAX);
        let full = size.checked_div(self.packet_size).unwrap_or(0);
        let residual = size.checked_rem(self.packet_size).unwrap_or(0);
        Burst {
            full,
            residual: (residual != 0).then(|| residual.max(MIN_WIRE_PACKET)),
        }
    }

    /// Payload bytes written for a packet of `wire_size`.
    #[must_use]
    pub fn payload_len(wire_size: usize) -> usize {
        wire_size.saturating_sub(HEADER_OVERHEAD).max(TAG_SIZE)
    }
}

/// Preallocated payload buffer owned by one sender.
///
/// Packet `i` is the window starting at byte `i * 4`, so stamping a burst
/// writes one tag per packet without copying payloads.
#[derive(Debug)]
pub struct TagArena {
    buf: Vec<u8>,
    slots: usize,
}

impl TagArena {
    /// Sized for `backlog` bytes of bursts: `ceil(backlog / packet) + 1`
    /// slots plus one full payload.
    #[must_use]
    pub fn new(layout: WireLayout, backlog: u64) -> Self {
        let backlog = usize::try_from(backlog).unwrap_or(usize::MAX);
        let slots = backlog
            .div_ceil(layout.packet_size.max(1))
            .saturating_add(1);
        let len = slots
            .saturating_mul(TAG_SIZE)
            .saturating_add(layout.payload_size);
        Self {
            buf: vec![0; len],
            slots,
        }
    }

    #[must_use]
    pub const fn slots(&self) -> usize {
        self.slots
    }

    /// Stamps consecutive tags from `first` for up to `count` packets and
    /// returns how many fit.
    pub fn stamp(&mut self, first: u32, count: usize) -> usize {
        let count = count.min(self.slots);
        let mut tag = first;
        for chunk in self.buf.chunks_exact_mut(TAG_SIZE).take(count) {
            chunk.copy_from_slice(&tag.to_le_bytes());
            tag = tag.wrapping_add(1);
        }
        count
    }

    /// Payload of packet `index` with `len` bytes.
    #[must_use]
    pub fn packet(&self, index: usize, len: usize) -> Option<&[u8]> {
        let begin = index.checked_mul(TAG_SIZE)?;
        self.buf.get(begin..begin.checked_add(len)?)
    }
}
