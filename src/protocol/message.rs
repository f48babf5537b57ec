//! Message/segment framing constants and header I/O (§4.3, §6): a 32-byte `MessageHeader`
//! followed by exactly one `SegmentHeader` (this engine never needs more than one request
//! segment per message, matching the teacher's own simplification) and the part stream.

use crate::error::HdbResult;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub(crate) const MESSAGE_HEADER_SIZE: u32 = 32;
pub(crate) const SEGMENT_HEADER_SIZE: u32 = 24;
pub(crate) const PART_HEADER_SIZE: u32 = 16;

/// Kind of a segment (§6): every request this engine writes uses `Request`; every reply
/// arrives as `Reply` unless the server aborted the segment and sent `Error` instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SegmentKind {
    Request,
    Reply,
    Error,
}

impl SegmentKind {
    pub(crate) fn from_i8(i: i8) -> HdbResult<Self> {
        match i {
            1 => Ok(Self::Request),
            2 => Ok(Self::Reply),
            5 => Ok(Self::Error),
            other => Err(crate::error::HdbError::protocol(format!(
                "unknown segment kind {other}"
            ))),
        }
    }
}

/// The 32-byte message header (§6).
#[derive(Clone, Copy, Debug)]
pub(crate) struct MessageHeader {
    pub session_id: u64,
    pub packet_count: i32,
    pub varpart_length: u32,
    pub varpart_size: u32,
    pub no_of_segments: i16,
}

impl MessageHeader {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn write(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u64::<LittleEndian>(self.session_id)?;
        w.write_i32::<LittleEndian>(self.packet_count)?;
        w.write_u32::<LittleEndian>(self.varpart_length)?;
        w.write_u32::<LittleEndian>(self.varpart_size)?;
        w.write_i16::<LittleEndian>(self.no_of_segments)?;
        w.write_all(&[0_u8; 10])?;
        Ok(())
    }

    pub(crate) fn read(r: &mut dyn std::io::Read) -> HdbResult<Self> {
        let session_id = r.read_u64::<LittleEndian>()?;
        let packet_count = r.read_i32::<LittleEndian>()?;
        let varpart_length = r.read_u32::<LittleEndian>()?;
        let varpart_size = r.read_u32::<LittleEndian>()?;
        let no_of_segments = r.read_i16::<LittleEndian>()?;
        let mut filler = [0_u8; 10];
        r.read_exact(&mut filler)?;
        Ok(Self {
            session_id,
            packet_count,
            varpart_length,
            varpart_size,
            no_of_segments,
        })
    }
}

/// The 24-byte segment header (§6). `function_code` is only meaningful on replies.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SegmentHeader {
    pub segment_length: i32,
    pub segment_ofs: i32,
    pub no_of_parts: i16,
    pub segment_no: i16,
    pub segment_kind: SegmentKind,
    pub message_type: i8,
    pub commit: bool,
    pub command_options: u8,
    pub function_code: i16,
}

impl SegmentHeader {
    pub(crate) fn write_request(
        segment_length: i32,
        no_of_parts: i16,
        message_type: i8,
        auto_commit: bool,
        command_options: u8,
        w: &mut dyn std::io::Write,
    ) -> HdbResult<()> {
        w.write_i32::<LittleEndian>(segment_length)?;
        w.write_i32::<LittleEndian>(0)?;
        w.write_i16::<LittleEndian>(no_of_parts)?;
        w.write_i16::<LittleEndian>(1)?;
        w.write_i8(SegmentKind::Request as i8)?;
        w.write_i8(message_type)?;
        w.write_i8(auto_commit.into())?;
        w.write_u8(command_options)?;
        w.write_all(&[0_u8; 8])?;
        Ok(())
    }

    pub(crate) fn read(r: &mut dyn std::io::Read) -> HdbResult<Self> {
        let segment_length = r.read_i32::<LittleEndian>()?;
        let segment_ofs = r.read_i32::<LittleEndian>()?;
        let no_of_parts = r.read_i16::<LittleEndian>()?;
        let segment_no = r.read_i16::<LittleEndian>()?;
        let segment_kind = SegmentKind::from_i8(r.read_i8()?)?;
        let message_type = r.read_i8()?;
        let commit = r.read_i8()? != 0;
        let command_options = r.read_u8()?;
        let mut reserved = [0_u8; 8];
        r.read_exact(&mut reserved)?;
        let function_code = r.read_i16::<LittleEndian>()?;
        Ok(Self {
            segment_length,
            segment_ofs,
            no_of_parts,
            segment_no,
            segment_kind,
            message_type,
            commit,
            command_options,
            function_code,
        })
    }
}

/// Pads `len` up to the next 8-byte boundary, per the part-alignment rule in §4.3.
pub(crate) fn padded_size(len: usize) -> usize {
    (len + 7) & !7
}

pub(crate) fn skip_padding(len: usize, r: &mut dyn std::io::Read) -> HdbResult<()> {
    let pad = padded_size(len) - len;
    if pad > 0 {
        let mut buf = [0_u8; 8];
        r.read_exact(&mut buf[..pad])?;
    }
    Ok(())
}

pub(crate) fn write_padding(len: usize, w: &mut dyn std::io::Write) -> HdbResult<()> {
    let pad = padded_size(len) - len;
    if pad > 0 {
        w.write_all(&[0_u8; 8][..pad])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_rounds_up_to_8_byte_boundary() {
        assert_eq!(padded_size(0), 0);
        assert_eq!(padded_size(1), 8);
        assert_eq!(padded_size(8), 8);
        assert_eq!(padded_size(9), 16);
    }

    #[test]
    fn message_header_round_trips() {
        let header = MessageHeader {
            session_id: 42,
            packet_count: 1,
            varpart_length: 100,
            varpart_size: 100,
            no_of_segments: 1,
        };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len(), MESSAGE_HEADER_SIZE as usize);
        let mut rdr = &buf[..];
        let parsed = MessageHeader::read(&mut rdr).unwrap();
        assert_eq!(parsed.session_id, 42);
        assert_eq!(parsed.varpart_size, 100);
    }
}
