//! Binary codec for encoding and decoding RCon packets.
//!
//! Wire format:
//! ```text
//! ['B']['E'][crc32:4 LE][0xFF][type:1][payload:N]
//! ```
//! The CRC-32 (zlib polynomial) covers everything from the `0xFF` sentinel to
//! the end of the datagram. Payload text has no length prefix and no
//! terminator.
//!
//! Two decoders exist because the same tag means different things depending
//! on who sent the packet:
//!
//! - [`decode_message`] reads packets sent *by the server* (what the client
//!   receives).
//! - [`decode_request`] reads packets sent *by the client* (what a server, or
//!   a test standing in for one, receives).

use std::fmt::Write as _;

use crc::{Crc, CRC_32_ISO_HDLC};
use thiserror::Error;

use crate::protocol::messages::{
    PacketType, RconMessage, CHECKSUM_OFFSET, HEADER_SIZE, SENTINEL, SENTINEL_OFFSET, SIGNATURE,
    TYPE_OFFSET,
};

/// zlib-compatible CRC-32.
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Errors that can occur while decoding a packet.
///
/// Every variant is terminal for the session: the protocol has no resend
/// request, so a bad packet is never skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The datagram is shorter than the fixed header.
    #[error("packet too short: need at least {needed} bytes, got {available}")]
    TooShort { needed: usize, available: usize },

    /// Bytes 0–1 are not 'B' 'E'.
    #[error("bad packet signature {0:02x?}, expected 'B' 'E'")]
    BadSignature([u8; 2]),

    /// The stored checksum does not match the packet contents.
    #[error("CRC32 check failed: computed {computed:08x}, packet carries {stored:08x}")]
    ChecksumMismatch { computed: u32, stored: u32 },

    /// Byte 6 is not the 0xFF sentinel.
    #[error("unexpected byte 0x{0:02X} at sentinel position 6")]
    BadSentinel(u8),

    /// The type tag at byte 7 is not one the protocol defines.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The tag is known but the payload is too short for its fixed fields.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`RconMessage`] into a complete datagram, checksum included.
///
/// The output is deterministic for a given message value.
///
/// # Examples
///
/// ```rust
/// use rcon_core::protocol::{decode_message, encode_message, RconMessage};
///
/// let msg = RconMessage::ServerNotice { sequence: 4, text: "hi".to_string() };
/// let bytes = encode_message(&msg);
/// assert_eq!(decode_message(&bytes).unwrap(), msg);
/// ```
pub fn encode_message(msg: &RconMessage) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload_len_hint(msg));

    buf.extend_from_slice(&SIGNATURE);
    buf.extend_from_slice(&[0x00; 4]); // checksum placeholder
    buf.push(SENTINEL);
    buf.push(msg.packet_type() as u8);

    match msg {
        RconMessage::Login { password } => buf.extend_from_slice(password.as_bytes()),
        RconMessage::LoginResult { result } => buf.push(*result),
        RconMessage::Command { sequence, command } => {
            buf.push(*sequence);
            buf.extend_from_slice(command.as_bytes());
        }
        RconMessage::CommandResult { sequence, text }
        | RconMessage::ServerNotice { sequence, text } => {
            buf.push(*sequence);
            buf.extend_from_slice(text.as_bytes());
        }
        RconMessage::CommandResultPart {
            total_parts,
            part_index,
            text,
        } => {
            buf.push(*total_parts);
            buf.push(*part_index);
            buf.extend_from_slice(text.as_bytes());
        }
        RconMessage::ServerNoticeAck { sequence } => buf.push(*sequence),
    }

    let crc = checksum(&buf[SENTINEL_OFFSET..]);
    buf[CHECKSUM_OFFSET..SENTINEL_OFFSET].copy_from_slice(&crc.to_le_bytes());
    buf
}

/// Decodes a datagram sent by the server.
///
/// Tag 0 is a `LoginResult` when the datagram is exactly 9 bytes long and a
/// `CommandResultPart` when it is longer.
///
/// # Errors
///
/// Returns [`ProtocolError`] if framing, checksum or payload checks fail.
pub fn decode_message(bytes: &[u8]) -> Result<RconMessage, ProtocolError> {
    let packet_type = validate_frame(bytes)?;
    let len = bytes.len();

    match packet_type {
        PacketType::Login if len == HEADER_SIZE + 1 => Ok(RconMessage::LoginResult {
            result: bytes[HEADER_SIZE],
        }),
        PacketType::Login => {
            require_len(bytes, HEADER_SIZE + 2, "CommandResultPart")?;
            Ok(RconMessage::CommandResultPart {
                total_parts: bytes[HEADER_SIZE],
                part_index: bytes[HEADER_SIZE + 1],
                text: extract_text(&bytes[HEADER_SIZE + 2..]),
            })
        }
        PacketType::Command => {
            require_len(bytes, HEADER_SIZE + 1, "CommandResult")?;
            Ok(RconMessage::CommandResult {
                sequence: bytes[HEADER_SIZE],
                text: extract_text(&bytes[HEADER_SIZE + 1..]),
            })
        }
        PacketType::Server => {
            require_len(bytes, HEADER_SIZE + 1, "ServerNotice")?;
            Ok(RconMessage::ServerNotice {
                sequence: bytes[HEADER_SIZE],
                text: extract_text(&bytes[HEADER_SIZE + 1..]),
            })
        }
    }
}

/// Decodes a datagram sent by the client.
///
/// # Errors
///
/// Returns [`ProtocolError`] if framing, checksum or payload checks fail.
pub fn decode_request(bytes: &[u8]) -> Result<RconMessage, ProtocolError> {
    let packet_type = validate_frame(bytes)?;

    match packet_type {
        PacketType::Login => Ok(RconMessage::Login {
            password: extract_text(&bytes[HEADER_SIZE..]),
        }),
        PacketType::Command => {
            require_len(bytes, HEADER_SIZE + 1, "Command")?;
            Ok(RconMessage::Command {
                sequence: bytes[HEADER_SIZE],
                command: extract_text(&bytes[HEADER_SIZE + 1..]),
            })
        }
        PacketType::Server => {
            if bytes.len() != HEADER_SIZE + 1 {
                return Err(ProtocolError::MalformedPayload(format!(
                    "ServerNoticeAck: expected {} bytes, got {}",
                    HEADER_SIZE + 1,
                    bytes.len()
                )));
            }
            Ok(RconMessage::ServerNoticeAck {
                sequence: bytes[HEADER_SIZE],
            })
        }
    }
}

/// CRC-32 (zlib polynomial) of `bytes`.
pub fn checksum(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}

/// Formats `bytes` as lowercase hex, 32 bytes per line.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, chunk) in bytes.chunks(32).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, byte) in chunk.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{byte:02x}");
        }
    }
    out
}

// ── Framing ───────────────────────────────────────────────────────────────────

/// Runs the checks shared by both directions, in wire order: length,
/// signature, checksum, sentinel, type tag.
fn validate_frame(bytes: &[u8]) -> Result<PacketType, ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::TooShort {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    if bytes[..CHECKSUM_OFFSET] != SIGNATURE {
        return Err(ProtocolError::BadSignature([bytes[0], bytes[1]]));
    }

    let stored = u32::from_le_bytes([
        bytes[CHECKSUM_OFFSET],
        bytes[CHECKSUM_OFFSET + 1],
        bytes[CHECKSUM_OFFSET + 2],
        bytes[CHECKSUM_OFFSET + 3],
    ]);
    let computed = checksum(&bytes[SENTINEL_OFFSET..]);
    if stored != computed {
        return Err(ProtocolError::ChecksumMismatch { computed, stored });
    }

    if bytes[SENTINEL_OFFSET] != SENTINEL {
        return Err(ProtocolError::BadSentinel(bytes[SENTINEL_OFFSET]));
    }

    let tag = bytes[TYPE_OFFSET];
    PacketType::try_from(tag).map_err(|_| ProtocolError::UnknownMessageType(tag))
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn require_len(buf: &[u8], needed: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::MalformedPayload(format!(
            "{context}: need {needed} bytes, got {}",
            buf.len()
        )))
    } else {
        Ok(())
    }
}

/// Payload text is opaque bytes; invalid UTF-8 is replaced, NULs are kept.
fn extract_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn payload_len_hint(msg: &RconMessage) -> usize {
    match msg {
        RconMessage::Login { password } => password.len(),
        RconMessage::Command { command, .. } => 1 + command.len(),
        RconMessage::CommandResult { text, .. } | RconMessage::ServerNotice { text, .. } => {
            1 + text.len()
        }
        RconMessage::CommandResultPart { text, .. } => 2 + text.len(),
        RconMessage::LoginResult { .. } | RconMessage::ServerNoticeAck { .. } => 1,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
