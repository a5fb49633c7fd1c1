//! All BattlEye RCon protocol message types.
//!
//! Every packet on the wire shares an 8-byte header:
//!
//! ```text
//! offset  size  field
//! 0       2     signature 'B' 'E' (0x42 0x45)
//! 2       4     CRC-32 over bytes[6..end], little-endian
//! 6       1     sentinel 0xFF
//! 7       1     type tag: 0 = login / multi-part, 1 = command, 2 = server
//! 8..     var   payload
//! ```
//!
//! Text payloads carry no length prefix; their length is whatever is left of
//! the datagram.

// ── Protocol constants ────────────────────────────────────────────────────────

/// The two key bytes every packet starts with.
pub const SIGNATURE: [u8; 2] = [0x42, 0x45];

/// Fixed byte that follows the checksum.
pub const SENTINEL: u8 = 0xFF;

/// Signature (2) + checksum (4) + sentinel (1) + type tag (1).
pub const HEADER_SIZE: usize = 8;

/// Offset of the 4-byte checksum.
pub const CHECKSUM_OFFSET: usize = 2;

/// Offset of the sentinel byte; the checksum covers everything from here on.
pub const SENTINEL_OFFSET: usize = 6;

/// Offset of the type tag.
pub const TYPE_OFFSET: usize = 7;

/// Largest datagram the client is prepared to receive.
pub const MAX_PACKET_SIZE: usize = 2048;

// ── Packet type tags ──────────────────────────────────────────────────────────

/// Type tag byte found at offset 7.
///
/// The `Login` tag is shared by the login result and by multi-part command
/// responses; the two are told apart by datagram length alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    Login = 0x00,
    Command = 0x01,
    Server = 0x02,
}

impl TryFrom<u8> for PacketType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x00 => Ok(PacketType::Login),
            0x01 => Ok(PacketType::Command),
            0x02 => Ok(PacketType::Server),
            _ => Err(()),
        }
    }
}

/// Data-less discriminant of [`RconMessage`], used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Login,
    LoginResult,
    Command,
    CommandResult,
    CommandResultPart,
    ServerNotice,
    ServerNoticeAck,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageKind::Login => "Login",
            MessageKind::LoginResult => "LoginResult",
            MessageKind::Command => "Command",
            MessageKind::CommandResult => "CommandResult",
            MessageKind::CommandResultPart => "CommandResultPart",
            MessageKind::ServerNotice => "ServerNotice",
            MessageKind::ServerNoticeAck => "ServerNoticeAck",
        };
        f.write_str(name)
    }
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// Every packet kind the RCon protocol defines.
///
/// Values are built right before encoding or right after decoding and are
/// consumed by the next protocol step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RconMessage {
    /// Client → server: authenticate with the shared secret.
    Login { password: String },
    /// Server → client: answer to `Login`; nonzero `result` means accepted.
    LoginResult { result: u8 },
    /// Client → server: a console command stamped with the client's sequence number.
    Command { sequence: u8, command: String },
    /// Server → client: the complete answer to the command with `sequence`.
    CommandResult { sequence: u8, text: String },
    /// Server → client: fragment `part_index` (0-based) of a `total_parts` answer.
    CommandResultPart {
        total_parts: u8,
        part_index: u8,
        text: String,
    },
    /// Server → client: unsolicited broadcast that must be acknowledged.
    ServerNotice { sequence: u8, text: String },
    /// Client → server: acknowledgement of the notice with `sequence`.
    ServerNoticeAck { sequence: u8 },
}

impl RconMessage {
    /// Returns the wire type tag for this message.
    pub fn packet_type(&self) -> PacketType {
        match self {
            RconMessage::Login { .. }
            | RconMessage::LoginResult { .. }
            | RconMessage::CommandResultPart { .. } => PacketType::Login,
            RconMessage::Command { .. } | RconMessage::CommandResult { .. } => {
                PacketType::Command
            }
            RconMessage::ServerNotice { .. } | RconMessage::ServerNoticeAck { .. } => {
                PacketType::Server
            }
        }
    }

    /// Returns the variant discriminant.
    pub fn kind(&self) -> MessageKind {
        match self {
            RconMessage::Login { .. } => MessageKind::Login,
            RconMessage::LoginResult { .. } => MessageKind::LoginResult,
            RconMessage::Command { .. } => MessageKind::Command,
            RconMessage::CommandResult { .. } => MessageKind::CommandResult,
            RconMessage::CommandResultPart { .. } => MessageKind::CommandResultPart,
            RconMessage::ServerNotice { .. } => MessageKind::ServerNotice,
            RconMessage::ServerNoticeAck { .. } => MessageKind::ServerNoticeAck,
        }
    }

    /// Sequence number carried by the message, if its variant has one.
    pub fn sequence(&self) -> Option<u8> {
        match self {
            RconMessage::Command { sequence, .. }
            | RconMessage::CommandResult { sequence, .. }
            | RconMessage::ServerNotice { sequence, .. }
            | RconMessage::ServerNoticeAck { sequence } => Some(*sequence),
            _ => None,
        }
    }

    /// `Some(true)` for an accepting `LoginResult`, `Some(false)` for a
    /// rejecting one, `None` for every other variant.
    pub fn login_succeeded(&self) -> Option<bool> {
        match self {
            RconMessage::LoginResult { result } => Some(*result != 0),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_type_try_from_known_tags() {
        assert_eq!(PacketType::try_from(0x00), Ok(PacketType::Login));
        assert_eq!(PacketType::try_from(0x01), Ok(PacketType::Command));
        assert_eq!(PacketType::try_from(0x02), Ok(PacketType::Server));
    }

    #[test]
    fn test_packet_type_try_from_unknown_tag_fails() {
        assert!(PacketType::try_from(0x03).is_err());
        assert!(PacketType::try_from(0xFF).is_err());
    }

    #[test]
    fn test_login_and_multi_part_share_a_tag() {
        let login = RconMessage::Login {
            password: "pw".to_string(),
        };
        let part = RconMessage::CommandResultPart {
            total_parts: 2,
            part_index: 0,
            text: "a".to_string(),
        };
        assert_eq!(login.packet_type(), part.packet_type());
    }

    #[test]
    fn test_notice_ack_uses_server_tag() {
        let ack = RconMessage::ServerNoticeAck { sequence: 7 };
        assert_eq!(ack.packet_type(), PacketType::Server);
        assert_eq!(ack.sequence(), Some(7));
    }

    #[test]
    fn test_login_succeeded_reads_result_byte() {
        assert_eq!(
            RconMessage::LoginResult { result: 1 }.login_succeeded(),
            Some(true)
        );
        assert_eq!(
            RconMessage::LoginResult { result: 0 }.login_succeeded(),
            Some(false)
        );
        assert_eq!(
            RconMessage::ServerNoticeAck { sequence: 0 }.login_succeeded(),
            None
        );
    }

    #[test]
    fn test_kind_display_names_the_variant() {
        let msg = RconMessage::CommandResult {
            sequence: 3,
            text: String::new(),
        };
        assert_eq!(msg.kind().to_string(), "CommandResult");
    }
}
