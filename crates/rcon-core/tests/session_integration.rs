//! End-to-end tests for `RconClient` over the scripted in-memory transport.
//!
//! Each test queues the server's side of the conversation up front, runs the
//! client, then decodes the datagrams the client sent to check what went out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rcon_core::{
    decode_request,
    protocol::SequenceCounter,
    transport::mock::ScriptedTransport,
    RconClient, RconError, RconMessage, Session, SessionError, SessionState,
};

type SentLog = Arc<Mutex<Vec<Vec<u8>>>>;

fn sent_messages(log: &SentLog) -> Vec<RconMessage> {
    log.lock()
        .unwrap()
        .iter()
        .map(|bytes| decode_request(bytes).expect("client sent an undecodable packet"))
        .collect()
}

/// A client that has already logged in, with `script` queued behind the
/// login result.
async fn logged_in_client(
    session: Session,
    script: impl FnOnce(&mut ScriptedTransport),
) -> (RconClient<ScriptedTransport>, SentLog) {
    let mut transport = ScriptedTransport::new();
    transport.push_message(&RconMessage::LoginResult { result: 1 });
    script(&mut transport);
    let log = transport.sent_log();
    let mut client = RconClient::with_session(transport, session);
    client.login("secret").await.unwrap();
    (client, log)
}

// ── Scenario A / B: login ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_with_correct_password_succeeds() {
    // Arrange
    let mut transport = ScriptedTransport::new();
    transport.push_message(&RconMessage::LoginResult { result: 1 });
    let log = transport.sent_log();
    let mut client = RconClient::new(transport);

    // Act
    let result = client.login("secret").await;

    // Assert
    assert!(result.is_ok());
    assert_eq!(client.session().state(), SessionState::Idle);
    assert_eq!(
        sent_messages(&log),
        vec![RconMessage::Login {
            password: "secret".to_string()
        }]
    );
}

#[tokio::test]
async fn test_login_with_wrong_password_fails_authentication() {
    // Arrange
    let mut transport = ScriptedTransport::new();
    transport.push_message(&RconMessage::LoginResult { result: 0 });
    let mut client = RconClient::new(transport);

    // Act
    let err = client.login("wrong").await.unwrap_err();

    // Assert
    assert!(matches!(
        err,
        RconError::Session(SessionError::AuthenticationFailed)
    ));
    assert_eq!(client.session().state(), SessionState::Failed);
}

// ── Scenario C / D: commands ──────────────────────────────────────────────────

#[tokio::test]
async fn test_single_packet_command_response() {
    // Arrange
    let (mut client, log) = logged_in_client(Session::new(), |t| {
        t.push_message(&RconMessage::CommandResult {
            sequence: 0,
            text: "No players".to_string(),
        });
    })
    .await;

    // Act
    let response = client.execute("players", |_| {}).await.unwrap();

    // Assert
    assert_eq!(response, "No players");
    assert_eq!(
        sent_messages(&log)[1],
        RconMessage::Command {
            sequence: 0,
            command: "players".to_string()
        }
    );
}

#[tokio::test]
async fn test_multi_part_response_is_joined_by_index_not_arrival_order() {
    // Arrange – scenario C first so that "say" carries sequence 1
    let (mut client, log) = logged_in_client(Session::new(), |t| {
        t.push_message(&RconMessage::CommandResult {
            sequence: 0,
            text: "No players".to_string(),
        })
        .push_message(&RconMessage::CommandResultPart {
            total_parts: 2,
            part_index: 1,
            text: "world".to_string(),
        })
        .push_message(&RconMessage::CommandResultPart {
            total_parts: 2,
            part_index: 0,
            text: "hello ".to_string(),
        });
    })
    .await;
    client.execute("players", |_| {}).await.unwrap();

    // Act
    let response = client.execute("say", |_| {}).await.unwrap();

    // Assert
    assert_eq!(response, "hello world");
    assert_eq!(
        sent_messages(&log)[2],
        RconMessage::Command {
            sequence: 1,
            command: "say".to_string()
        }
    );
    assert_eq!(client.session().state(), SessionState::Idle);
}

// ── Server notices ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_notice_between_fragments_is_acked_once_and_reassembly_continues() {
    // Arrange
    let (mut client, log) = logged_in_client(Session::new(), |t| {
        t.push_message(&RconMessage::CommandResultPart {
            total_parts: 2,
            part_index: 0,
            text: "first ".to_string(),
        })
        .push_message(&RconMessage::ServerNotice {
            sequence: 42,
            text: "Player #3 connected".to_string(),
        })
        .push_message(&RconMessage::CommandResultPart {
            total_parts: 2,
            part_index: 1,
            text: "second".to_string(),
        });
    })
    .await;
    let mut notices = Vec::new();

    // Act
    let response = client
        .execute("bans", |text| notices.push(text.to_string()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response, "first second");
    assert_eq!(notices, vec!["Player #3 connected".to_string()]);
    let acks: Vec<_> = sent_messages(&log)
        .into_iter()
        .filter(|m| matches!(m, RconMessage::ServerNoticeAck { .. }))
        .collect();
    assert_eq!(acks, vec![RconMessage::ServerNoticeAck { sequence: 42 }]);
}

#[tokio::test]
async fn test_notice_before_login_result_is_acked() {
    // Arrange
    let mut transport = ScriptedTransport::new();
    transport
        .push_message(&RconMessage::ServerNotice {
            sequence: 7,
            text: "RCon admin #0 logged in".to_string(),
        })
        .push_message(&RconMessage::LoginResult { result: 1 });
    let log = transport.sent_log();
    let mut client = RconClient::new(transport);

    // Act
    client.login("secret").await.unwrap();

    // Assert
    assert_eq!(
        sent_messages(&log)[1],
        RconMessage::ServerNoticeAck { sequence: 7 }
    );
}

// ── Sequence numbering ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_consecutive_commands_use_consecutive_sequences_mod_256() {
    // Arrange – start near the wrap point
    let start = 253u8;
    let count = 6usize;
    let (mut client, log) =
        logged_in_client(Session::with_sequence(SequenceCounter::starting_at(start)), |t| {
            for i in 0..count {
                t.push_message(&RconMessage::CommandResult {
                    sequence: start.wrapping_add(i as u8),
                    text: format!("reply {i}"),
                });
            }
        })
        .await;

    // Act
    for i in 0..count {
        let reply = client.execute("players", |_| {}).await.unwrap();
        assert_eq!(reply, format!("reply {i}"));
    }

    // Assert
    let sequences: Vec<u8> = sent_messages(&log)
        .into_iter()
        .filter_map(|m| match m {
            RconMessage::Command { sequence, .. } => Some(sequence),
            _ => None,
        })
        .collect();
    assert_eq!(sequences, vec![253, 254, 255, 0, 1, 2]);
}

#[tokio::test]
async fn test_reply_with_wrong_sequence_fails_session() {
    let (mut client, _log) = logged_in_client(Session::new(), |t| {
        t.push_message(&RconMessage::CommandResult {
            sequence: 9,
            text: "stale".to_string(),
        });
    })
    .await;

    let err = client.execute("players", |_| {}).await.unwrap_err();

    assert!(matches!(
        err,
        RconError::Session(SessionError::SequenceMismatch {
            expected: 0,
            received: 9
        })
    ));
}

// ── Timeouts and illegal messages ─────────────────────────────────────────────

#[tokio::test]
async fn test_missing_reply_times_out_and_fails_session() {
    // Arrange – no command reply queued
    let (client, _log) = logged_in_client(Session::new(), |_| {}).await;
    let mut client = client.with_receive_timeout(Duration::from_millis(100));

    // Act
    let err = client.execute("players", |_| {}).await.unwrap_err();

    // Assert
    assert!(matches!(err, RconError::Timeout(d) if d == Duration::from_millis(100)));
    assert_eq!(client.session().state(), SessionState::Failed);
}

#[tokio::test]
async fn test_timeout_mid_reassembly_fails_session() {
    let (mut client, _log) = logged_in_client(Session::new(), |t| {
        t.push_message(&RconMessage::CommandResultPart {
            total_parts: 3,
            part_index: 0,
            text: "a".to_string(),
        })
        .push_timeout();
    })
    .await;

    let err = client.execute("bans", |_| {}).await.unwrap_err();

    assert!(matches!(err, RconError::Timeout(_)));
}

#[tokio::test]
async fn test_second_login_result_while_awaiting_reply_is_unexpected() {
    let (mut client, _log) = logged_in_client(Session::new(), |t| {
        t.push_message(&RconMessage::LoginResult { result: 1 });
    })
    .await;

    let err = client.execute("players", |_| {}).await.unwrap_err();

    assert!(matches!(
        err,
        RconError::Session(SessionError::UnexpectedMessage { .. })
    ));
}
