//! Tests for the session layer
//!
//! These tests verify:
//! - The login exchange and its failure modes
//! - Read-only replies are cached by command text until a mutation
//! - 300 outside the login exchange is an error
//! - A failed stream terminates the session for good
//! - Disconnect says QUIT and closes the transport

use cgadmin::protocol::{AccountAddress, Command, Reply};
use cgadmin::transport::Transport;
use cgadmin::{CgError, Session};

use crate::support::{test_config, FakeServer, Scripted, ADMIN, ADMIN_PASSWORD, DOMAIN};

// =============================================================================
// Login
// =============================================================================

#[test]
fn test_login_sequence() {
    let (session, server) = FakeServer::session();

    assert_eq!(
        server.sent(),
        vec![
            format!("USER {}", ADMIN),
            format!("PASS {}", ADMIN_PASSWORD),
            "INLINE".to_string(),
        ]
    );
    assert!(!session.is_terminated());
    assert_eq!(session.cached_len(), 0);
}

#[test]
fn test_login_accepts_ok_to_user() {
    let transport = Scripted::raw(&["200 ready", "200 OK", "200 OK", "200 OK", "201 (a.bm)"]);
    let mut session = Session::with_transport(test_config(), transport).unwrap();

    assert_eq!(session.list_domains().unwrap(), vec!["a.bm"]);
}

#[test]
fn test_boxed_transport() {
    let transport: Box<dyn Transport> = Box::new(Scripted::logged_in(&["201 (a.bm,b.bm)"]));
    let mut session = Session::with_transport(test_config(), transport).unwrap();

    assert_eq!(session.list_domains().unwrap(), vec!["a.bm", "b.bm"]);
}

#[test]
fn test_login_wrong_password() {
    let config = cgadmin::Config::builder().login(ADMIN).password("wrong").build();

    match Session::with_transport(config, FakeServer::new()) {
        Err(CgError::Protocol { code, message }) => {
            assert_eq!(code, 515);
            assert_eq!(message, "Incorrect password");
        }
        Err(other) => panic!("Expected protocol error, got {:?}", other),
        Ok(_) => panic!("Login should fail"),
    }
}

#[test]
fn test_login_rejects_unsafe_credentials() {
    for (login, password) in [
        ("", "pw"),
        ("post master", "pw"),
        ("postmaster\nDeleteAccount x@testdomain.bm", "pw"),
        ("postmaster", "pw\r\nQUIT"),
    ] {
        let config = cgadmin::Config::builder().login(login).password(password).build();
        let transport = Scripted::logged_in(&[]);
        let wire = transport.clone();

        let result = Session::with_transport(config, transport);
        assert!(matches!(result, Err(CgError::Validation(_))), "{:?} should be rejected", login);
        assert!(wire.sent().is_empty());
    }
}

#[test]
fn test_login_without_greeting() {
    let result = Session::with_transport(test_config(), Scripted::raw(&[]));
    assert!(matches!(result, Err(CgError::StreamTerminated)));
}

#[test]
fn test_login_rejects_malformed_greeting_reply() {
    let result = Session::with_transport(test_config(), Scripted::raw(&["200 ready", "hello"]));
    assert!(matches!(result, Err(CgError::MalformedResponse(_))));
}

// =============================================================================
// Request / Response
// =============================================================================

#[test]
fn test_execute_inline_and_ok() {
    let transport = Scripted::logged_in(&["201 (x.bm,y.bm)", "200 OK"]);
    let wire = transport.clone();
    let mut session = Session::with_transport(test_config(), transport).unwrap();

    let reply = session.execute(&Command::ListDomains).unwrap();
    assert_eq!(reply, Reply::Inline("(x.bm,y.bm)".to_string()));

    let address = AccountAddress::new("jdoe", "x.bm").unwrap();
    let reply = session.execute(&Command::DeleteAccount { account: address }).unwrap();
    assert_eq!(reply.text(), "200 OK");

    assert_eq!(wire.sent().last().unwrap(), "DeleteAccount jdoe@x.bm");
}

#[test]
fn test_expecting_input_after_login_is_error() {
    let mut session = Session::with_transport(test_config(), Scripted::logged_in(&["300 More data"])).unwrap();

    match session.execute(&Command::ListDomains) {
        Err(CgError::Protocol { code, message }) => {
            assert_eq!(code, 300);
            assert_eq!(message, "More data");
        }
        other => panic!("Expected protocol error, got {:?}", other),
    }
    assert!(!session.is_terminated());
}

#[test]
fn test_malformed_reply_keeps_session_usable() {
    let transport = Scripted::logged_in(&["garbage", "201 (a.bm)"]);
    let mut session = Session::with_transport(test_config(), transport).unwrap();

    assert!(matches!(
        session.execute(&Command::ListDomains),
        Err(CgError::MalformedResponse(_))
    ));
    assert!(!session.is_terminated());
    assert_eq!(session.cached_len(), 1);

    // the bad line is what got cached for this text; other queries go out
    let reply = session.execute(&Command::GetCurrentController);
    assert_eq!(reply.unwrap(), Reply::Inline("(a.bm)".to_string()));
}

#[test]
fn test_error_reply_passes_message_through() {
    let (mut session, _server) = FakeServer::session();

    let err = session.list_accounts("nowhere.bm").unwrap_err();
    assert_eq!(err.code(), Some(512));
    assert!(err.to_string().contains("Unknown secondary domain name"));
    assert!(!session.is_terminated());
}

// =============================================================================
// Caching
// =============================================================================

#[test]
fn test_read_only_replies_cached() {
    let (mut session, server) = FakeServer::session();
    let before = server.sent_count();

    let first = session.list_domains().unwrap();
    let second = session.list_domains().unwrap();

    assert_eq!(first, second);
    assert_eq!(server.sent_count(), before + 1);
    assert_eq!(session.cached_len(), 1);
}

#[test]
fn test_mutation_clears_cache() {
    let (mut session, server) = FakeServer::session();

    assert!(session.list_accounts(DOMAIN).unwrap().is_empty());
    assert_eq!(session.cached_len(), 1);

    session.create_account(DOMAIN, "jdoe", "pw").unwrap();
    assert_eq!(session.cached_len(), 0);

    assert_eq!(session.list_accounts(DOMAIN).unwrap(), vec!["jdoe"]);
    let listings = server
        .sent()
        .iter()
        .filter(|line| line.starts_with("ListAccounts"))
        .count();
    assert_eq!(listings, 2);
}

#[test]
fn test_failed_mutation_still_clears_cache() {
    let (mut session, _server) = FakeServer::session();
    session.create_account(DOMAIN, "jdoe", "pw").unwrap();

    session.list_domains().unwrap();
    assert_eq!(session.cached_len(), 1);

    assert!(session.create_account(DOMAIN, "jdoe", "pw").is_err());
    assert_eq!(session.cached_len(), 0);
}

#[test]
fn test_clear_cache_forces_resend() {
    let (mut session, server) = FakeServer::session();

    session.current_controller().unwrap();
    session.clear_cache();
    session.current_controller().unwrap();

    let asked = server
        .sent()
        .iter()
        .filter(|line| *line == "GetCurrentController")
        .count();
    assert_eq!(asked, 2);
}

// =============================================================================
// Termination
// =============================================================================

#[test]
fn test_end_of_stream_terminates_session() {
    let (mut session, server) = FakeServer::session();
    server.hang_up_after(3);

    let err = session.list_domains().unwrap_err();
    assert!(matches!(err, CgError::StreamTerminated));
    assert!(session.is_terminated());

    let sent = server.sent_count();
    assert!(matches!(session.list_accounts(DOMAIN), Err(CgError::StreamTerminated)));
    assert_eq!(server.sent_count(), sent);
}

#[test]
fn test_terminated_session_skips_quit() {
    let (mut session, server) = FakeServer::session();
    server.hang_up_after(3);
    let _ = session.list_domains();

    session.disconnect().unwrap();
    assert!(server.is_closed());
    assert!(!server.sent().iter().any(|line| line == "QUIT"));
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn test_disconnect_sends_quit_and_closes() {
    let (session, server) = FakeServer::session();

    session.disconnect().unwrap();

    assert_eq!(server.sent().last().unwrap(), "QUIT");
    assert!(server.is_closed());
}

#[test]
fn test_disconnect_tolerates_missing_farewell() {
    let transport = Scripted::logged_in(&[]);
    let wire = transport.clone();
    let session = Session::with_transport(test_config(), transport).unwrap();

    session.disconnect().unwrap();
    assert_eq!(wire.sent().last().unwrap(), "QUIT");
}
