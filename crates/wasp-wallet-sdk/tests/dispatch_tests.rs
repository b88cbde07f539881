//! Dispatcher round trips against the in-process stub module

mod common;

use common::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use serial_test::serial;
use std::io::Write;
use wasp_wallet_config::ConfigError;
use wasp_wallet_sdk::error::GENERIC_NATIVE_ERROR;
use wasp_wallet_sdk::methods::{NoData, RawMethod, UtilsMethod, WalletMethod};
use wasp_wallet_sdk::types::LoggerConfig;
use wasp_wallet_sdk::{
    ClientPtr, Config, ConfigLoader, DispatchOptions, ErrorChannelMode, LevelFilter, LoadError,
    ResourceKind, Sdk, SdkError, SecretManagerPtr, WalletPtr,
};

fn echo() -> RawMethod {
    RawMethod::without_data("echo")
}

#[test]
#[serial]
fn test_echo_payload_destroys_native_string_once() {
    reset();
    let sdk = StubModule::new().sdk();

    let response = sdk.call_utils_method(&echo()).unwrap();
    assert_eq!(response.as_bytes(), ECHO_42.as_bytes());
    assert!(response.reclaim_anomaly().is_none());
    assert_eq!(strings_destroyed(), 1);

    let payload: String = response.parse().unwrap();
    assert_eq!(payload, "42");
    assert_eq!(strings_destroyed(), 1);
}

#[rstest]
#[case(ErrorChannelMode::Serialized)]
#[case(ErrorChannelMode::Concurrent)]
#[serial]
fn test_typed_call_in_either_error_channel_mode(#[case] mode: ErrorChannelMode) {
    reset();
    let sdk = StubModule::new()
        .bind(DispatchOptions {
            error_channel: mode,
            strict_reclaim: false,
        })
        .unwrap();
    let wallet = sdk.create_wallet(&json!({})).unwrap();

    let payload: String = sdk.call_wallet_method_typed(wallet, &echo()).unwrap();
    assert_eq!(payload, "42");
}

#[test]
#[serial]
fn test_request_reaches_native_side_as_name_and_data() {
    reset();
    let sdk = StubModule::new().sdk();
    let wallet = sdk.create_wallet(&json!({"storagePath": "./db"})).unwrap();

    sdk.call_wallet_method(wallet, &WalletMethod::GetAccounts(NoData))
        .unwrap();

    assert_eq!(
        requests(),
        vec![
            r#"{"storagePath":"./db"}"#.to_string(),
            r#"{"name":"getAccounts","data":null}"#.to_string(),
        ]
    );
}

#[test]
#[serial]
fn test_null_sentinel_reports_last_error() {
    reset();
    let sdk = StubModule::new().sdk();
    fail_next(Some("node unreachable"));

    let err = sdk.call_utils_method(&echo()).unwrap_err();
    assert!(matches!(err, SdkError::Native(ref message) if message == "node unreachable"));
    assert_eq!(strings_destroyed(), 0);
}

#[test]
#[serial]
fn test_null_sentinel_without_last_error_uses_fallback() {
    reset();
    let sdk = StubModule::new().sdk();
    fail_next(None);

    let err = sdk.call_utils_method(&echo()).unwrap_err();
    assert!(matches!(err, SdkError::Native(ref message) if message == GENERIC_NATIVE_ERROR));
}

#[test]
#[serial]
fn test_error_envelope_is_remote_error() {
    reset();
    let sdk = StubModule::new().sdk();
    reply(r#"{"type":"error","payload":{"type":"wallet","error":"insufficient funds"}}"#);

    let err = sdk
        .call_utils_method_typed::<serde_json::Value>(&echo())
        .unwrap_err();
    assert_eq!(err.remote_message(), Some("insufficient funds"));
    assert_eq!(strings_destroyed(), 1);
}

#[test]
#[serial]
fn test_status_reduces_envelope_tag() {
    reset();
    let sdk = StubModule::new().sdk();
    reply(r#"{"type":"ok","payload":null}"#);
    reply(r#"{"type":"accounts","payload":[]}"#);

    assert!(sdk.call_utils_method_status(&echo()).unwrap());
    assert!(!sdk.call_utils_method_status(&echo()).unwrap());
}

#[test]
#[serial]
fn test_destroy_null_is_noop_for_every_kind() {
    reset();
    let sdk = StubModule::new().sdk();

    sdk.destroy_client(ClientPtr::NULL).unwrap();
    sdk.destroy_wallet(WalletPtr::NULL).unwrap();
    sdk.destroy_secret_manager(SecretManagerPtr::NULL).unwrap();

    assert_eq!(resources_destroyed(), 0);
}

#[test]
#[serial]
fn test_lifecycle_round_trip() {
    reset();
    let sdk = StubModule::new().sdk();

    let client = sdk.create_client(&json!({"nodes": []})).unwrap();
    let secret_manager = sdk.create_secret_manager(&json!({"ledgerNano": true})).unwrap();
    assert!(!client.is_null());
    assert_ne!(client.as_raw(), secret_manager.as_raw());

    sdk.destroy_client(client).unwrap();
    sdk.destroy_secret_manager(secret_manager).unwrap();
    assert_eq!(resources_destroyed(), 2);
}

#[test]
#[serial]
fn test_wallet_relations() {
    reset();
    let sdk = StubModule::new().sdk();
    let wallet = sdk.create_wallet(&json!({})).unwrap();

    let client = sdk.get_client_from_wallet(wallet).unwrap();
    let secret_manager = sdk.get_secret_manager_from_wallet(wallet).unwrap();
    assert_eq!(client.as_raw(), wallet.as_raw() + 1);
    assert_eq!(secret_manager.as_raw(), wallet.as_raw() + 2);

    let err = sdk.get_client_from_wallet(WalletPtr::NULL).unwrap_err();
    assert!(matches!(
        err,
        SdkError::InvalidHandle {
            kind: ResourceKind::Wallet
        }
    ));
}

#[test]
#[serial]
fn test_create_failure_is_native_error() {
    reset();
    let sdk = StubModule::new().sdk();
    fail_creates();

    let err = sdk.create_wallet(&json!({})).unwrap_err();
    assert!(matches!(err, SdkError::Native(ref message) if message == "invalid options"));
}

#[test]
#[serial]
fn test_method_call_on_null_handle_never_reaches_native_side() {
    reset();
    let sdk = StubModule::new().sdk();

    let err = sdk
        .call_secret_manager_method(SecretManagerPtr::NULL, &echo())
        .unwrap_err();
    assert!(matches!(
        err,
        SdkError::InvalidHandle {
            kind: ResourceKind::SecretManager
        }
    ));
    assert!(requests().is_empty());
}

#[test]
#[serial]
fn test_refused_destroy_is_attached_to_response() {
    reset();
    let sdk = StubModule::new().sdk();
    refuse_string_destroy();

    let response = sdk.call_utils_method(&echo()).unwrap();
    assert!(matches!(
        response.reclaim_anomaly(),
        Some(SdkError::BufferReclaim(reason)) if reason == "double free detected"
    ));
    let payload: String = response.parse().unwrap();
    assert_eq!(payload, "42");
    assert_eq!(strings_destroyed(), 1);
}

#[test]
#[serial]
fn test_refused_destroy_fails_call_in_strict_mode() {
    reset();
    let sdk = StubModule::new()
        .bind(DispatchOptions {
            strict_reclaim: true,
            ..DispatchOptions::default()
        })
        .unwrap();
    refuse_string_destroy();

    let err = sdk.call_utils_method(&echo()).unwrap_err();
    assert!(matches!(err, SdkError::BufferReclaim(_)));
    assert!(!err.is_fatal());
}

#[test]
#[serial]
fn test_missing_exports_reported_together() {
    reset();
    let err = StubModule::new()
        .without(&["destroy_string", "call_utils_method"])
        .bind(DispatchOptions::default())
        .unwrap_err();

    match err {
        SdkError::SymbolBind { missing } => {
            assert_eq!(missing, vec!["call_utils_method", "destroy_string"]);
        }
        other => panic!("expected SymbolBind, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_event_export_is_optional() {
    reset();
    let sdk = StubModule::new().without(&["listen_wallet"]).sdk();
    assert!(!sdk.supports_events());

    let wallet = sdk.create_wallet(&json!({})).unwrap();
    let err = sdk.listen_wallet(wallet, &[]).unwrap_err();
    assert!(matches!(err, SdkError::SymbolBind { ref missing } if missing == &["listen_wallet"]));
}

#[test]
#[serial]
fn test_init_logger_sends_config() {
    reset();
    let sdk = StubModule::new().sdk();

    sdk.init_logger(&LoggerConfig::stdout(LevelFilter::Debug))
        .unwrap();
    assert_eq!(
        last_request(),
        json!({"name": "stdout", "levelFilter": "debug"})
    );
}

#[test]
#[serial]
fn test_rejected_logger_is_native_error() {
    reset();
    let sdk = StubModule::new().sdk();
    reject_logger();

    let err = sdk
        .init_logger(&LoggerConfig::stdout(LevelFilter::Info))
        .unwrap_err();
    assert!(matches!(err, SdkError::Native(ref message) if message == "logger already initialised"));
}

#[test]
#[serial]
fn test_concurrent_calls_keep_their_own_results_and_errors() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 50;

    reset();
    mirror_requests();
    let sdk = StubModule::new().sdk();
    let wallets: Vec<WalletPtr> = (0..THREADS)
        .map(|_| sdk.create_wallet(&json!({})).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for (thread, &wallet) in wallets.iter().enumerate() {
            let sdk = &sdk;
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    if (thread + round) % 2 == 0 {
                        let name = format!("{}thread {} round {}", MIRROR_FAIL_PREFIX, thread, round);
                        let err = sdk
                            .call_wallet_method(wallet, &RawMethod::without_data(name))
                            .unwrap_err();
                        let expected = format!("thread {} round {}", thread, round);
                        assert!(
                            matches!(err, SdkError::Native(ref message) if *message == expected),
                            "thread {} round {} got {:?}",
                            thread,
                            round,
                            err
                        );
                    } else {
                        let name = format!("t{}r{}", thread, round);
                        let payload: serde_json::Value = sdk
                            .call_wallet_method_typed(wallet, &RawMethod::without_data(name.clone()))
                            .unwrap();
                        assert_eq!(payload, json!({"name": name, "token": wallet.as_raw()}));
                    }
                }
            });
        }
    });

    assert_eq!(strings_destroyed(), THREADS * ROUNDS / 2);
}

#[test]
#[serial]
fn test_generate_mnemonic_via_utils_method() {
    reset();
    let sdk = StubModule::new().sdk();
    reply(r#"{"type":"generatedMnemonic","payload":"acid bench cable"}"#);

    let mnemonic = sdk
        .call_utils_method(&UtilsMethod::GenerateMnemonic(NoData))
        .unwrap()
        .parse_secret()
        .unwrap();
    assert_eq!(mnemonic.expose(), "acid bench cable");
}

#[test]
fn test_load_missing_module() {
    let err = Sdk::load("/nonexistent/libiota_sdk_native.so").unwrap_err();
    assert!(matches!(err, SdkError::Load(LoadError::LibraryNotFound(_))));
}

#[test]
fn test_load_file_that_is_not_a_library() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("libbogus.so");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"not an object file")
        .unwrap();

    let err = Sdk::load(&path).unwrap_err();
    assert!(matches!(err, SdkError::Load(LoadError::LoadFailed { .. })));
}

#[test]
#[serial]
fn test_from_config_without_library_is_config_error() {
    let err = Sdk::from_config(&Config::default()).unwrap_err();
    assert!(matches!(err, SdkError::Config(ConfigError::MissingLibrary)));
}

#[test]
#[serial]
fn test_from_config_reads_dispatch_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wasp-wallet.toml");
    std::fs::write(
        &path,
        "[library]\npath = \"/nonexistent/libiota_sdk_native.so\"\n\n[dispatch]\nerror_channel = \"concurrent\"\nstrict_reclaim = true\n",
    )
    .unwrap();

    let config = ConfigLoader::with_global_config_path(dir.path().join("global.toml"))
        .load_from_file(&path)
        .unwrap();
    let options = DispatchOptions::from_config(&config);
    assert_eq!(options.error_channel, ErrorChannelMode::Concurrent);
    assert!(options.strict_reclaim);

    let err = Sdk::from_config(&config).unwrap_err();
    assert!(matches!(err, SdkError::Load(LoadError::LibraryNotFound(_))));
}
