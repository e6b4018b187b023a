//! Shared fixtures for the proxy integration tests
#![allow(dead_code)]

use otter_dict_proxy::{BridgeConfig, BridgeError, DictBridge};
use otter_foreign::DictRef;
use otter_host::{Context, GcRef, HostConfig, PropertyKey, VmError};
use tracing_subscriber::EnvFilter;

/// Install a subscriber honoring `RUST_LOG`, once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Fixture {
    pub cx: Context,
    pub bridge: DictBridge,
    pub dict: DictRef,
    pub proxy: GcRef,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(HostConfig::default(), BridgeConfig::default())
    }

    pub fn with(host: HostConfig, config: BridgeConfig) -> Self {
        init_tracing();
        let mut cx = Context::new(host);
        let bridge = DictBridge::new(config);
        let dict = DictRef::new();
        let proxy = bridge.wrap(&mut cx, dict.clone());
        Self {
            cx,
            bridge,
            dict,
            proxy,
        }
    }
}

pub fn key(name: &str) -> PropertyKey {
    PropertyKey::string(name)
}

pub fn bridge_error(err: &VmError) -> &BridgeError {
    err.handler_error::<BridgeError>()
        .unwrap_or_else(|| panic!("expected a bridge error, got {err}"))
}
