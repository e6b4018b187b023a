//! # Otter Dict Proxy
//!
//! Live host proxies over reference-counted foreign mappings. Property
//! access on a proxy reads and writes the mapping directly; nothing is
//! copied. Each proxy owns one reference to its mapping and releases it
//! when the host collector finalizes the proxy.
//!
//! ## Example
//!
//! ```ignore
//! use otter_dict_proxy::{BridgeConfig, DictBridge};
//! use otter_foreign::DictRef;
//! use otter_host::{Context, PropertyKey, Value};
//!
//! let mut cx = Context::default();
//! let bridge = DictBridge::new(BridgeConfig::default());
//! let dict = DictRef::new();
//! let proxy = bridge.wrap(&mut cx, dict.clone());
//!
//! cx.set(proxy, &PropertyKey::string("a"), Value::int32(1))?;
//! assert_eq!(dict.len(), 1);
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod bridge;
pub mod coerce;
pub mod config;
pub mod error;
pub mod handler;
pub mod key;
pub mod slot;

pub use bridge::DictBridge;
pub use coerce::{MAX_SAFE_INTEGER, foreign_to_host, host_to_foreign};
pub use config::{BridgeConfig, DescriptorPolicy, SymbolKeyPolicy};
pub use error::{BridgeError, BridgeResult};
pub use handler::{DictProxyHandler, FAMILY};
pub use key::{TranslatedKey, foreign_key_to_identifier, identifier_to_foreign_key};
pub use slot::{ForeignSlot, ProxyState, wrap_dict};
