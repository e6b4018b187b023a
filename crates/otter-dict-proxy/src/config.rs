//! Proxy adapter configuration

use serde::{Deserialize, Serialize};

/// How symbol and void property keys are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKeyPolicy {
    /// Every trap raises `UnsupportedIdentifier`
    #[default]
    Reject,
    /// Reads answer `undefined`/`false`; mutations are refused
    TreatAsAbsent,
}

/// How property attributes in a definition are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DescriptorPolicy {
    /// Attributes a mapping cannot honor are a conversion error
    #[default]
    Strict,
    /// Attributes are ignored and only the value is stored
    Lenient,
}

/// Settings shared by every proxy of one handler.
///
/// Accessor definitions are refused under every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Symbol and void key handling.
    /// Default: reject
    pub symbol_keys: SymbolKeyPolicy,

    /// `defineProperty` attribute handling.
    /// Default: strict
    pub descriptors: DescriptorPolicy,
}

impl BridgeConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config that tolerates everything a mapping can tolerate.
    pub fn permissive() -> Self {
        Self {
            symbol_keys: SymbolKeyPolicy::TreatAsAbsent,
            descriptors: DescriptorPolicy::Lenient,
        }
    }

    /// Set the symbol key policy.
    pub fn symbol_keys(mut self, policy: SymbolKeyPolicy) -> Self {
        self.symbol_keys = policy;
        self
    }

    /// Set the descriptor policy.
    pub fn descriptors(mut self, policy: DescriptorPolicy) -> Self {
        self.descriptors = policy;
        self
    }

    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
