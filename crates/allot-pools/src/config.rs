//! Pool engine configuration.

/// Configuration for the pool reconciliation engine.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Standalone deployments consume exported subscription data and
    /// treat virtualization ratios as final quantities; hosted
    /// deployments scale them against remaining physical capacity.
    pub standalone: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { standalone: false }
    }
}
