//! Bulk transfer concurrency configuration.

use serde::{Deserialize, Serialize};

use crate::types::ConnectionClass;

/// Concurrency caps for bulk operations (batch acceptance processing,
/// batch uploads by external collaborators), adapted to the observed
/// connection class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Concurrency cap on a constrained connection.
    pub constrained_concurrency: usize,
    /// Concurrency cap on a standard connection.
    pub standard_concurrency: usize,
    /// Concurrency cap on a fast connection.
    pub fast_concurrency: usize,
}

impl TransferConfig {
    /// The concurrency cap for the given connection class.
    pub fn concurrency_for(&self, class: ConnectionClass) -> usize {
        match class {
            ConnectionClass::Constrained => self.constrained_concurrency,
            ConnectionClass::Standard => self.standard_concurrency,
            ConnectionClass::Fast => self.fast_concurrency,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            constrained_concurrency: 1,
            standard_concurrency: 4,
            fast_concurrency: 8,
        }
    }
}
