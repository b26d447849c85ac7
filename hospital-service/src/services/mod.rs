//! Domain services for hospital-service.

pub mod directory;
pub mod export;
pub mod extract;
pub mod identity;
pub mod ledger;
pub mod metrics;

pub use directory::{InMemoryDirectory, PatientDirectory};
pub use extract::ImageBillReader;
pub use identity::{Credential, Identity, IdentityGate, StaticCredentialGate};
pub use ledger::{BillingLedger, BillingPolicy, LedgerError};
pub use metrics::{get_metrics, init_metrics};
