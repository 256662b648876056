//! # Shared Constants
//!
//! Default names and markers shared by the runner, the store backends and the CLI.

/// The organization's email domain an employee must have to be imported.
pub const DEFAULT_DOMAIN_SUFFIX: &str = "@zenika.com";

/// Collection holding one document per import attempt, written before the directory call.
pub const REQUESTS_COLLECTION: &str = "alibeez-requests";

/// Collection holding one document per directory answer.
pub const RESPONSES_COLLECTION: &str = "alibeez-responses";

/// Collection holding one `ImportRecord` per successful import, keyed by request id.
pub const IMPORTS_COLLECTION: &str = "employee-imports";

/// Sub-collection of an import record holding its employees, keyed by email.
pub const EMPLOYEES_SUBCOLLECTION: &str = "employees";

/// Mask appended to (or replacing) an obfuscated credential.
pub const CREDENTIAL_MASK: &str = "***";

/// Credentials longer than this reveal their first `CREDENTIAL_VISIBLE_CHARS` characters.
pub const CREDENTIAL_REVEAL_THRESHOLD: usize = 8;

pub const CREDENTIAL_VISIBLE_CHARS: usize = 4;

/// Default request timeout for the directory HTTP client, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
