use thiserror::Error;

/// Setup-time validation failures.
///
/// These are the only recoverable errors the binding reports directly;
/// runtime failures (network, signature mismatch) surface through the
/// error callback instead, and marshalling misuse is a panic.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid DSA public key: not a PEM-encoded DSA key")]
    InvalidDsaPublicKey,

    #[error("invalid EdDSA public key: not a base64-encoded Ed25519 key")]
    InvalidEdDsaPublicKey,
}
