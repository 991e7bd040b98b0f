//! Secret codec for FOTT project settings.
//!
//! Protects connection secrets at rest using:
//! - AES-256-CBC with PKCS#7 padding
//! - A fresh random 16-byte IV per encryption
//! - 32-byte random keys, stored as base64 in application settings
//!
//! # Envelope format
//!
//! Encrypted values are persisted as a single string:
//!
//! ```text
//! base64( utf8( JSON.stringify({ ciphertext: <hex>, iv: <hex> }) ) )
//! ```
//!
//! The format is shared with project files written by the browser client and
//! must stay byte-compatible. Keys are never derived from passwords; each
//! named security token holds one random key for the lifetime of the profile.
//!
//! There is no authentication tag. `decrypt` succeeding is not proof that the
//! key was correct; `decrypt_object` at least rejects payloads that do not
//! parse as JSON.

mod cipher;
mod codec;
mod encoding;
pub mod envelope;
mod error;
mod key;

pub use cipher::IV_SIZE;
pub use codec::{decrypt, decrypt_object, encrypt, encrypt_object, hash};
pub use envelope::{Envelope, EnvelopeParts};
pub use error::{CryptoError, CryptoResult};
pub use key::{generate_key, SecretKey, KEY_SIZE};
