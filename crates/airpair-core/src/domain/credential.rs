//! One-time pairing credential shown to the user as a QR code.
//!
//! Android's "Pair device with QR code" screen expects a Wi-Fi style payload:
//!
//! ```text
//! WIFI:T:ADB;S:<network name>;P:<password>;;
//! ```
//!
//! The network name is not a real SSID; it only has to be unique enough that
//! the phone and this process agree on which pairing session they are in.  The
//! password is what `adb pair` later presents to the device.
//!
//! The credential is generated once per process and never persisted.

use rand::Rng;

/// Prefix of every generated network name.
pub const NETWORK_NAME_PREFIX: &str = "ADB_WIFI_";

/// Number of random letters in the network-name suffix and in the password.
pub const CODE_LENGTH: usize = 5;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The network name and password encoded into the pairing QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCredential {
    network_name: String,
    password: String,
}

impl PairingCredential {
    /// Generates a fresh credential from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generates a credential from the supplied RNG.
    ///
    /// Tests pass a seeded RNG to get a reproducible credential.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            network_name: format!("{NETWORK_NAME_PREFIX}{}", random_letters(rng, CODE_LENGTH)),
            password: random_letters(rng, CODE_LENGTH),
        }
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the text to encode in the QR code.
    pub fn qr_payload(&self) -> String {
        format!("WIFI:T:ADB;S:{};P:{};;", self.network_name, self.password)
    }
}

fn random_letters<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}
