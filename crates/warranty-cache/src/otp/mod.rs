//! One-time code issuance and verification

mod store;

pub use store::{generate_otp, OtpStore, OtpVerification};
