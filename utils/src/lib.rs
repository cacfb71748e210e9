#![cfg_attr(not(feature = "std"), no_std)]

//! Helpers shared by the DKG and threshold encryption crates: powers of field elements, hashing
//! to the curve and to symmetric masks, and serde adapters for arkworks types.

#[macro_use]
pub mod macros;
pub mod ff;
pub mod hashing_utils;
pub mod serde_utils;
