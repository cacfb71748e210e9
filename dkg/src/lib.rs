#![cfg_attr(not(feature = "std"), no_std)]

//! # Distributed key generation
//!
//! Feldman verifiable secret sharing run by every participant as a dealer, which gives a
//! distributed key generation without a trusted dealer. Each of the `n` participants
//!
//! 1. generates a random polynomial of degree `t - 1` ([`polynomial`]),
//! 2. sends participant `i` the evaluation of its polynomial at `i` and publishes the verification
//!    vector, i.e. the coefficients of its polynomial multiplied by a public generator ([`dkg`]),
//! 3. verifies the shares it receives against the senders' verification vectors and adds up the
//!    valid ones to get its share of the distributed secret ([`dkg`], [`accumulator`]).
//!
//! The threshold public key is the sum of the first element of the verification vectors of all
//! qualified participants and can be computed by anyone. Any `t` shares of the distributed
//! secret can reconstruct it, fewer reveal nothing.

pub mod accumulator;
pub mod common;
pub mod dkg;
pub mod error;
pub mod polynomial;
