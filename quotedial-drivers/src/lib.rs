//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in quotedial-core:
//!
//! - Hobby servo on any `embedded-hal` PWM channel

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod servo;
