#![cfg_attr(docsrs, feature(doc_cfg))]

//! This crate answers Encrypted Media Extensions (EME) capability questions:
//! whether a key system is supported for a container and codec list, which
//! decryptor serves it and which name to report for usage metrics.
//!
//! The built-in Clear Key system (`org.w3.clearkey`) is always available.
//! Further key systems come from a [`KeySystemSource`], which the registry
//! polls before every query and whose descriptor list replaces the previous
//! one wholesale.
//!
//! # Optional Features
//!
//! The following are a list of [Cargo features](https://doc.rust-lang.org/stable/cargo/reference/features.html#the-features-section) that can be
//! enabled or disabled:
//!
//! - **proprietary-codecs**: Registers `audio/mp4` and `video/mp4` containers with the `mp4a`, `avc1` and `avc3` codecs.
//! - **serde**: Derives `Serialize` and `Deserialize` for [`KeySystemDescriptor`].

pub mod codecs;
pub mod source;
pub mod telemetry;

mod checked;
mod descriptor;
mod error;
mod registry;

pub use checked::Checked;
pub use descriptor::{KeySystemDescriptor, KeySystemDescriptorBuilder};
pub use error::{KeySystemError, Result};
pub use registry::*;
pub use source::KeySystemSource;
