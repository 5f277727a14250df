//! Error types for key system registration and precondition checks.

use thiserror::Error;

/// Errors that can occur while registering key systems, containers or codecs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KeySystemError {
    /// The key system is not directly registered.
    #[error("{0} is not a known concrete system")]
    NotConcrete(String),

    /// Key system descriptors must carry a name.
    #[error("key system name cannot be empty")]
    EmptyName,

    /// Another descriptor (or a parent placeholder) already uses this name.
    #[error("key system {0} is already registered")]
    AlreadyRegistered(String),

    /// The parent name refers to a concrete key system.
    #[error("parent {parent} of {key_system} is a concrete key system")]
    ParentIsConcrete { key_system: String, parent: String },

    /// Only one child may claim a given parent.
    #[error("parent {parent} of {key_system} is already claimed by {claimed_by}")]
    ParentAlreadyClaimed {
        key_system: String,
        parent: String,
        claimed_by: String,
    },

    /// A key system using the built-in AES decryptor cannot name an external one.
    #[error("key system {0} uses the AES decryptor and cannot have an external type")]
    AesWithExternalType(String),

    /// Codec masks must have exactly one bit set.
    #[error("codec {codec} mask {mask:#x} must have exactly one bit set")]
    InvalidCodecMask { codec: String, mask: u32 },

    /// The codec token is already registered with a different bit.
    #[error("codec {codec} is already registered with mask {existing:#x} (got {mask:#x})")]
    ConflictingCodec {
        codec: String,
        existing: u32,
        mask: u32,
    },

    /// Another codec already owns this bit.
    #[error("codec {codec} cannot use mask {mask:#x}, it belongs to {owner}")]
    CodecBitTaken {
        codec: String,
        mask: u32,
        owner: String,
    },

    /// Aliases can only name registered codecs.
    #[error("unknown codec {0}")]
    UnknownCodec(String),

    /// Init data types are `webm`, `cenc` and `keyids`.
    #[error("unknown init data type {0}")]
    UnknownInitDataType(String),

    /// The container is already registered with a different mask.
    #[error("container {container} is already registered with mask {existing:#x} (got {mask:#x})")]
    ConflictingContainer {
        container: String,
        existing: u32,
        mask: u32,
    },
}

/// Result type for key system registration.
pub type Result<T> = std::result::Result<T, KeySystemError>;
