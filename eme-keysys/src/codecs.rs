//! Codec, container and init data type tables.
//!
//! Every codec token maps to a single bit. Containers and key systems carry
//! a mask built from those bits, so checking a codec against both is two
//! `&` operations rather than a table scan.

use crate::error::{KeySystemError, Result};
use std::{collections::HashMap, fmt, str::FromStr};

pub const CODEC_NONE: u32 = 0;
pub const CODEC_WEBM_VORBIS: u32 = 1 << 0;
pub const CODEC_WEBM_VP8: u32 = 1 << 1;
pub const CODEC_WEBM_VP9: u32 = 1 << 2;
pub const CODEC_WEBM_AUDIO_ALL: u32 = CODEC_WEBM_VORBIS;
pub const CODEC_WEBM_VIDEO_ALL: u32 = CODEC_WEBM_VP8 | CODEC_WEBM_VP9;
pub const CODEC_WEBM_ALL: u32 = CODEC_WEBM_AUDIO_ALL | CODEC_WEBM_VIDEO_ALL;

pub const CODEC_MP4_AAC: u32 = 1 << 3;
pub const CODEC_MP4_AVC1: u32 = 1 << 4;
pub const CODEC_MP4_AUDIO_ALL: u32 = CODEC_MP4_AAC;
pub const CODEC_MP4_VIDEO_ALL: u32 = CODEC_MP4_AVC1;
pub const CODEC_MP4_ALL: u32 = CODEC_MP4_AUDIO_ALL | CODEC_MP4_VIDEO_ALL;

/// Codecs known to the registry out of the box.
#[cfg(not(feature = "proprietary-codecs"))]
pub const CODEC_ALL: u32 = CODEC_WEBM_ALL;
/// Codecs known to the registry out of the box.
#[cfg(feature = "proprietary-codecs")]
pub const CODEC_ALL: u32 = CODEC_WEBM_ALL | CODEC_MP4_ALL;

const BUILTIN_CONTAINERS: &[(&str, u32)] = &[
    ("audio/webm", CODEC_WEBM_AUDIO_ALL),
    ("video/webm", CODEC_WEBM_ALL),
    #[cfg(feature = "proprietary-codecs")]
    ("audio/mp4", CODEC_MP4_AUDIO_ALL),
    #[cfg(feature = "proprietary-codecs")]
    ("video/mp4", CODEC_MP4_ALL),
];

const BUILTIN_CODECS: &[(&str, u32)] = &[
    ("vorbis", CODEC_WEBM_VORBIS),
    ("vp8", CODEC_WEBM_VP8),
    ("vp9", CODEC_WEBM_VP9),
    #[cfg(feature = "proprietary-codecs")]
    ("mp4a", CODEC_MP4_AAC),
    #[cfg(feature = "proprietary-codecs")]
    ("avc1", CODEC_MP4_AVC1),
];

/// Alternative tokens for a codec above, as `(alias, codec)`.
const BUILTIN_CODEC_ALIASES: &[(&str, &str)] = &[
    ("vp8.0", "vp8"),
    ("vp9.0", "vp9"),
    #[cfg(feature = "proprietary-codecs")]
    ("avc3", "avc1"),
];

/// Initialization data formats a key system can accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitDataType {
    WebM,
    Cenc,
    KeyIds,
}

impl InitDataType {
    pub const ALL: [InitDataType; 3] = [Self::WebM, Self::Cenc, Self::KeyIds];

    /// Bit used for this type in a descriptor's init data type mask.
    pub const fn mask(self) -> u32 {
        match self {
            Self::WebM => 1 << 0,
            Self::Cenc => 1 << 1,
            Self::KeyIds => 1 << 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Cenc => "cenc",
            Self::KeyIds => "keyids",
        }
    }
}

impl fmt::Display for InitDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InitDataType {
    type Err = KeySystemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "webm" => Ok(Self::WebM),
            "cenc" => Ok(Self::Cenc),
            "keyids" => Ok(Self::KeyIds),
            _ => Err(KeySystemError::UnknownInitDataType(s.to_owned())),
        }
    }
}

/// Container and codec masks used to answer media type queries.
#[derive(Clone, Debug, Default)]
pub struct CodecTable {
    containers: HashMap<String, u32>,
    codecs: HashMap<String, u32>,
    /// Codec bit to the token that registered it.
    owners: HashMap<u32, String>,
}

impl CodecTable {
    /// Create a table holding the built-in WebM (and, with the
    /// `proprietary-codecs` feature, MP4) containers and codecs.
    pub fn new() -> Self {
        Self {
            containers: BUILTIN_CONTAINERS
                .iter()
                .map(|(name, mask)| (name.to_string(), *mask))
                .collect(),
            codecs: BUILTIN_CODECS
                .iter()
                .map(|(name, mask)| (name.to_string(), *mask))
                .chain(BUILTIN_CODEC_ALIASES.iter().filter_map(|(alias, codec)| {
                    let (_, mask) = BUILTIN_CODECS.iter().find(|(name, _)| name == codec)?;
                    Some((alias.to_string(), *mask))
                }))
                .collect(),
            owners: BUILTIN_CODECS
                .iter()
                .map(|(name, mask)| (*mask, name.to_string()))
                .collect(),
        }
    }

    /// Register the codecs allowed inside a container.
    ///
    /// Registering the same mask again is a no-op. A different mask for an
    /// already registered container is rejected.
    pub fn add_container_mask(&mut self, container: &str, mask: u32) -> Result<()> {
        match self.containers.get(container) {
            Some(&existing) if existing == mask => Ok(()),
            Some(&existing) => Err(KeySystemError::ConflictingContainer {
                container: container.to_owned(),
                existing,
                mask,
            }),
            None => {
                self.containers.insert(container.to_owned(), mask);
                Ok(())
            }
        }
    }

    /// Register a codec token.
    ///
    /// The mask must be a single bit that no other codec owns. Use
    /// [`add_codec_alias`](Self::add_codec_alias) for tokens naming the same
    /// codec (`vp8` and `vp8.0`). A token cannot be moved to another bit.
    pub fn add_codec_mask(&mut self, codec: &str, mask: u32) -> Result<()> {
        if mask.count_ones() != 1 {
            return Err(KeySystemError::InvalidCodecMask {
                codec: codec.to_owned(),
                mask,
            });
        }

        if let Some(&existing) = self.codecs.get(codec) {
            if existing == mask {
                return Ok(());
            }

            return Err(KeySystemError::ConflictingCodec {
                codec: codec.to_owned(),
                existing,
                mask,
            });
        }

        if let Some(owner) = self.owners.get(&mask) {
            return Err(KeySystemError::CodecBitTaken {
                codec: codec.to_owned(),
                mask,
                owner: owner.to_owned(),
            });
        }

        self.codecs.insert(codec.to_owned(), mask);
        self.owners.insert(mask, codec.to_owned());
        Ok(())
    }

    /// Register `alias` as another token for the already registered `codec`.
    pub fn add_codec_alias(&mut self, alias: &str, codec: &str) -> Result<()> {
        let Some(mask) = self.codec_mask(codec) else {
            return Err(KeySystemError::UnknownCodec(codec.to_owned()));
        };

        match self.codecs.get(alias) {
            Some(&existing) if existing == mask => Ok(()),
            Some(&existing) => Err(KeySystemError::ConflictingCodec {
                codec: alias.to_owned(),
                existing,
                mask,
            }),
            None => {
                self.codecs.insert(alias.to_owned(), mask);
                Ok(())
            }
        }
    }

    pub fn container_mask(&self, container: &str) -> Option<u32> {
        self.containers.get(container).copied()
    }

    pub fn codec_mask(&self, codec: &str) -> Option<u32> {
        self.codecs.get(codec).copied()
    }

    /// Union of every registered codec bit.
    pub fn registered_codecs(&self) -> u32 {
        self.codecs.values().fold(CODEC_NONE, |acc, x| acc | x)
    }

    /// Codec tokens whose bit is set in `mask`, sorted.
    pub fn codec_names(&self, mask: u32) -> Vec<&str> {
        let mut names = self
            .codecs
            .iter()
            .filter(|(_, bit)| *bit & mask != 0)
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// A container is usable by a key system when it is registered and
    /// shares at least one codec with the key system.
    pub fn is_supported_container(&self, container: &str, key_system_codecs: u32) -> bool {
        self.containers
            .get(container)
            .is_some_and(|mask| mask & key_system_codecs != 0)
    }

    /// Every codec must be a registered token allowed by both the container
    /// and the key system. Tokens are matched exactly, so extended strings
    /// such as `avc1.4D400C` are unrecognized.
    pub fn is_supported_container_and_codecs<S: AsRef<str>>(
        &self,
        container: &str,
        codecs: &[S],
        key_system_codecs: u32,
    ) -> bool {
        if !self.is_supported_container(container, key_system_codecs) {
            return false;
        }

        let container_mask = self.containers[container];

        codecs.iter().all(|codec| match self.codec_mask(codec.as_ref()) {
            Some(bit) => bit & key_system_codecs != 0 && bit & container_mask != 0,
            None => false,
        })
    }
}
