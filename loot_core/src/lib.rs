//! loot_core - Equipment, stone and affix generation
//!
//! Content (base types, affix pools, stone types, name lists, rarity tables)
//! is data loaded into an immutable [`Config`]. A [`Generator`] borrows a
//! config and turns a level plus a random source into [`Equipment`] or a
//! [`Stone`].
//!
//! ```rust
//! use loot_core::Generator;
//!
//! let generator = Generator::builtin();
//! let sword = generator.generate_equipment_seeded(10, false, 42);
//! assert!(sword.value >= 1);
//! ```

pub mod affix;
pub mod config;
pub mod generator;
pub mod item;
pub mod legacy;
pub mod rng;
pub mod socket;
pub mod types;

pub use affix::roll_affixes;
pub use config::{builtin_config, Config};
pub use generator::{level_multiplier, Generator};
pub use item::{Affix, Equipment, Sockets, Stone, StoneId};
pub use legacy::{to_legacy, LegacyExtra, LegacyItem, LegacyKey};
pub use socket::{embed_stone, embed_stone_at, remove_stone};
pub use types::*;

use std::path::PathBuf;
use thiserror::Error;

/// Error loading content configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
}

/// Error embedding or removing a stone
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SocketError {
    #[error("Equipment '{0}' has no sockets")]
    NoSockets(String),
    #[error("Stone '{stone}' does not fit a {slot} slot")]
    IncompatibleSlot { stone: String, slot: EquipmentSlot },
    #[error("All sockets of '{0}' are occupied")]
    Full(String),
    #[error("Stone '{0}' is already embedded")]
    AlreadyEmbedded(String),
    #[error("Socket {index} out of range (capacity {capacity})")]
    OutOfRange { index: usize, capacity: usize },
    #[error("Socket {0} is already occupied")]
    Occupied(usize),
    #[error("Socket {0} is empty")]
    Empty(usize),
}
