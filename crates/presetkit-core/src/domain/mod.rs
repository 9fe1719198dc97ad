//! Domain model (ids, tags, presets, export envelope, errors).

pub mod envelope;
pub mod errors;
pub mod ids;
pub mod preset;
pub mod tag;

pub use envelope::{EXPORT_VERSION, ExportEnvelope};
pub use errors::PresetError;
pub use ids::{Id, IdMarker, PresetId, TagId};
pub use preset::{Preset, PresetPatch};
pub use tag::{Tag, TagType, UnknownTagType, normalize_tags};
