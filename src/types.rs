//! Shared small types.

/// Index into the scene-owned material array. At most 256 entries,
/// checked at add time.
pub type MaterialId = u8;
