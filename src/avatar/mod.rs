//! Round-robin avatar assignment for new members.
//!
//! The avatar is a colored mascot with one of ten face expressions; the
//! frontend renders it from the color hex and face index stored here. New
//! members get the lowest-index unused color/face combination (color varies
//! first), so small teams end up with distinct colors before faces repeat.

use rand::Rng;

use crate::models::TeamMember;

/// Fixed color palette, crimson first.
pub const PALETTE: [&str; 10] = [
    "#C41E3A", // Crimson
    "#E85D75", // Light crimson
    "#4ECDC4", // Teal
    "#FFE66D", // Yellow
    "#8B1538", // Dark crimson
    "#FF6B6B", // Coral
    "#5C7AEA", // Periwinkle
    "#3DDC84", // Mint
    "#F49D37", // Amber
    "#9B5DE5", // Violet
];

/// Number of face expression variants the frontend can render.
pub const FACE_VARIANT_COUNT: u32 = 10;

/// Pick a color and face index for a newly registered member.
///
/// Deterministic while unused combinations remain: combination `k` maps to
/// color `k % 10` and face `k / 10`. Once all 100 are taken, the color wraps
/// by member count and the face is drawn at random.
pub fn assign(existing: &[TeamMember]) -> (String, u32) {
    let palette_len = PALETTE.len() as u32;
    let total = palette_len * FACE_VARIANT_COUNT;

    for k in 0..total {
        let color = PALETTE[(k % palette_len) as usize];
        let face = k / palette_len;
        let taken = existing
            .iter()
            .any(|m| m.color.as_deref() == Some(color) && m.face == Some(face));
        if !taken {
            return (color.to_string(), face);
        }
    }

    // Grid exhausted: wrap the color by count, roll the face
    let color = PALETTE[existing.len() % PALETTE.len()];
    let face = rand::thread_rng().gen_range(0..FACE_VARIANT_COUNT);
    (color.to_string(), face)
}
