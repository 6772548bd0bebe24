// Numeric helpers for sub-tile movement

/// Clamp a pixel offset to `[-limit, limit]`, truncating toward zero first
pub fn clamp_pixel_offset(value: f32, limit: i32) -> f32 {
    let truncated = value as i32;
    if truncated.abs() > limit {
        if truncated < 0 {
            -limit as f32
        } else {
            limit as f32
        }
    } else {
        value
    }
}
