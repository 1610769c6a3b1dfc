/// Added to the norm so an all-zero vector stays zero instead of turning into NaNs.
pub const NORM_EPSILON: f32 = 1e-12;

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` in place to unit length: `v / (‖v‖ + ε)`.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v) + NORM_EPSILON;
    for x in v.iter_mut() { *x /= norm; }
}
