//! Arg-max over classification scores.

/// Returns the index and value of the highest score.
///
/// Ties resolve to the lowest index. NaN scores never win against a number.
/// Returns `None` for an empty slice.
///
/// ```rust
/// use dogbreed::utils::argmax;
///
/// assert_eq!(argmax(&[0.1, 0.8, 0.1]), Some((1, 0.8)));
/// assert_eq!(argmax(&[]), None);
/// ```
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        match best {
            None => best = Some((idx, score)),
            Some((_, current)) if score > current || (current.is_nan() && !score.is_nan()) => {
                best = Some((idx, score))
            }
            _ => {}
        }
    }
    best
}
