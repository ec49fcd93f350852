use rand::Rng;

/// In-place Fisher–Yates: walk from the last index down to 1 and swap each
/// slot with a uniformly chosen slot at or below it.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
