use fastrand::Rng;

/// Picks `count` distinct items uniformly at random, or all of them when the
/// slice is shorter. Order follows the draw.
pub fn sample<'a, T>(items: &'a [T], count: usize, rng: &mut Rng) -> Vec<&'a T> {
    let count = count.min(items.len());
    let mut indices: Vec<usize> = (0..items.len()).collect();
    // partial Fisher-Yates
    for i in 0..count {
        let j = rng.usize(i..items.len());
        indices.swap(i, j);
    }
    indices[..count].iter().map(|&i| &items[i]).collect()
}
