use std::collections::BTreeMap;

/// Shannon entropy of the character distribution of `text`, in bits
///
/// Returns exactly 0.0 for empty input. Counts are summed in character order
/// so identical input always yields a bit-identical result.
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}
