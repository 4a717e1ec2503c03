const MAX_DISTANCE: usize = 4;
const MAX_SUGGESTIONS: usize = 3;

// ── "Did you mean?" via Levenshtein distance ────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        current[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            current[j] = (previous[j] + 1).min(current[j - 1] + 1).min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Up to three candidates close to `unknown`, closest first.
///
/// Comparison ignores case; ties are broken alphabetically.
pub fn did_you_mean<'a, I>(unknown: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let unknown = unknown.to_lowercase();
    let mut ranked: Vec<(usize, &'a str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = levenshtein(&unknown, &candidate.to_lowercase());
            (distance <= MAX_DISTANCE).then_some((distance, candidate))
        })
        .collect();
    ranked.sort();
    ranked.dedup();
    ranked.into_iter().take(MAX_SUGGESTIONS).map(|(_, candidate)| candidate).collect()
}
