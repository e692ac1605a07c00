/// Each total minus the midpoint of the two best totals.
///
/// With fewer than two players every margin is zero.
///
/// ```
/// use el_grande::scoring::margins;
///
/// assert_eq!(margins(&[10, 6, 2]), vec![2.0, -2.0, -6.0]);
/// assert_eq!(margins(&[7, 7]), vec![0.0, 0.0]);
/// ```
#[must_use]
pub fn margins(scores: &[i32]) -> Vec<f64> {
    let mut sorted: Vec<i32> = scores.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let midpoint = match sorted.as_slice() {
        [first, second, ..] => (f64::from(*first) + f64::from(*second)) / 2.0,
        _ => return vec![0.0; scores.len()],
    };
    scores.iter().map(|&s| f64::from(s) - midpoint).collect()
}

/// Zero-sum payoff: margins shifted to mean zero and divided by the spread
/// between the best and worst totals.
///
/// When every total is equal the spread is zero and every payoff is zero.
///
/// ```
/// use el_grande::scoring::returns;
///
/// assert_eq!(returns(&[12, 8]), vec![0.5, -0.5]);
/// assert_eq!(returns(&[5, 5, 5]), vec![0.0, 0.0, 0.0]);
/// ```
#[must_use]
pub fn returns(scores: &[i32]) -> Vec<f64> {
    let (Some(&max), Some(&min)) = (scores.iter().max(), scores.iter().min()) else {
        return Vec::new();
    };
    let spread = f64::from(max - min);
    if spread == 0.0 {
        return vec![0.0; scores.len()];
    }

    let margins = margins(scores);
    let mean = margins.iter().sum::<f64>() / margins.len() as f64;
    margins.iter().map(|m| (m - mean) / spread).collect()
}
