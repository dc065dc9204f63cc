//! The sequence demo: every utility applied to one list of numbers.

use super::Seq;
use crate::error::SeqError;
use crate::models::SeqReport;

/// Squares (map), odds (filter), sum (reduce from 0), first even (find)
/// and an `index: value` line per element (for_each).
pub fn summarize(values: &[i64]) -> Result<SeqReport, SeqError> {
    let seq = Seq::from(values.to_vec());

    let squares = seq.map(|x, _, _| x.saturating_mul(*x)).into_dense()?;
    let odds = seq.filter(|x, _, _| x % 2 != 0).into_dense()?;
    let sum = seq.reduce(|acc, x, _, _| acc.saturating_add(*x), Some(0))?;
    let first_even = seq.find(|x, _, _| x % 2 == 0).copied();

    let mut visited = Vec::with_capacity(seq.len());
    seq.for_each(|x, i, _| visited.push(format!("{}: {}", i, x)));

    Ok(SeqReport {
        original: values.to_vec(),
        squares,
        odds,
        sum,
        first_even,
        visited,
    })
}
