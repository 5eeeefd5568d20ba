// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


/// The median of some values. An even number of values gives the mean of the
/// two middle values. Values are ordered with [`f64::total_cmp`], so the result
/// doesn't depend on the order of the input. `None` is returned if there are
/// no values.
pub(crate) fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// The (minimum, maximum) of some values, or `None` if there are no values.
pub(crate) fn min_max<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}
