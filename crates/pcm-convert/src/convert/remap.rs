//! Sample value remapping between numeric ranges

use crate::buffer::SampleView;
use crate::format::FormatDescriptor;

/// Linearly map `value` from `[from_min, from_max]` onto `[to_min, to_max]`,
/// clamped to the target bounds
#[inline]
pub fn remap_sample(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    let (from_min, from_max) = from;
    let (to_min, to_max) = to;

    let normalized = (value - from_min) / (from_max - from_min);
    let mapped = normalized * (to_max - to_min) + to_min;
    mapped.clamp(to_min, to_max)
}

/// Produce the target-typed buffer from the adapted source.
///
/// When the two ranges differ every sample is rescaled and clamped before
/// `store` narrows it to the target element type. When they are exactly
/// equal the samples are cast directly with no rescaling. The element count
/// is unchanged either way.
pub(crate) fn remap<T, F>(
    view: &SampleView<'_>,
    from: &FormatDescriptor,
    to: &FormatDescriptor,
    store: F,
) -> Vec<T>
where
    F: Fn(f64) -> T,
{
    if from.same_range(to) {
        tracing::trace!(
            "ranges match ({}..={}), casting {} samples {} -> {}",
            from.min(),
            from.max(),
            view.len(),
            view.dtype(),
            to.dtype()
        );
        return view.map_into(store);
    }

    tracing::trace!(
        "remapping {} samples from {}..={} to {}..={}",
        view.len(),
        from.min(),
        from.max(),
        to.min(),
        to.max()
    );
    let from_range = (from.min(), from.max());
    let to_range = (to.min(), to.max());
    view.map_into(|value| store(remap_sample(value, from_range, to_range)))
}
