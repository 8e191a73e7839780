//! Channel layout and byte order rewriting
//!
//! Interleaved data stores one frame after another (`L R L R ...`); planar
//! data stores one channel after another (`L L ... R R ...`). Both
//! permutations work on whole frames only: with `C` channels and `n` input
//! samples, `floor(n / C) * C` samples come out and any incomplete trailing
//! frame is dropped.

use crate::dtype::Sample;

/// Interleaved to planar.
///
/// Output index `idx` takes input sample `(idx % len) * channels + idx / len`,
/// where `len` is the number of whole frames. A channel count of zero yields
/// an empty buffer.
pub fn deinterleave<T: Copy>(samples: &[T], channels: usize) -> Vec<T> {
    if channels == 0 {
        return Vec::new();
    }
    let len = samples.len() / channels;

    (0..len * channels)
        .map(|idx| {
            let offset = idx % len;
            let channel = idx / len;
            samples[offset * channels + channel]
        })
        .collect()
}

/// Planar to interleaved.
///
/// Output index `idx` takes input sample `(idx % channels) * len + idx / channels`,
/// the inverse of [`deinterleave`]. A channel count of zero yields an empty
/// buffer.
pub fn interleave<T: Copy>(samples: &[T], channels: usize) -> Vec<T> {
    if channels == 0 {
        return Vec::new();
    }
    let len = samples.len() / channels;

    (0..len * channels)
        .map(|idx| {
            let offset = idx / channels;
            let channel = idx % channels;
            samples[channel * len + offset]
        })
        .collect()
}

/// Reverse the byte order of every `width`-byte element in place.
///
/// Widths below 2 are a no-op, and trailing bytes that do not fill a whole
/// element are left untouched.
pub fn swap_bytes(bytes: &mut [u8], width: usize) {
    if width < 2 {
        return;
    }
    for element in bytes.chunks_exact_mut(width) {
        element.reverse();
    }
}

/// Reverse the byte order of every sample in place
pub fn swap_elements<T: Sample>(samples: &mut [T]) {
    swap_bytes(bytemuck::cast_slice_mut(samples), std::mem::size_of::<T>());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave_planar_stereo() {
        let planar = [0u8, 0, 0, 0, 1, 1, 1, 1];
        assert_eq!(interleave(&planar, 2), vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_deinterleave_interleaved_stereo() {
        let interleaved = [0u8, 1, 0, 1, 0, 1, 0, 1];
        assert_eq!(deinterleave(&interleaved, 2), vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_three_channels() {
        let interleaved = [1, 2, 3, 11, 12, 13];
        let planar = deinterleave(&interleaved, 3);
        assert_eq!(planar, vec![1, 11, 2, 12, 3, 13]);
        assert_eq!(interleave(&planar, 3), interleaved.to_vec());
    }

    #[test]
    fn test_incomplete_frame_dropped() {
        let interleaved = [1, 2, 1, 2, 1];
        assert_eq!(deinterleave(&interleaved, 2), vec![1, 1, 2, 2]);
        assert_eq!(interleave(&[1, 1, 2, 2, 9], 2), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_fewer_samples_than_channels() {
        assert!(deinterleave(&[1, 2], 4).is_empty());
        assert!(interleave(&[1, 2], 4).is_empty());
        assert!(interleave::<u8>(&[], 0).is_empty());
    }

    #[test]
    fn test_swap_bytes_by_width() {
        let mut bytes = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
        swap_bytes(&mut bytes, 4);
        assert_eq!(bytes, [4, 3, 2, 1, 8, 7, 6, 5, 9]);

        let mut single = [1u8, 2];
        swap_bytes(&mut single, 1);
        assert_eq!(single, [1, 2]);
    }

    #[test]
    fn test_swap_elements_twice_is_identity() {
        let original = vec![1.0f32, -0.5, 0.25];
        let mut samples = original.clone();
        swap_elements(&mut samples);
        assert_eq!(samples[0].to_bits(), 1.0f32.to_bits().swap_bytes());
        swap_elements(&mut samples);
        assert_eq!(samples, original);
    }
}
