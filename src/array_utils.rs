/// Returns the number of elements a buffer needs to hold `len` elements spaced `stride` apart, IE `(len - 1) * stride + 1`.
/// Returns None if that computation overflows. A `len` of zero needs no elements.
pub fn strided_span(len: usize, stride: usize) -> Option<usize> {
    match len {
        0 => Some(0),
        _ => (len - 1).checked_mul(stride)?.checked_add(1),
    }
}

// Copies src[i * stride] into dst[i], for every element of dst
pub fn gather_strided<T: Copy>(src: &[T], stride: usize, dst: &mut [T]) {
    for (element, source) in dst.iter_mut().zip(src.iter().step_by(stride)) {
        *element = *source;
    }
}

// Copies src[i] into dst[i * stride], for every element of src. Elements of dst between the strided positions are untouched.
pub fn scatter_strided<T: Copy>(src: &[T], dst: &mut [T], stride: usize) {
    for (element, source) in dst.iter_mut().step_by(stride).zip(src.iter()) {
        *element = *source;
    }
}
