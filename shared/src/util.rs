/**
 * file: util.rs
 * desc: Misc. utility functions.
 */
use num_traits::Float;

/**
 * Scale used for transcripts-per-million values.
 */
pub const TPM_SCALE: f64 = 1_000_000.0;

/**
 * Convert a byte array into a string.
 *
 * args
 *  bs: byte array
 *
 * returns
 *  a string representation of the given bytes or an empty string if the conversion failed
 */
pub fn bytes_to_string(bs: &[u8]) -> String {
    std::str::from_utf8(bs).unwrap_or("").to_string()
}

/**
 * maths
 */

pub fn mean<T>(vs: &[T]) -> T
where
    T: Float,
{
    if vs.is_empty() {
        return T::zero();
    }

    vs.iter().fold(T::zero(), |ac: T, v| ac + *v) / T::from(vs.len()).unwrap_or_else(T::one)
}

/**
 * Round the given value to a fixed number of decimal places.
 */
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);

    (value * factor).round() / factor
}

/**
 * Convert a read count into TPM given the total number of reads, rounded to two decimals.
 * A zero total yields zero instead of NaN.
 */
pub fn count_to_tpm(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    round_to(TPM_SCALE * count as f64 / total as f64, 2)
}
