use ark_ff::PrimeField;
use ark_std::{vec, vec::Vec};

/// Return `[1, elem, elem^2, ..., elem^{num-1}]`
pub fn powers<F: PrimeField>(elem: &F, num: usize) -> Vec<F> {
    if num == 0 {
        return vec![];
    }
    let mut powers = Vec::with_capacity(num);
    powers.push(F::one());
    for i in 1..num {
        powers.push(powers[i - 1] * elem);
    }
    powers
}
