//! Short, shareable game codes.

use rand::Rng;

/// Characters a generated code is drawn from.
pub const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Length of a generated code.
pub const GAME_CODE_LENGTH: usize = 4;

/// Draw a fresh code from the thread-local generator.
///
/// Not suitable for secrets; collisions are caught by the store.
pub fn generate() -> String {
    generate_with(&mut rand::rng())
}

pub fn generate_with<R: Rng>(rng: &mut R) -> String {
    (0..GAME_CODE_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn codes_have_fixed_length_and_alphabet() {
        for _ in 0..500 {
            let code = generate();
            assert_eq!(code.len(), GAME_CODE_LENGTH);
            assert!(
                code.bytes().all(|c| ALPHABET.contains(&c)),
                "unexpected character in {code}"
            );
            assert_eq!(code, code.to_uppercase());
        }
    }

    #[test]
    fn every_symbol_is_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 36];
        for _ in 0..2_000 {
            for c in generate_with(&mut rng).bytes() {
                let index = ALPHABET.iter().position(|&a| a == c).unwrap();
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&hit| hit));
    }
}
