//! Shuffled play order for playlists

use melo_core::Song;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Shuffled copy of `songs` (Fisher-Yates); the input keeps its order
pub fn shuffled(songs: &[Song]) -> Vec<Song> {
    shuffled_with(songs, &mut thread_rng())
}

/// Shuffled copy of `songs` drawn from `rng`
pub fn shuffled_with<R: Rng + ?Sized>(songs: &[Song], rng: &mut R) -> Vec<Song> {
    let mut out = songs.to_vec();
    out.shuffle(rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn songs(n: usize) -> Vec<Song> {
        (0..n)
            .map(|i| Song::new(i.to_string(), format!("Song {i}"), "Artist"))
            .collect()
    }

    fn ids(songs: &[Song]) -> Vec<String> {
        songs.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let input = songs(20);
        let mut out = ids(&shuffled(&input));
        out.sort_by_key(|id| id.parse::<usize>().unwrap());

        assert_eq!(out, ids(&input));
    }

    #[test]
    fn input_order_is_untouched() {
        let input = songs(5);
        let before = ids(&input);
        let _ = shuffled(&input);
        assert_eq!(ids(&input), before);
    }

    #[test]
    fn same_seed_same_order() {
        let input = songs(12);
        let a = shuffled_with(&input, &mut StdRng::seed_from_u64(7));
        let b = shuffled_with(&input, &mut StdRng::seed_from_u64(7));
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn empty_and_single() {
        assert!(shuffled(&[]).is_empty());
        assert_eq!(ids(&shuffled(&songs(1))), vec!["0"]);
    }
}
