//! Passion-weighted speaker selection.

use crate::panel::respondent::Respondent;
use rand::seq::SliceRandom;
use rand::Rng;

/// Additive base weight: even a zero-intensity respondent keeps a non-zero
/// chance of being picked.
pub const BASE_WEIGHT: f32 = 0.1;

/// Choose the next speaker, weighted by intensity.
///
/// The previous speaker is excluded unless they are the only participant,
/// in which case repeats are unavoidable and allowed. Returns `None` only
/// for an empty participant slice.
pub fn pick_speaker<'a, R: Rng>(
    participants: &'a [Respondent],
    exclude: Option<u32>,
    rng: &mut R,
) -> Option<&'a Respondent> {
    let mut pool: Vec<&Respondent> = participants
        .iter()
        .filter(|r| Some(r.id) != exclude)
        .collect();

    if pool.is_empty() {
        if participants.len() == 1 {
            pool = participants.iter().collect();
        } else {
            return None;
        }
    }

    pool.choose_weighted(rng, |r| r.intensity + BASE_WEIGHT)
        .ok()
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn participant(id: u32, intensity: f32) -> Respondent {
        let mut r = Respondent::new(id);
        r.intensity = intensity;
        r
    }

    #[test]
    fn test_never_repeats_with_two_participants() {
        let participants = vec![participant(1, 0.9), participant(2, 0.1)];
        let mut rng = StdRng::seed_from_u64(17);

        let mut last = None;
        for _ in 0..50 {
            let speaker = pick_speaker(&participants, last, &mut rng).unwrap();
            assert_ne!(Some(speaker.id), last, "same speaker twice in a row");
            last = Some(speaker.id);
        }
    }

    #[test]
    fn test_lone_participant_keeps_the_floor() {
        let participants = vec![participant(7, 0.0)];
        let mut rng = StdRng::seed_from_u64(0);
        let speaker = pick_speaker(&participants, Some(7), &mut rng).unwrap();
        assert_eq!(speaker.id, 7);
    }

    #[test]
    fn test_empty_pool_yields_none() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(pick_speaker(&[], None, &mut rng).is_none());
    }

    #[test]
    fn test_zero_intensity_is_still_selectable() {
        let participants = vec![participant(1, 0.0), participant(2, 0.0)];
        let mut rng = StdRng::seed_from_u64(4);
        let speaker = pick_speaker(&participants, None, &mut rng);
        assert!(speaker.is_some());
    }

    #[test]
    fn test_high_intensity_speaks_more_often() {
        let participants = vec![participant(1, 1.0), participant(2, 0.0)];
        let mut rng = StdRng::seed_from_u64(99);

        let mut loud = 0;
        for _ in 0..200 {
            if pick_speaker(&participants, None, &mut rng).unwrap().id == 1 {
                loud += 1;
            }
        }
        // Weights are 1.1 vs 0.1; the loud one should dominate clearly.
        assert!(loud > 140, "expected dominance, got {loud}/200");
    }
}
