//! Question-set sampling.

use anyhow::Result;
use rand::Rng;

use crate::bank::QuestionRepository;
use crate::model::{Question, QuestionSet, QuizSize};

/// Draw a uniform random sample of `requested` questions without replacement.
///
/// When the bank holds fewer questions than requested, every question is
/// used and [`QuestionSet::was_clamped`] reports it. The sampled order is
/// shuffled and stays fixed for the life of the set.
pub fn create_set<R: Rng + ?Sized>(
    questions: &[Question],
    requested: QuizSize,
    rng: &mut R,
) -> QuestionSet {
    let wanted = requested.count();
    let amount = wanted.min(questions.len());
    if amount < wanted {
        tracing::info!(
            "bank has {} questions, shortening {}-question quiz",
            questions.len(),
            wanted
        );
    }

    let picked = rand::seq::index::sample(rng, questions.len(), amount)
        .into_iter()
        .map(|i| questions[i].clone())
        .collect();

    QuestionSet::sampled(picked, wanted)
}

/// Load the repository's questions and sample a set from them.
pub fn create_set_from_repository<R: Rng + ?Sized>(
    repository: &dyn QuestionRepository,
    requested: QuizSize,
    rng: &mut R,
) -> Result<QuestionSet> {
    let questions = repository.load_questions()?;
    Ok(create_set(&questions, requested, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;
    use crate::model::fixtures::question;
    use crate::model::OptionLabel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn bank_of(n: u32) -> Vec<Question> {
        (1..=n).map(|id| question(id, OptionLabel::A)).collect()
    }

    #[test]
    fn samples_requested_size_without_duplicates() {
        let bank = bank_of(100);
        let mut rng = StdRng::seed_from_u64(1);

        for size in QuizSize::ALL {
            let set = create_set(&bank, size, &mut rng);
            assert_eq!(set.len(), size.count());
            assert!(!set.was_clamped());

            let ids: HashSet<u32> = set.iter().map(|q| q.id()).collect();
            assert_eq!(ids.len(), size.count());
            assert!(ids.iter().all(|id| (1..=100).contains(id)));
        }
    }

    #[test]
    fn clamps_to_bank_size() {
        let bank = bank_of(30);
        let mut rng = StdRng::seed_from_u64(2);
        let set = create_set(&bank, QuizSize::Fifty, &mut rng);

        assert_eq!(set.len(), 30);
        assert_eq!(set.requested(), 50);
        assert!(set.was_clamped());

        let mut ids: Vec<u32> = set.iter().map(|q| q.id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=30).collect::<Vec<_>>());
    }

    #[test]
    fn exact_bank_size_is_not_clamped() {
        let bank = bank_of(10);
        let set = create_set(&bank, QuizSize::Ten, &mut StdRng::seed_from_u64(3));
        assert_eq!(set.len(), 10);
        assert!(!set.was_clamped());
    }

    #[test]
    fn empty_bank_gives_empty_set() {
        let set = create_set(&[], QuizSize::Ten, &mut StdRng::seed_from_u64(4));
        assert!(set.is_empty());
        assert!(set.was_clamped());
    }

    #[test]
    fn same_seed_same_set() {
        let bank = bank_of(60);
        let a = create_set(&bank, QuizSize::Twenty, &mut StdRng::seed_from_u64(9));
        let b = create_set(&bank, QuizSize::Twenty, &mut StdRng::seed_from_u64(9));
        let ids = |s: &QuestionSet| s.iter().map(|q| q.id()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn samples_from_repository() {
        let bank = QuestionBank {
            name: "bank".into(),
            questions: bank_of(15),
        };
        let set =
            create_set_from_repository(&bank, QuizSize::Ten, &mut StdRng::seed_from_u64(5))
                .unwrap();
        assert_eq!(set.len(), 10);
    }
}
