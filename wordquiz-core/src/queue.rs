use crate::{
    is_stale, sort_by_priority, ProgressStore, Word, STALE_AFTER_DAYS, STALE_SLOT_MAX,
    STALE_SLOT_SHARE,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Assembles one session's quiz queue from the full word list.
///
/// Reviewed words (those with a progress entry) are ranked by priority; a
/// slice of the review quota is reserved for stale words so long-unseen
/// material resurfaces even when its priority has decayed. A review
/// shortfall is backfilled with extra fresh words. Quotas larger than the
/// available supply under-fill, never fail, and no word appears twice in
/// the built queue.
pub fn build_queue<R: Rng + ?Sized>(
    all_words: &[Word],
    store: &ProgressStore,
    new_quota: usize,
    review_quota: usize,
    now_ms: i64,
    rng: &mut R,
) -> Vec<Word> {
    let (reviewed, fresh): (Vec<Word>, Vec<Word>) = all_words
        .iter()
        .cloned()
        .partition(|w| store.contains(&w.question));

    let sorted_reviewed = sort_by_priority(&reviewed, store);

    // One tenth of the review quota, capped at 10, goes to stale words.
    // Chosen in priority order so the most urgent stale words win the slots.
    let stale_slot = ((review_quota as f64 * STALE_SLOT_SHARE).floor() as usize).min(STALE_SLOT_MAX);
    let stale_selected: Vec<Word> = sorted_reviewed
        .iter()
        .filter(|w| {
            store
                .get(&w.question)
                .map(|p| is_stale(p, now_ms, STALE_AFTER_DAYS))
                .unwrap_or(false)
        })
        .take(stale_slot)
        .cloned()
        .collect();

    let selected_review: Vec<Word> = sorted_reviewed
        .into_iter()
        .filter(|w| !stale_selected.iter().any(|s| s.question == w.question))
        .take(review_quota.saturating_sub(stale_selected.len()))
        .collect();

    let review_shortfall =
        review_quota.saturating_sub(selected_review.len() + stale_selected.len());

    let mut shuffled_fresh = fresh;
    shuffled_fresh.shuffle(rng);

    let (selected_new, shortfall_filler) = if review_shortfall > 0 {
        let total_new_needed = new_quota + review_shortfall;
        if shuffled_fresh.len() < total_new_needed {
            tracing::warn!(
                available = shuffled_fresh.len(),
                needed = total_new_needed,
                "not enough fresh words to cover the review shortfall"
            );
        }
        let new_end = new_quota.min(shuffled_fresh.len());
        let filler_end = total_new_needed.min(shuffled_fresh.len());
        (
            shuffled_fresh[..new_end].to_vec(),
            shuffled_fresh[new_end..filler_end].to_vec(),
        )
    } else {
        if shuffled_fresh.len() < new_quota {
            tracing::warn!(
                available = shuffled_fresh.len(),
                wanted = new_quota,
                "not enough fresh words to fill the new-word quota"
            );
        }
        (
            shuffled_fresh[..new_quota.min(shuffled_fresh.len())].to_vec(),
            Vec::new(),
        )
    };

    tracing::debug!(
        new = selected_new.len(),
        review = selected_review.len(),
        stale = stale_selected.len(),
        filler = shortfall_filler.len(),
        "assembled quiz pools"
    );

    // Global shuffle so the user never sees the pools in blocks.
    let mut queue: Vec<Word> = selected_new
        .into_iter()
        .chain(selected_review)
        .chain(stale_selected)
        .chain(shortfall_filler)
        .collect();
    queue.shuffle(rng);
    queue
}
