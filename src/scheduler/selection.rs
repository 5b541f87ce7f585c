use super::availability::Candidate;
use crate::model::Role;
use rand::seq::SliceRandom;
use rand::Rng;

/// Choisit au plus `headcount` employés parmi `eligible`.
///
/// Ceux dont la tâche préférée est `role` passent d'abord, puis les autres ;
/// chaque groupe est trié par compétence décroissante (tri stable : à égalité,
/// l'ordre du roster est conservé).
pub fn select<'a>(eligible: &[&'a Candidate], headcount: u32, role: &Role) -> Vec<&'a Candidate> {
    if headcount == 0 || eligible.is_empty() {
        return Vec::new();
    }

    let (mut preferred, mut others): (Vec<&Candidate>, Vec<&Candidate>) = eligible
        .iter()
        .copied()
        .partition(|c| c.employee.prefers(role));
    by_skill_desc(&mut preferred);
    by_skill_desc(&mut others);

    preferred
        .into_iter()
        .chain(others)
        .take(headcount as usize)
        .collect()
}

/// Comme [`select`], puis mélange l'ordre de sortie. L'ensemble choisi est identique.
pub fn select_shuffled<'a, R: Rng + ?Sized>(
    eligible: &[&'a Candidate],
    headcount: u32,
    role: &Role,
    rng: &mut R,
) -> Vec<&'a Candidate> {
    let mut chosen = select(eligible, headcount, role);
    chosen.shuffle(rng);
    chosen
}

fn by_skill_desc(pool: &mut [&Candidate]) {
    pool.sort_by(|a, b| b.employee.skill_rating.total_cmp(&a.employee.skill_rating));
}
