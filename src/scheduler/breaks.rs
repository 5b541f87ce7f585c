use super::InsufficientBreakWindow;
use crate::model::{BreakType, BreakWindow};
use crate::params::ScheduleParams;
use chrono::{Duration, NaiveTime};
use rand::Rng;

/// Granularité des débuts de pause, en minutes.
pub const SLOT_MINUTES: i64 = 15;

/// Pose les pauses d'un employé dans le créneau `[shift_start, shift_end]`.
///
/// La fenêtre utilisable commence `break_start_offset_minutes` après le début et
/// finit `break_end_offset_minutes` avant la fin. Le début de la première pause
/// est tiré au hasard parmi les multiples de 15 min (depuis le début de fenêtre)
/// qui laissent la place à tout le motif du type de pause.
///
/// Un décalage nul compte pour une minute : aucune pause ne touche les bornes du créneau.
pub fn plan_breaks<R: Rng + ?Sized>(
    break_type: BreakType,
    shift_start: NaiveTime,
    shift_end: NaiveTime,
    params: &ScheduleParams,
    rng: &mut R,
) -> Result<Vec<BreakWindow>, InsufficientBreakWindow> {
    let lead = i64::from(params.break_start_offset_minutes.max(1));
    let tail = i64::from(params.break_end_offset_minutes.max(1));
    let available = (shift_end - shift_start).num_minutes() - lead - tail;
    let required = break_type.span_minutes();

    if available < required {
        return Err(InsufficientBreakWindow {
            break_type,
            available_minutes: available.max(0),
            required_minutes: required,
        });
    }

    let slots = (available - required) / SLOT_MINUTES;
    let first = lead + SLOT_MINUTES * rng.random_range(0..=slots);

    Ok(break_type
        .pattern()
        .iter()
        .map(|&(offset, len)| {
            let start = shift_start + Duration::minutes(first + offset);
            BreakWindow {
                start,
                end: start + Duration::minutes(len),
            }
        })
        .collect())
}
