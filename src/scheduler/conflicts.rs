use crate::model::{EmployeeId, Schedule, ShiftKind};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// pause hors du créneau ou de durée nulle
    BreakOutsideShift,
    BreakOverlap,
    /// même employé deux fois sur le même créneau
    DoubleBooking,
    /// heures de la semaine au-delà du budget hebdomadaire
    BudgetExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub shift: ShiftKind,
    pub kind: ConflictKind,
}

/// Détecte les incohérences d'un planning déjà produit (ou relu depuis un fichier).
pub fn detect_conflicts(schedule: &Schedule, weekly_hours: u32) -> Vec<Conflict> {
    let limit = i64::from(weekly_hours) * 60;
    let mut out = Vec::new();
    let mut booked: HashSet<(EmployeeId, NaiveDate, ShiftKind)> = HashSet::new();
    let mut used: HashMap<(EmployeeId, u32), i64> = HashMap::new();

    for entry in &schedule.entries {
        let conflict = |kind| Conflict {
            employee: entry.employee_id,
            date: entry.date,
            shift: entry.shift,
            kind,
        };

        let outside = entry
            .breaks
            .iter()
            .any(|b| b.start <= entry.start || b.end >= entry.end || b.end <= b.start);
        if outside {
            out.push(conflict(ConflictKind::BreakOutsideShift));
        }

        let overlapping = entry
            .breaks
            .iter()
            .enumerate()
            .any(|(idx, a)| entry.breaks.iter().skip(idx + 1).any(|b| a.overlaps(b)));
        if overlapping {
            out.push(conflict(ConflictKind::BreakOverlap));
        }

        if !booked.insert((entry.employee_id, entry.date, entry.shift)) {
            out.push(conflict(ConflictKind::DoubleBooking));
        }

        let total = used.entry((entry.employee_id, entry.week)).or_default();
        let before = *total;
        *total += entry.duration_minutes();
        if before <= limit && *total > limit {
            out.push(conflict(ConflictKind::BudgetExceeded));
        }
    }

    out
}
