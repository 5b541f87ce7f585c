use crate::model::{Employee, EmployeeId, Role};
use crate::params::MIN_SHIFT_MINUTES;
use chrono::Weekday;

/// Employé de la copie de travail d'un run, avec son budget restant.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub employee: Employee,
    pub remaining_minutes: i64,
}

impl Candidate {
    pub fn new(employee: Employee, budget_minutes: i64) -> Self {
        Self {
            employee,
            remaining_minutes: budget_minutes,
        }
    }

    pub fn id(&self) -> EmployeeId {
        self.employee.id
    }

    pub fn remaining_hours(&self) -> f64 {
        self.remaining_minutes as f64 / 60.0
    }
}

/// Employés éligibles pour `role` le jour `day`, dans l'ordre du roster.
///
/// Le budget restant doit couvrir `shift_minutes`, et jamais moins que la durée
/// minimale d'un créneau.
pub fn available<'a>(
    pool: &'a [Candidate],
    day: Weekday,
    role: &Role,
    shift_minutes: i64,
) -> Vec<&'a Candidate> {
    let needed = shift_minutes.max(MIN_SHIFT_MINUTES);
    pool.iter()
        .filter(|c| {
            c.employee.can_fill(role) && c.remaining_minutes >= needed && !c.employee.is_off(day)
        })
        .collect()
}
