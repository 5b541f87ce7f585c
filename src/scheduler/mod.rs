mod assignment;
mod availability;
mod breaks;
mod conflicts;
mod selection;
mod types;
mod validate;

pub use availability::{available, Candidate};
pub use breaks::{plan_breaks, SLOT_MINUTES};
pub use conflicts::{detect_conflicts, Conflict, ConflictKind};
pub use selection::{select, select_shuffled};
pub use types::{InsufficientBreakWindow, ParamError, RosterError, RunState, SchedError};
pub use validate::{columns, validate, validate_roster, EmployeeRecord, RosterSheet};

use crate::model::{Roster, Schedule};
use crate::params::ScheduleParams;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Scheduler : détient le roster validé et l'état du cycle
/// `Idle → DataLoaded → Generating → Complete | Failed`.
///
/// Chaque génération travaille sur une copie du roster ; les budgets d'heures
/// décrémentés ne survivent pas au run.
#[derive(Debug, Default)]
pub struct Scheduler {
    roster: Option<Roster>,
    state: RunState,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    /// Valide un roster brut puis le charge. En cas d'erreur, rien n'est chargé.
    pub fn load(&mut self, sheet: &RosterSheet) -> Result<&Roster, SchedError> {
        match validate(sheet) {
            Ok(roster) => Ok(self.accept(roster)),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Charge un roster typé, après contrôle.
    pub fn load_roster(&mut self, roster: Roster) -> Result<&Roster, SchedError> {
        match validate_roster(&roster) {
            Ok(()) => Ok(self.accept(roster)),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Génère un planning complet, ou échoue sans rien produire.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        params: &ScheduleParams,
        rng: &mut R,
    ) -> Result<Schedule, SchedError> {
        let Some(roster) = self.roster.as_ref() else {
            self.state = RunState::Failed;
            return Err(SchedError::NotLoaded);
        };
        self.state = RunState::Generating;
        let result = assignment::generate(roster, params, rng);
        self.state = if result.is_ok() {
            RunState::Complete
        } else {
            RunState::Failed
        };
        result
    }

    /// Comme [`Scheduler::generate`], avec le générateur décrit par `params.seed`.
    pub fn generate_seeded(&mut self, params: &ScheduleParams) -> Result<Schedule, SchedError> {
        let mut rng = rng_for(params.seed);
        self.generate(params, &mut rng)
    }

    fn accept(&mut self, roster: Roster) -> &Roster {
        info!(
            employees = roster.employees.len(),
            roles = roster.roles.len(),
            "roster loaded"
        );
        self.state = RunState::DataLoaded;
        self.roster.insert(roster)
    }

    fn reject(&mut self, err: RosterError) -> SchedError {
        self.roster = None;
        self.state = RunState::Idle;
        err.into()
    }
}

/// Générateur déterministe si `seed` est fourni, sinon initialisé par l'OS.
pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
