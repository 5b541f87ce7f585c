#![forbid(unsafe_code)]
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use planning::{
    detect_conflicts, BreakPolicy, BreakType, Employee, EmployeeId, Horizon, ParamError, Role,
    Roster, RosterError, RunState, SchedError, ScheduleParams, Scheduler,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
}

fn two_cashiers() -> Roster {
    Roster::new(["Cashier"])
        .with_employee(
            Employee::new(1, "A", BreakType::TypeA)
                .with_role("Cashier")
                .with_skill(8.0)
                .preferring("Cashier"),
        )
        .with_employee(
            Employee::new(2, "B", BreakType::TypeB)
                .with_role("Cashier")
                .with_skill(5.0)
                .preferring("Manager"),
        )
}

fn params(horizon: Horizon) -> ScheduleParams {
    ScheduleParams::new(40, 5, horizon, t(9, 0), t(17, 0))
        .starting(monday())
        .with_headcount("Cashier", 1)
}

fn loaded(roster: Roster) -> Scheduler {
    let mut scheduler = Scheduler::new();
    scheduler.load_roster(roster).unwrap();
    scheduler
}

fn ids_of(schedule: &planning::Schedule) -> Vec<u32> {
    schedule.entries.iter().map(|e| e.employee_id.get()).collect()
}

#[test]
fn best_cashier_works_until_budget_runs_out() {
    let mut scheduler = loaded(two_cashiers());
    let mut rng = StdRng::seed_from_u64(7);
    let schedule = scheduler.generate(&params(Horizon::Days(7)), &mut rng).unwrap();

    assert_eq!(scheduler.state(), RunState::Complete);
    assert!(schedule.is_complete());
    assert_eq!(schedule.entries.len(), 14);

    let ids = ids_of(&schedule);
    assert!(ids[..10].iter().all(|&id| id == 1), "{ids:?}");
    assert!(ids[10..].iter().all(|&id| id == 2), "{ids:?}");

    let first = &schedule.entries[0];
    assert_eq!(first.date, monday());
    assert_eq!(first.weekday, Weekday::Mon);
    assert_eq!((first.start, first.end), (t(9, 0), t(13, 0)));
    assert_eq!(schedule.entries[1].start, t(13, 0));
    assert_eq!(schedule.entries[1].end, t(17, 0));

    // 10 créneaux de 4h : budget de 40h consommé exactement
    assert_eq!(schedule.hours[0].assigned_minutes, 40 * 60);
    assert_eq!(schedule.hours[0].shifts, 10);
    assert_eq!(schedule.hours[1].shifts, 4);
    assert_eq!(schedule.entries_for(EmployeeId::new(2)).count(), 4);

    for entry in &schedule.entries {
        let expected = if entry.employee_id == EmployeeId::new(1) { 2 } else { 3 };
        assert_eq!(entry.breaks.len(), expected);
    }
}

#[test]
fn budgets_reset_every_week() {
    let mut scheduler = loaded(two_cashiers());
    let schedule = scheduler
        .generate(&params(Horizon::Days(14)), &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(schedule.entries.len(), 28);
    let ids = ids_of(&schedule);
    assert!(ids[14..24].iter().all(|&id| id == 1), "{ids:?}");
    assert!(ids[24..].iter().all(|&id| id == 2), "{ids:?}");
    assert!(schedule.entries[14..].iter().all(|e| e.week == 1));
    assert_eq!(schedule.hours[0].assigned_minutes, 2 * 40 * 60);
}

#[test]
fn weeks_horizon_only_schedules_working_days() {
    let mut scheduler = loaded(two_cashiers());
    let schedule = scheduler
        .generate(&params(Horizon::Weeks(2)), &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(schedule.entries.len(), 20);
    assert!(schedule
        .entries
        .iter()
        .all(|e| !matches!(e.date.weekday(), Weekday::Sat | Weekday::Sun)));
    assert_eq!(
        schedule.entries.last().map(|e| e.date),
        NaiveDate::from_ymd_opt(2025, 1, 17)
    );
}

#[test]
fn headcount_above_pool_leaves_slot_under_filled() {
    let mut scheduler = loaded(two_cashiers());
    let p = params(Horizon::Days(1)).with_headcount("Cashier", 5);
    let schedule = scheduler.generate(&p, &mut StdRng::seed_from_u64(3)).unwrap();

    assert_eq!(scheduler.state(), RunState::Complete);
    assert_eq!(schedule.entries.len(), 4);
    assert_eq!(schedule.unfilled.len(), 2);
    assert!(!schedule.is_complete());
    let slot = &schedule.unfilled[0];
    assert_eq!((slot.requested, slot.filled, slot.skipped_for_breaks), (5, 2, 0));
    assert_eq!(slot.role, Role::new("Cashier"));
}

#[test]
fn nobody_holds_two_roles_in_one_shift() {
    let roster = Roster::new(["Cashier", "Manager"])
        .with_employee(
            Employee::new(1, "A", BreakType::TypeA)
                .with_role("Cashier")
                .with_role("Manager")
                .with_skill(9.0),
        )
        .with_employee(
            Employee::new(2, "B", BreakType::TypeA)
                .with_role("Cashier")
                .with_role("Manager")
                .with_skill(1.0),
        );
    let mut scheduler = loaded(roster);
    let p = params(Horizon::Days(3)).with_headcount("Manager", 1);
    let schedule = scheduler.generate(&p, &mut StdRng::seed_from_u64(5)).unwrap();

    assert_eq!(schedule.entries.len(), 12);
    let mut seen = HashSet::new();
    for e in &schedule.entries {
        assert!(seen.insert((e.employee_id, e.date, e.shift)), "{e:?}");
    }
    // le premier rôle déclaré est servi en premier
    assert_eq!(schedule.entries[0].role, Role::new("Cashier"));
    assert_eq!(schedule.entries[0].employee_id, EmployeeId::new(1));
    assert_eq!(schedule.entries[1].employee_id, EmployeeId::new(2));
}

#[test]
fn day_off_is_respected() {
    let roster = Roster::new(["Cashier"])
        .with_employee(
            Employee::new(1, "A", BreakType::TypeA)
                .with_role("Cashier")
                .with_skill(9.0)
                .with_day_off(Weekday::Mon),
        )
        .with_employee(Employee::new(2, "B", BreakType::TypeA).with_role("Cashier"));
    let mut scheduler = loaded(roster);
    let schedule = scheduler
        .generate(&params(Horizon::Days(2)), &mut StdRng::seed_from_u64(0))
        .unwrap();

    assert_eq!(ids_of(&schedule), vec![2, 2, 1, 1]);
}

#[test]
fn skip_policy_drops_assignment_without_replacement() {
    let mut scheduler = loaded(two_cashiers());
    let p = params(Horizon::Days(1)).with_break_offsets(95, 95);
    let schedule = scheduler.generate(&p, &mut StdRng::seed_from_u64(0)).unwrap();

    assert_eq!(scheduler.state(), RunState::Complete);
    assert!(schedule.entries.is_empty());
    assert_eq!(schedule.unfilled.len(), 2);
    assert!(schedule
        .unfilled
        .iter()
        .all(|s| s.filled == 0 && s.skipped_for_breaks == 1));
    assert!(schedule.hours.iter().all(|h| h.shifts == 0));
}

#[test]
fn abort_policy_fails_the_run() {
    let mut scheduler = loaded(two_cashiers());
    let p = params(Horizon::Days(1))
        .with_break_offsets(95, 95)
        .with_break_policy(BreakPolicy::Abort);
    let err = scheduler.generate(&p, &mut StdRng::seed_from_u64(0)).unwrap_err();

    match err {
        SchedError::InsufficientBreakWindow(e) => {
            assert_eq!(e.break_type, BreakType::TypeA);
            assert_eq!((e.available_minutes, e.required_minutes), (50, 75));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(scheduler.state(), RunState::Failed);
}

#[test]
fn generating_without_roster_fails() {
    let mut scheduler = Scheduler::new();
    assert_eq!(scheduler.state(), RunState::Idle);
    let err = scheduler
        .generate(&params(Horizon::Days(1)), &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(matches!(err, SchedError::NotLoaded));
    assert_eq!(scheduler.state(), RunState::Failed);
}

#[test]
fn invalid_parameters_are_rejected_before_any_assignment() {
    let mut scheduler = loaded(two_cashiers());
    let mut rng = StdRng::seed_from_u64(0);

    let unknown = params(Horizon::Days(1)).with_headcount("Stock", 1);
    assert!(matches!(
        scheduler.generate(&unknown, &mut rng),
        Err(SchedError::InvalidParameters(ParamError::UnknownRole(ref r))) if r.as_str() == "Stock"
    ));
    assert_eq!(scheduler.state(), RunState::Failed);

    let mut reversed = params(Horizon::Days(1));
    reversed.opening_time = t(17, 0);
    reversed.closing_time = t(9, 0);
    assert!(matches!(
        scheduler.generate(&reversed, &mut rng),
        Err(SchedError::InvalidParameters(ParamError::BusinessHours { .. }))
    ));

    let mut short = params(Horizon::Days(1));
    short.closing_time = t(15, 0);
    assert!(matches!(
        scheduler.generate(&short, &mut rng),
        Err(SchedError::InvalidParameters(ParamError::ShiftLength { minutes: 180, .. }))
    ));

    let crowded = params(Horizon::Days(1)).with_headcount("Cashier", 11);
    assert!(matches!(
        scheduler.generate(&crowded, &mut rng),
        Err(SchedError::InvalidParameters(ParamError::TooManyEmployees { total: 11, max: 10 }))
    ));

    let no_days = params(Horizon::Days(0));
    assert!(matches!(
        scheduler.generate(&no_days, &mut rng),
        Err(SchedError::InvalidParameters(ParamError::OutOfRange { field: "horizon.days", .. }))
    ));

    // le roster reste chargé : une génération valide repasse à Complete
    assert!(scheduler.generate(&params(Horizon::Days(1)), &mut rng).is_ok());
    assert_eq!(scheduler.state(), RunState::Complete);
}

#[test]
fn rejected_roster_leaves_scheduler_idle() {
    let mut scheduler = loaded(two_cashiers());
    assert_eq!(scheduler.state(), RunState::DataLoaded);

    let dup = two_cashiers().with_employee(Employee::new(1, "A bis", BreakType::TypeB));
    let err = scheduler.load_roster(dup).unwrap_err();
    assert!(matches!(
        err,
        SchedError::InvalidRoster(RosterError::DuplicateId(_))
    ));
    assert_eq!(scheduler.state(), RunState::Idle);
    assert!(scheduler.roster().is_none());
}

#[test]
fn same_seed_same_schedule() {
    let p = params(Horizon::Days(7)).with_seed(11);
    let a = loaded(two_cashiers()).generate_seeded(&p).unwrap();
    let b = loaded(two_cashiers()).generate_seeded(&p).unwrap();

    assert_eq!(a.entries, b.entries);
    assert_ne!(a.run_id, b.run_id);
}

fn store_roster() -> Roster {
    let mut roster = Roster::new(["Cashier", "Manager", "Stock"]);
    let roles = ["Cashier", "Manager", "Stock"];
    let days = [Weekday::Mon, Weekday::Wed, Weekday::Sat, Weekday::Sun];
    for id in 1..=12u32 {
        let break_type = if id % 2 == 0 { BreakType::TypeA } else { BreakType::TypeB };
        let mut employee = Employee::new(id, format!("E{id}"), break_type)
            .with_role(roles[(id % 3) as usize])
            .with_role("Cashier")
            .with_skill(f64::from(id % 5))
            .preferring(roles[(id % 2) as usize]);
        if id % 4 == 0 {
            employee = employee.with_day_off(days[(id as usize / 4) % days.len()]);
        }
        roster = roster.with_employee(employee);
    }
    roster
}

#[test]
fn generated_schedules_are_conflict_free() {
    let p = ScheduleParams::new(40, 5, Horizon::Days(21), t(9, 0), t(22, 0))
        .starting(monday())
        .with_headcount("Cashier", 2)
        .with_headcount("Manager", 1)
        .with_headcount("Stock", 1);

    for seed in 0..25 {
        let mut scheduler = loaded(store_roster());
        let schedule = scheduler
            .generate(&p, &mut StdRng::seed_from_u64(seed))
            .unwrap();

        assert!(!schedule.entries.is_empty());
        let conflicts = detect_conflicts(&schedule, p.weekly_hours);
        assert!(conflicts.is_empty(), "seed {seed}: {conflicts:?}");
        for e in &schedule.entries {
            let employee = scheduler
                .roster()
                .and_then(|r| r.find_employee(e.employee_id))
                .unwrap();
            assert!(employee.can_fill(&e.role));
            assert!(!employee.is_off(e.weekday));
        }
    }
}

#[test]
fn preferred_task_beats_higher_skill() {
    let roster = Roster::new(["Cashier"])
        .with_employee(
            Employee::new(1, "A", BreakType::TypeA)
                .with_role("Cashier")
                .with_skill(3.0)
                .preferring("Cashier"),
        )
        .with_employee(
            Employee::new(2, "B", BreakType::TypeB)
                .with_role("Cashier")
                .with_skill(9.0)
                .preferring("Manager"),
        );
    let mut scheduler = loaded(roster);
    let schedule = scheduler
        .generate(&params(Horizon::Days(7)), &mut StdRng::seed_from_u64(2))
        .unwrap();

    let ids = ids_of(&schedule);
    assert!(ids[..10].iter().all(|&id| id == 1), "{ids:?}");
    assert!(ids[10..].iter().all(|&id| id == 2), "{ids:?}");
}

#[test]
fn days_horizon_ignores_work_days_per_week() {
    let mut scheduler = loaded(two_cashiers());
    let mut p = params(Horizon::Days(7));
    p.work_days_per_week = 1;
    let schedule = scheduler.generate(&p, &mut StdRng::seed_from_u64(0)).unwrap();

    assert_eq!(schedule.entries.len(), 14);
    assert!(schedule.entries.iter().any(|e| e.weekday == Weekday::Sun));
}
