use super::availability::{available, Candidate};
use super::breaks::plan_breaks;
use super::selection::{select, select_shuffled};
use super::SchedError;
use crate::model::{
    EmployeeId, HoursUsage, Roster, Schedule, ScheduleEntry, ShiftWindow, UnfilledSlot,
};
use crate::params::{BreakPolicy, ScheduleParams, TradingDay};
use chrono::{Datelike, Local};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Boucle jours × créneaux × rôles sur une copie privée du roster.
pub(super) fn generate<R: Rng + ?Sized>(
    roster: &Roster,
    params: &ScheduleParams,
    rng: &mut R,
) -> Result<Schedule, SchedError> {
    params.validate_for(roster)?;

    let start = params
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());
    let days = params.trading_days(start)?;
    let windows = params.shift_windows();
    let budget = params.weekly_minutes();
    let run_id = Uuid::new_v4();

    info!(
        %run_id,
        employees = roster.employees.len(),
        days = days.len(),
        %start,
        "starting schedule generation"
    );

    let mut pool: Vec<Candidate> = roster
        .employees
        .iter()
        .cloned()
        .map(|e| Candidate::new(e, budget))
        .collect();
    let mut entries = Vec::new();
    let mut unfilled = Vec::new();
    let mut current_week = None;

    for day in &days {
        // nouvelle période : budgets remis à plein
        if current_week != Some(day.week) {
            pool.iter_mut().for_each(|c| c.remaining_minutes = budget);
            current_week = Some(day.week);
        }
        for window in &windows {
            fill_shift(
                roster,
                params,
                day,
                window,
                &mut pool,
                &mut entries,
                &mut unfilled,
                rng,
            )?;
        }
    }

    let mut schedule = Schedule {
        run_id,
        entries,
        unfilled,
        hours: Vec::new(),
    };
    schedule.hours = summarize(roster, &schedule);
    info!(
        %run_id,
        entries = schedule.entries.len(),
        unfilled = schedule.unfilled.len(),
        "schedule generation complete"
    );

    Ok(schedule)
}

#[allow(clippy::too_many_arguments)]
fn fill_shift<R: Rng + ?Sized>(
    roster: &Roster,
    params: &ScheduleParams,
    day: &TradingDay,
    window: &ShiftWindow,
    pool: &mut [Candidate],
    entries: &mut Vec<ScheduleEntry>,
    unfilled: &mut Vec<UnfilledSlot>,
    rng: &mut R,
) -> Result<(), SchedError> {
    let weekday = day.date.weekday();
    let shift_minutes = window.duration_minutes();
    // un employé ne tient qu'un rôle par créneau
    let mut booked: HashSet<EmployeeId> = HashSet::new();

    for role in &roster.roles {
        let requested = params.headcount_for(role);
        if requested == 0 {
            continue;
        }

        let eligible: Vec<&Candidate> = available(pool, weekday, role, shift_minutes)
            .into_iter()
            .filter(|c| !booked.contains(&c.id()))
            .collect();
        let chosen = if params.shuffle_selection {
            select_shuffled(&eligible, requested, role, rng)
        } else {
            select(&eligible, requested, role)
        };
        let chosen: Vec<EmployeeId> = chosen.into_iter().map(Candidate::id).collect();

        debug!(
            date = %day.date,
            shift = %window.kind,
            %role,
            eligible = eligible.len(),
            chosen = chosen.len(),
            "slot evaluated"
        );

        let mut filled = 0u32;
        let mut skipped_for_breaks = 0u32;
        for id in chosen {
            let Some(candidate) = pool.iter_mut().find(|c| c.id() == id) else {
                continue;
            };
            let breaks = match plan_breaks(
                candidate.employee.break_type,
                window.start,
                window.end,
                params,
                rng,
            ) {
                Ok(breaks) => breaks,
                Err(err) if params.break_policy == BreakPolicy::Skip => {
                    warn!(
                        date = %day.date,
                        shift = %window.kind,
                        %role,
                        employee = %id,
                        %err,
                        "assignment skipped"
                    );
                    skipped_for_breaks += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            entries.push(ScheduleEntry {
                date: day.date,
                weekday,
                week: day.week,
                shift: window.kind,
                employee_id: id,
                employee_name: candidate.employee.name.clone(),
                role: role.clone(),
                start: window.start,
                end: window.end,
                breaks,
            });
            candidate.remaining_minutes -= shift_minutes;
            booked.insert(id);
            filled += 1;
        }

        if filled < requested {
            warn!(
                date = %day.date,
                shift = %window.kind,
                %role,
                requested,
                filled,
                "slot left under-filled"
            );
            unfilled.push(UnfilledSlot {
                date: day.date,
                shift: window.kind,
                role: role.clone(),
                requested,
                filled,
                skipped_for_breaks,
            });
        }
    }

    Ok(())
}

fn summarize(roster: &Roster, schedule: &Schedule) -> Vec<HoursUsage> {
    roster
        .employees
        .iter()
        .map(|employee| {
            let (assigned_minutes, shifts) = schedule
                .entries_for(employee.id)
                .fold((0, 0), |(minutes, count), e| {
                    (minutes + e.duration_minutes(), count + 1)
                });
            HoursUsage {
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                assigned_minutes,
                shifts,
            }
        })
        .collect()
}
