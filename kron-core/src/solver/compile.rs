#[cfg(test)]
#[path = "../../tests/unit/solver/compile_test.rs"]
mod compile_test;

use super::model::{Domain, Expr, SolveModel, VarId};
use crate::algebra::{Linear, PiecewiseLinear};
use crate::masks::trim_window_start;
use crate::models::*;
use crate::utils::{Float, GenericResult};
use rustc_hash::FxHashMap;

const DRAFT_BONUS: Float = 10.;

/// Decision variables of one meeting inside the compiled model.
#[derive(Clone, Debug)]
pub struct MeetingVars {
    pub id: MeetingId,
    /// Candidate start position on the slot grid.
    pub start: VarId,
    /// Whether the meeting gets scheduled at all.
    pub exist: VarId,
    /// One inclusion flag per optional attendee.
    pub includes: Vec<(UserId, VarId)>,
    pub len_slots: Slot,
    pub draft_slot: Option<Slot>,
}

/// A constraint model compiled from masks, plus the pass objectives evaluated over it.
pub struct CompiledModel {
    pub model: SolveModel,
    pub meetings: Vec<MeetingVars>,
    /// Lexicographic pass objectives: scheduling, cost, stability.
    pub objectives: [Expr; 3],
}

/// Builds a symbolic expression evaluating a piecewise linear function at the slot
/// variable, via the same balanced branching a concrete evaluation would take.
fn symbolic_cost(pw: &PiecewiseLinear, start: VarId, leaf: impl Fn(&Linear) -> Expr) -> Expr {
    pw.eval(
        &Expr::Var(start),
        &|x: &Expr, edge: Float| Expr::lt(x.clone(), Expr::Num(edge)),
        &|x: &Expr, edge: Float| Expr::lt(Expr::Num(edge), x.clone()),
        &|cond, then, otherwise| Expr::iff(cond, then, otherwise),
        &leaf,
    )
}

fn finite_line_expr(line: &Linear, start: VarId) -> Expr {
    if line.is_infinite() {
        Expr::Num(0.)
    } else {
        Expr::Add(vec![Expr::Mul(line.slope, Box::new(Expr::Var(start))), Expr::Num(line.intercept)])
    }
}

/// Enumerates feasible start slots of a meeting: slots within the (trimmed) window
/// where the quantized hard mask stays finite.
pub fn feasible_slots(
    meeting: &Meeting,
    mask: &Mask,
    now: Timestamp,
    basetime: Timestamp,
    grain: Float,
) -> Vec<Slot> {
    let start = trim_window_start(meeting, now);
    let latest = meeting.window.end - meeting.length;
    if latest < start {
        return Vec::default();
    }

    let lo = ((start - basetime) / grain).ceil() as Slot;
    let hi = ((latest - basetime) / grain).floor() as Slot;
    let hard = mask.hard.rebase(basetime, grain);

    (lo..=hi).filter(|&slot| hard.value_at(slot as Float).is_finite()).collect()
}

/// Compiles the free meetings into a finite-domain model. Every meeting passed in
/// must have at least one feasible slot; infeasible ones are filtered out earlier
/// and reported unscheduled.
pub fn compile_model(
    snapshot: &Snapshot,
    free: &[MeetingId],
    masks: &FxHashMap<MeetingId, EventMask>,
    slots: &FxHashMap<MeetingId, Vec<Slot>>,
    basetime: Timestamp,
    grain: Float,
) -> GenericResult<CompiledModel> {
    let mut model = SolveModel::default();
    let mut meetings = Vec::with_capacity(free.len());

    for &id in free {
        let meeting = snapshot
            .meeting(id)
            .ok_or_else(|| format!("unknown meeting in problem set: {id}"))?;
        let domain = slots
            .get(&id)
            .filter(|slots| !slots.is_empty())
            .ok_or_else(|| format!("meeting {id} has no feasible slots"))?;

        let exist = model.add_var(Domain::Bool);
        let start = model.add_var(Domain::Slots(domain.clone()));
        let first_slot = domain[0];

        // an unscheduled meeting's start carries no information: pin it so the
        // search does not branch over it
        model.add_constraint(Expr::implies(
            Expr::not(Expr::Var(exist)),
            Expr::eq(Expr::Var(start), Expr::Num(first_slot as Float)),
        ));

        let event_mask = masks
            .get(&id)
            .ok_or_else(|| format!("meeting {id} has no compiled mask"))?;

        let mut includes = Vec::with_capacity(meeting.optional_attendees.len());
        for oa in meeting.optional_attendees.iter() {
            let include = model.add_var(Domain::Bool);
            model.add_constraint(Expr::implies(Expr::Var(include), Expr::Var(exist)));

            // inclusion is only allowed where the attendee's own surface is finite
            if let Some(surface) = event_mask.optional.get(&oa.user) {
                let allowed = symbolic_cost(&surface.rebase(basetime, grain), start, |line| {
                    Expr::Bool(!line.is_infinite())
                });
                model.add_constraint(Expr::implies(Expr::Var(include), allowed));
            }

            includes.push((oa.user, include));
        }

        if meeting.attendees.is_empty() && !includes.is_empty() {
            let any = includes.iter().map(|&(_, var)| Expr::Var(var)).collect();
            model.add_constraint(Expr::implies(Expr::Var(exist), Expr::Or(any)));
        }

        let len_slots = ((meeting.length / grain).ceil() as Slot).max(1);
        let draft_slot = meeting.draft_start.map(|draft| ((draft - basetime) / grain).floor() as Slot);

        meetings.push(MeetingVars { id, start, exist, includes, len_slots, draft_slot });
    }

    add_overlap_constraints(snapshot, &meetings, &mut model)?;

    let objectives = build_objectives(snapshot, &meetings, masks, basetime, grain)?;

    Ok(CompiledModel { model, meetings, objectives })
}

/// Forbids two meetings that (may) share an attendee from occupying overlapping slot
/// ranges at the same time.
fn add_overlap_constraints(
    snapshot: &Snapshot,
    meetings: &[MeetingVars],
    model: &mut SolveModel,
) -> GenericResult<()> {
    for (idx, left) in meetings.iter().enumerate() {
        for right in meetings.iter().skip(idx + 1) {
            let shared = shared_presence(snapshot, left, right)?;
            let Some(shared) = shared else { continue };

            let left_end = Expr::Add(vec![Expr::Var(left.start), Expr::Num(left.len_slots as Float)]);
            let right_end = Expr::Add(vec![Expr::Var(right.start), Expr::Num(right.len_slots as Float)]);

            let disjoint = Expr::Or(vec![
                Expr::le(left_end, Expr::Var(right.start)),
                Expr::le(right_end, Expr::Var(left.start)),
            ]);
            let both = Expr::And(vec![Expr::Var(left.exist), Expr::Var(right.exist), shared]);

            model.add_constraint(Expr::implies(both, disjoint));
        }
    }

    Ok(())
}

/// Builds the condition under which two meetings actually share a participant:
/// always for a shared required attendee, conditional on inclusion flags otherwise.
/// `None` means the meetings cannot share anyone.
fn shared_presence(
    snapshot: &Snapshot,
    left: &MeetingVars,
    right: &MeetingVars,
) -> GenericResult<Option<Expr>> {
    let left_meeting = snapshot
        .meeting(left.id)
        .ok_or_else(|| format!("unknown meeting in problem set: {}", left.id))?;
    let right_meeting = snapshot
        .meeting(right.id)
        .ok_or_else(|| format!("unknown meeting in problem set: {}", right.id))?;

    let membership = |meeting: &Meeting, vars: &MeetingVars, user: UserId| -> Option<Expr> {
        if meeting.attendees.contains(&user) {
            Some(Expr::Bool(true))
        } else {
            vars.includes
                .iter()
                .find(|&&(include_user, _)| include_user == user)
                .map(|&(_, var)| Expr::Var(var))
        }
    };

    let mut users: Vec<UserId> = left_meeting
        .attendees
        .iter()
        .copied()
        .chain(left_meeting.optional_attendees.iter().map(|oa| oa.user))
        .collect();
    users.sort_unstable();
    users.dedup();

    let mut cases = Vec::new();
    for user in users {
        let (Some(lhs), Some(rhs)) = (
            membership(left_meeting, left, user),
            membership(right_meeting, right, user),
        ) else {
            continue;
        };

        match (&lhs, &rhs) {
            (Expr::Bool(true), Expr::Bool(true)) => return Ok(Some(Expr::Bool(true))),
            _ => cases.push(Expr::And(vec![lhs, rhs])),
        }
    }

    Ok(if cases.is_empty() { None } else { Some(Expr::Or(cases)) })
}

/// Builds the three lexicographic objectives.
fn build_objectives(
    snapshot: &Snapshot,
    meetings: &[MeetingVars],
    masks: &FxHashMap<MeetingId, EventMask>,
    basetime: Timestamp,
    grain: Float,
) -> GenericResult<[Expr; 3]> {
    let mut scheduling = Vec::new();
    let mut cost = Vec::new();
    let mut stability = Vec::new();

    // inclusion rewards are normalized below one so they never trade against
    // scheduling a whole meeting
    let inclusion_total: Float = meetings
        .iter()
        .filter_map(|vars| snapshot.meeting(vars.id))
        .flat_map(|meeting| meeting.optional_attendees.iter())
        .map(|oa| (oa.priority as Float).abs())
        .sum();
    let inclusion_norm = 1. / (1. + inclusion_total);

    for vars in meetings {
        let meeting = snapshot
            .meeting(vars.id)
            .ok_or_else(|| format!("unknown meeting in problem set: {}", vars.id))?;
        let event_mask = masks
            .get(&vars.id)
            .ok_or_else(|| format!("meeting {} has no compiled mask", vars.id))?;

        scheduling.push(Expr::iff(
            Expr::Var(vars.exist),
            Expr::Num(2. * meeting.priority as Float),
            Expr::Num(0.),
        ));
        if vars.draft_slot.is_some() {
            scheduling.push(Expr::iff(
                Expr::Var(vars.exist),
                Expr::Num(2. * DRAFT_BONUS),
                Expr::Num(0.),
            ));
        }

        let soft = event_mask
            .required
            .ifneeded
            .plus(&event_mask.required.sooner)
            .rebase(basetime, grain)
            .discretize_slopes();
        let penalty = symbolic_cost(&soft, vars.start, |line| finite_line_expr(line, vars.start));
        cost.push(Expr::iff(
            Expr::Var(vars.exist),
            Expr::Mul(-1., Box::new(penalty)),
            Expr::Num(0.),
        ));

        for (oa, &(user, include)) in meeting.optional_attendees.iter().zip(vars.includes.iter()) {
            scheduling.push(Expr::Mul(
                inclusion_norm,
                Box::new(Expr::iff(
                    Expr::Var(include),
                    Expr::Num(oa.priority as Float),
                    Expr::Num(0.),
                )),
            ));

            if let Some(surface) = event_mask.optional.get(&user) {
                let binned = surface.rebase(basetime, grain).bin_max();
                let penalty =
                    symbolic_cost(&binned, vars.start, |line| finite_line_expr(line, vars.start));
                cost.push(Expr::iff(
                    Expr::Var(include),
                    Expr::Mul(-1., Box::new(penalty)),
                    Expr::Num(0.),
                ));
            }
        }

        if let Some(draft_slot) = vars.draft_slot {
            stability.push(Expr::iff(
                Expr::And(vec![
                    Expr::Var(vars.exist),
                    Expr::eq(Expr::Var(vars.start), Expr::Num(draft_slot as Float)),
                ]),
                Expr::Num(DRAFT_BONUS),
                Expr::Num(0.),
            ));
        }
    }

    Ok([Expr::Add(scheduling), Expr::Add(cost), Expr::Add(stability)])
}
