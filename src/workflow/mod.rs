//! Pure transition core.
//!
//! Each workflow declares its transitions as data ([`TransitionRule`]) and
//! exposes deterministic, all-or-nothing transition functions over an
//! in-memory entity. Guard evaluation order is pinned: state first, then
//! permission, then argument guards; the entity is only mutated once every
//! guard has passed. The functions hold no state between calls, so they are
//! safe to invoke under whatever per-entity serialization the caller uses.

pub mod material_request;
pub mod stock_transfer;

use std::fmt::Display;

use crate::auth::{has_permission, Actor, Capability};
use crate::errors::WorkflowError;

/// One row of a workflow's transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule<S: 'static> {
    pub name: &'static str,
    pub from: &'static [S],
    pub to: S,
    pub capability: Capability,
}

/// Shared state and permission gate, evaluated in that order.
pub(crate) fn check<S>(rule: &TransitionRule<S>, current: S, actor: &Actor) -> Result<(), WorkflowError>
where
    S: Copy + PartialEq + Display,
{
    if !rule.from.contains(&current) {
        return Err(WorkflowError::InvalidTransition {
            transition: rule.name,
            current: current.to_string(),
        });
    }
    if !has_permission(actor.role, rule.capability) {
        return Err(WorkflowError::PermissionDenied {
            role: actor.role,
            capability: rule.capability,
        });
    }
    Ok(())
}

/// Derives the mainline progress ordering from a transition table: starting
/// at the initial status, repeatedly follow the first rule applicable to the
/// current tail whose target is not a failure exit. Hosts use this to render
/// step indicators; it is never consulted by the guards themselves.
pub(crate) fn progress_order<S>(initial: S, rules: &[TransitionRule<S>], exits: &[S]) -> Vec<S>
where
    S: Copy + PartialEq,
{
    let mut order = vec![initial];
    loop {
        let current = order[order.len() - 1];
        let next = rules.iter().find(|rule| {
            rule.from.contains(&current)
                && !exits.contains(&rule.to)
                && !order.contains(&rule.to)
        });
        match next {
            Some(rule) => order.push(rule.to),
            None => break,
        }
    }
    order
}
