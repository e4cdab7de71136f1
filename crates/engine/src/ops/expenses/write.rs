//! Expense state changes.
//!
//! Each submodule implements one operation family; all of them run inside
//! `with_tx!` and go through the optimistic version check, so a
//! transition either fully applies with its side effects or fails with no
//! state change.

mod annul;
mod create;
mod decision;
mod transition;
mod update;
