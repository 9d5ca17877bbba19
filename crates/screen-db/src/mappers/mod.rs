//! Model -> entity conversions
//!
//! Plain columns convert with `From`. Tables with a textual status column use
//! `TryFrom` so an unexpected value surfaces as a database error.

mod competition;
mod friendship;
mod invitation;
mod user;
