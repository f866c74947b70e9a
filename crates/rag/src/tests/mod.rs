//! Pipeline tests against in-memory stores and a scripted model.

pub(crate) mod doubles;
