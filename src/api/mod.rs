pub(crate) mod assignments;
pub(crate) mod auth;
pub(crate) mod companies;
pub(crate) mod errors;
pub(crate) mod exam_sets;
pub(crate) mod exams;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod managers;
pub(crate) mod questions;
pub(crate) mod results;
pub(crate) mod router;
#[cfg(test)]
mod tests;
pub(crate) mod users;
pub(crate) mod validation;
