pub(crate) mod assignments;
pub(crate) mod companies;
pub(crate) mod exam_sets;
pub(crate) mod exams;
pub(crate) mod managers;
pub(crate) mod otp_codes;
pub(crate) mod questions;
pub(crate) mod results;
pub(crate) mod tokens;
pub(crate) mod users;
