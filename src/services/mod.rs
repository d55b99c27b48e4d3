pub(crate) mod otp;
pub(crate) mod scoring;
pub(crate) mod sms;
pub(crate) mod storage;
