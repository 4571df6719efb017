pub mod certificate;
pub mod course;
pub mod job;
pub mod learner;
