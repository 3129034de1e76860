pub mod notification;
pub mod payment;
pub mod questionnaire;
pub mod report;
pub mod subscription;
pub mod user;
