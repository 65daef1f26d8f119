pub mod audit_service;
pub mod chat_link;
pub mod completion_service;
pub mod error;
pub mod hooks;
pub mod interaction_service;
pub mod job_service;
pub mod job_writer;
pub mod notification_service;
pub mod offer_service;
pub mod status;

#[cfg(test)]
pub mod test_support;
