pub mod catalog;
pub mod document_service;
pub mod mailer;
pub mod storage;
