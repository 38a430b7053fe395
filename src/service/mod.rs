pub mod generation_service;
pub mod session_service;
pub mod status_service;
pub mod templates;
