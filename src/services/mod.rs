pub mod chart;
pub mod session_store;
pub mod validation;

pub use chart::{Bar, FacultyLink, RequirementStatus, ResultsView};
pub use session_store::SessionStore;
pub use validation::RegistrationForm;
