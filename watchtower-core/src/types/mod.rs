mod appointment;
mod policy;
mod response;

pub use appointment::AppointmentId;
pub use policy::QueuePolicy;
pub use response::ResponseSpec;
