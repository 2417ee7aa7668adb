pub mod smtp;
pub mod sqlserver;
pub mod telemetry;
pub mod tracking;

pub use smtp::{Email, InlineImage, Mailer};
pub use sqlserver::SqlServerSource;
pub use telemetry::TelemetrySource;
pub use tracking::EmailedDatesLog;
