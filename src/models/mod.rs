pub mod alert;
pub mod location_alert;
