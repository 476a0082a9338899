pub const INSERT_ALERT: &str = r#"
INSERT INTO alerts (alert_id, sender, message, "time", sim, filter_name, received_at)
VALUES ($1, $2, $3, $4, $5, $6, $7);
"#;

pub const INSERT_LOCATION_ALERT: &str = r#"
INSERT INTO location_alerts (alert_id, student_label, lat, lng, raw_message)
VALUES ($1, $2, $3, $4, $5);
"#;
