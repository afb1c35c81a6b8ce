use rusqlite::Connection;

/// Initialize the license database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Licenses (one per purchase or admin grant)
        -- expires_at is fixed at creation and never extended
        CREATE TABLE IF NOT EXISTS licenses (
            id TEXT PRIMARY KEY,
            source_ref TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            active_device TEXT,
            legal_accepted_at INTEGER
        );

        -- Devices that have activated a license (membership is permanent)
        CREATE TABLE IF NOT EXISTS license_devices (
            license_id TEXT NOT NULL REFERENCES licenses(id) ON DELETE CASCADE,
            device_id TEXT NOT NULL,
            registered_at INTEGER NOT NULL,
            last_activated_at INTEGER NOT NULL,
            PRIMARY KEY (license_id, device_id)
        );
        CREATE INDEX IF NOT EXISTS idx_license_devices_license ON license_devices(license_id);
        "#,
    )
}
