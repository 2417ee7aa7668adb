use std::fs;
use std::path::{Path, PathBuf};

// Nothing listens on port 1, so any database access fails fast
pub const DB_CREDENTIALS: &str = r#"
{
    "smbs": {"server": "127.0.0.1", "port": 1, "database": "SMBs", "username": "report", "password": "s3cret"},
    "debug_smbs": {"server": "127.0.0.1", "port": 1, "database": "DebugSMBs", "username": "report", "password": "s3cret"}
}
"#;

pub const RECIPIENTS: [&str; 3] = ["ops@example.com", "fleet@example.com", "cto@example.com"];

pub const REPORT_SETTINGS: &str = r#"
{
    "organizations": [{"name": "ZIM"}, {"name": "Samskip"}, {"name": "HMM"}],
    "timezone": "UTC",
    "chart_font": "/nonexistent/fonts/DejaVuSans.ttf"
}
"#;

pub struct Dirs {
    pub config: PathBuf,
    pub reports: PathBuf,
    pub outbox: PathBuf,
}

/// Writes a complete config directory under `root`, with mail going to an outbox directory
pub fn write_config(root: &Path) -> Dirs {
    let dirs = Dirs {
        config: root.join("config"),
        reports: root.join("reports"),
        outbox: root.join("outbox"),
    };
    fs::create_dir_all(&dirs.config).unwrap();
    fs::create_dir_all(&dirs.reports).unwrap();

    let email = serde_json::json!({
        "sender": "reports@example.com",
        "password": "app-password",
        "recipients": RECIPIENTS,
        "outbox_dir": dirs.outbox,
    });
    fs::write(dirs.config.join("db_credentials.json"), DB_CREDENTIALS).unwrap();
    fs::write(dirs.config.join("email_credentials.json"), email.to_string()).unwrap();
    fs::write(dirs.config.join("report.json"), REPORT_SETTINGS).unwrap();
    dirs
}

/// Messages written to the outbox so far, as raw text
pub fn outbox_messages(outbox: &Path) -> Vec<String> {
    match fs::read_dir(outbox) {
        Ok(entries) => entries
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "eml"))
            .map(|p| fs::read_to_string(p).unwrap())
            .collect(),
        Err(_) => vec![],
    }
}
