use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dashboard preferences persisted under the `settings` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolSettings {
    pub school_name: String,
    pub academic_year: String,
    pub notifications: bool,
    pub auto_backup: bool,
    pub last_updated: Option<String>,
}

impl Default for SchoolSettings {
    fn default() -> Self {
        Self {
            school_name: "Delhi Public School".to_string(),
            academic_year: "2024-2025".to_string(),
            notifications: true,
            auto_backup: true,
            last_updated: None,
        }
    }
}

impl SchoolSettings {
    /// Applies the known keys of a partial update. Unknown keys are ignored;
    /// a known key with the wrong JSON type is an error.
    pub fn merge_patch(&mut self, patch: &Value) -> Result<(), String> {
        let Some(obj) = patch.as_object() else {
            return Err("settings patch must be an object".to_string());
        };
        for (k, v) in obj {
            match k.as_str() {
                "schoolName" => self.school_name = expect_str(k, v)?,
                "academicYear" => self.academic_year = expect_str(k, v)?,
                "notifications" => self.notifications = expect_bool(k, v)?,
                "autoBackup" => self.auto_backup = expect_bool(k, v)?,
                _ => {}
            }
        }
        Ok(())
    }
}

fn expect_str(key: &str, v: &Value) -> Result<String, String> {
    v.as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| format!("{} must be a string", key))
}

fn expect_bool(key: &str, v: &Value) -> Result<bool, String> {
    v.as_bool().ok_or_else(|| format!("{} must be a boolean", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_updates_known_keys_only() {
        let mut s = SchoolSettings::default();
        s.merge_patch(&json!({ "schoolName": " Riverside High ", "autoBackup": false, "theme": "dark" }))
            .expect("patch");
        assert_eq!(s.school_name, "Riverside High");
        assert!(!s.auto_backup);
        assert!(s.notifications);
        assert_eq!(s.academic_year, "2024-2025");
    }

    #[test]
    fn patch_rejects_wrong_types() {
        let mut s = SchoolSettings::default();
        let err = s.merge_patch(&json!({ "notifications": "yes" })).expect_err("bad type");
        assert!(err.contains("notifications"));
        assert!(s.merge_patch(&json!([1, 2])).is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: SchoolSettings =
            serde_json::from_value(json!({ "schoolName": "X" })).expect("deserialize");
        assert_eq!(s.school_name, "X");
        assert_eq!(s.academic_year, "2024-2025");
    }
}
