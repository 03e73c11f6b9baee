//! Pure input validation and normalization.
//!
//! Runs before any store access and has no side effects. Validators collect
//! every violation they find rather than stopping at the first, so one
//! rejected request tells the caller about all of its problems at once.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::Role;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_NAME_LEN: usize = 255;

/// Accumulated validation failures for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.violations.join("; "))
    }
}

impl std::error::Error for ValidationError {}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("Invalid regex pattern defined in code")
    })
}

/// Trim and lowercase a natural key (username or waypoint-set name). This is
/// the only place normalization happens; the store receives keys as-is.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalized registration input, produced only when every rule passes.
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub roles: Vec<Role>,
}

/// Normalized account update. `password` is `None` when the caller keeps the
/// existing credential.
#[derive(Debug, Clone)]
pub struct AccountUpdateDraft {
    pub nickname: String,
    pub roles: Vec<Role>,
    pub password: Option<String>,
}

/// One waypoint entry as submitted, prior to validation.
#[derive(Debug, Clone)]
pub struct WaypointDraft {
    pub seq_order: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: i32,
    pub clue: String,
    pub hints: Vec<String>,
    pub image_subject: String,
}

/// A fully validated waypoint set, strings trimmed, key normalized.
#[derive(Debug, Clone)]
pub struct WaypointSetDraft {
    pub name: String,
    pub description: String,
    pub waypoints: Vec<WaypointDraft>,
}

pub fn validate_registration(
    username: &str,
    password: &str,
    nickname: &str,
    roles: &[String],
) -> Result<RegistrationDraft, ValidationError> {
    let mut violations = Vec::new();

    let username = check_username(username, &mut violations);
    check_password(password, &mut violations);
    let nickname = check_nickname(nickname, &mut violations);
    let roles = check_roles(roles, &mut violations);

    if violations.is_empty() {
        Ok(RegistrationDraft {
            username,
            password: password.to_string(),
            nickname,
            roles,
        })
    } else {
        Err(ValidationError { violations })
    }
}

pub fn validate_account_update(
    password: Option<&str>,
    nickname: &str,
    roles: &[String],
) -> Result<AccountUpdateDraft, ValidationError> {
    let mut violations = Vec::new();

    if let Some(password) = password {
        check_password(password, &mut violations);
    }
    let nickname = check_nickname(nickname, &mut violations);
    let roles = check_roles(roles, &mut violations);

    if violations.is_empty() {
        Ok(AccountUpdateDraft {
            nickname,
            roles,
            password: password.map(str::to_string),
        })
    } else {
        Err(ValidationError { violations })
    }
}

pub fn validate_waypoint_set(
    name: &str,
    description: &str,
    waypoints: &[WaypointDraft],
) -> Result<WaypointSetDraft, ValidationError> {
    let mut violations = Vec::new();

    let name = normalize_key(name);
    if name.is_empty() {
        violations.push("waypoint_name must not be empty".to_string());
    } else if name.chars().count() > MAX_NAME_LEN {
        violations.push(format!(
            "waypoint_name must be at most {MAX_NAME_LEN} characters"
        ));
    }

    let description = description.trim().to_string();
    if description.is_empty() {
        violations.push("description must not be empty".to_string());
    }

    if waypoints.is_empty() {
        violations.push("waypoints must contain at least one entry".to_string());
    }

    let waypoints = waypoints
        .iter()
        .enumerate()
        .map(|(index, entry)| check_waypoint(index, entry, &mut violations))
        .collect();

    if violations.is_empty() {
        Ok(WaypointSetDraft {
            name,
            description,
            waypoints,
        })
    } else {
        Err(ValidationError { violations })
    }
}

fn check_username(raw: &str, violations: &mut Vec<String>) -> String {
    let normalized = normalize_key(raw);
    if !email_regex().is_match(&normalized) {
        violations.push("username must be a valid email address".to_string());
    }
    normalized
}

fn check_password(password: &str, violations: &mut Vec<String>) {
    if password.len() < MIN_PASSWORD_LEN {
        violations.push(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        violations.push("password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("password must contain at least one digit".to_string());
    }
}

fn check_nickname(raw: &str, violations: &mut Vec<String>) -> String {
    let nickname = raw.trim().to_string();
    if nickname.is_empty() {
        violations.push("nickname must not be empty".to_string());
    }
    nickname
}

fn check_roles(raw: &[String], violations: &mut Vec<String>) -> Vec<Role> {
    if raw.is_empty() {
        violations.push("roles must contain at least one role".to_string());
    }

    let mut roles = Vec::with_capacity(raw.len());
    for tag in raw {
        match Role::from_str(tag) {
            Ok(role) => {
                if !roles.contains(&role) {
                    roles.push(role);
                }
            }
            Err(()) => violations.push(format!(
                "unknown role '{tag}': expected one of admin, player, viewer"
            )),
        }
    }
    roles
}

fn check_waypoint(index: usize, entry: &WaypointDraft, violations: &mut Vec<String>) -> WaypointDraft {
    if entry.seq_order <= 0 {
        violations.push(format!("waypoints[{index}].seq must be a positive integer"));
    }
    if !(-90.0..=90.0).contains(&entry.latitude) {
        violations.push(format!(
            "waypoints[{index}].lat must be between -90 and 90"
        ));
    }
    if !(-180.0..=180.0).contains(&entry.longitude) {
        violations.push(format!(
            "waypoints[{index}].long must be between -180 and 180"
        ));
    }
    if entry.radius <= 0 {
        violations.push(format!(
            "waypoints[{index}].radius must be a positive integer"
        ));
    }

    let clue = entry.clue.trim().to_string();
    if clue.is_empty() {
        violations.push(format!("waypoints[{index}].clue must not be empty"));
    }

    let hints: Vec<String> = entry.hints.iter().map(|h| h.trim().to_string()).collect();
    if hints.iter().any(String::is_empty) {
        violations.push(format!("waypoints[{index}].hints must not contain empty entries"));
    }

    let image_subject = entry.image_subject.trim().to_string();
    if image_subject.is_empty() {
        violations.push(format!("waypoints[{index}].image_subject must not be empty"));
    }

    WaypointDraft {
        clue,
        hints,
        image_subject,
        ..entry.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_waypoint() -> WaypointDraft {
        WaypointDraft {
            seq_order: 1,
            latitude: 40.7,
            longitude: -74.0,
            radius: 50,
            clue: "find the statue".to_string(),
            hints: vec!["look up".to_string()],
            image_subject: "statue".to_string(),
        }
    }

    #[test]
    fn registration_normalizes_username() {
        let draft = validate_registration(
            "  Alice@Example.COM ",
            "password123",
            "Alice",
            &["player".to_string()],
        )
        .unwrap();
        assert_eq!(draft.username, "alice@example.com");
        assert_eq!(draft.roles, vec![Role::Player]);
    }

    #[test]
    fn registration_accumulates_all_violations() {
        let err = validate_registration("not-an-email", "short", " ", &[]).unwrap_err();
        // bad email, too short, no digit, empty nickname, empty roles
        assert_eq!(err.violations.len(), 5);
    }

    #[test]
    fn password_requires_letter_and_digit() {
        let err =
            validate_registration("a@b.com", "12345678", "A", &["player".to_string()]).unwrap_err();
        assert_eq!(err.violations, vec!["password must contain at least one letter"]);

        let err =
            validate_registration("a@b.com", "abcdefgh", "A", &["player".to_string()]).unwrap_err();
        assert_eq!(err.violations, vec!["password must contain at least one digit"]);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = validate_registration(
            "a@b.com",
            "password123",
            "A",
            &["player".to_string(), "wizard".to_string()],
        )
        .unwrap_err();
        assert!(err.violations[0].contains("wizard"));
    }

    #[test]
    fn update_password_is_optional() {
        let draft = validate_account_update(None, "Alice", &["admin".to_string()]).unwrap();
        assert!(draft.password.is_none());

        let err = validate_account_update(Some("weak"), "Alice", &["admin".to_string()])
            .unwrap_err();
        assert!(!err.violations.is_empty());
    }

    #[test]
    fn waypoint_set_collects_violations_across_entries() {
        let mut bad = valid_waypoint();
        bad.latitude = 123.0;
        bad.clue = "  ".to_string();

        let err = validate_waypoint_set("", "", &[bad]).unwrap_err();
        let joined = err.to_string();
        assert!(joined.contains("waypoint_name must not be empty"));
        assert!(joined.contains("description must not be empty"));
        assert!(joined.contains("waypoints[0].lat"));
        assert!(joined.contains("waypoints[0].clue"));
    }

    #[test]
    fn empty_waypoint_list_is_a_violation() {
        let err = validate_waypoint_set("tour", "a walk", &[]).unwrap_err();
        assert_eq!(
            err.violations,
            vec!["waypoints must contain at least one entry"]
        );
    }

    #[test]
    fn valid_waypoint_set_passes_and_trims() {
        let mut entry = valid_waypoint();
        entry.image_subject = " statue ".to_string();

        let draft = validate_waypoint_set(" Tour ", " A walk ", &[entry]).unwrap();
        assert_eq!(draft.name, "tour");
        assert_eq!(draft.description, "A walk");
        assert_eq!(draft.waypoints[0].image_subject, "statue");
    }

    #[test]
    fn name_length_limit_counts_characters_not_bytes() {
        // 200 characters but 400 bytes; must pass a 255-character limit
        let multibyte = "ü".repeat(200);
        assert!(validate_waypoint_set(&multibyte, "d", &[valid_waypoint()]).is_ok());

        let too_long = "a".repeat(256);
        let err = validate_waypoint_set(&too_long, "d", &[valid_waypoint()]).unwrap_err();
        assert!(err.violations[0].contains("at most 255"));
    }

    #[test]
    fn boundary_coordinates_are_accepted() {
        let mut entry = valid_waypoint();
        entry.latitude = -90.0;
        entry.longitude = 180.0;
        assert!(validate_waypoint_set("edge", "limits", &[entry]).is_ok());
    }

    #[test]
    fn empty_hint_is_rejected_but_empty_hint_list_is_fine() {
        let mut entry = valid_waypoint();
        entry.hints = vec![];
        assert!(validate_waypoint_set("t", "d", &[entry.clone()]).is_ok());

        entry.hints = vec!["ok".to_string(), "  ".to_string()];
        let err = validate_waypoint_set("t", "d", &[entry]).unwrap_err();
        assert!(err.violations[0].contains("hints"));
    }
}
