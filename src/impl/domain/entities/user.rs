/// Actions gated by the role/permission map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    RunPipeline,
    ViewReports,
    ExportReports,
    ModifyConfig,
    ViewLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Analyst,
    Viewer,
}

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => &[
                Permission::RunPipeline,
                Permission::ViewReports,
                Permission::ExportReports,
                Permission::ModifyConfig,
                Permission::ViewLogs,
            ],
            Role::Analyst => &[
                Permission::RunPipeline,
                Permission::ViewReports,
                Permission::ExportReports,
            ],
            Role::Viewer => &[Permission::ViewReports],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Analyst => "analyst",
            Role::Viewer => "viewer",
        }
    }
}

#[derive(Debug, Clone, serde_derive::Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_role() -> Role {
    Role::Viewer
}

fn default_status() -> String {
    "active".to_owned()
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn can(&self, action: Permission) -> bool {
        self.is_active() && self.role.permissions().contains(&action)
    }
}

/// Notification routing: active admins with an email address, in file order.
pub fn admin_recipients(users: &[User]) -> Vec<String> {
    users
        .iter()
        .filter(|u| u.is_active() && u.role == Role::Admin)
        .filter_map(|u| u.email.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, role: Role, status: &str) -> User {
        User {
            id: email.to_owned(),
            email: Some(email.to_owned()),
            role,
            status: status.to_owned(),
        }
    }

    #[test]
    fn inactive_users_have_no_permissions() {
        let u = user("a@example.com", Role::Admin, "suspended");
        assert!(!u.can(Permission::RunPipeline));
        assert!(!u.can(Permission::ViewReports));
    }

    #[test]
    fn viewer_cannot_run_pipeline() {
        let u = user("v@example.com", Role::Viewer, "active");
        assert!(u.can(Permission::ViewReports));
        assert!(!u.can(Permission::RunPipeline));
    }

    #[test]
    fn recipients_are_active_admins_only() {
        let users = vec![
            user("admin@example.com", Role::Admin, "active"),
            user("gone@example.com", Role::Admin, "disabled"),
            user("analyst@example.com", Role::Analyst, "active"),
        ];
        assert_eq!(admin_recipients(&users), vec!["admin@example.com"]);
    }
}
