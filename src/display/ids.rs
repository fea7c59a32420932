//! Element ids the page controllers expect to find

// Dashboard metric slots
pub const ACTIVE_PROJECTS: &str = "activeProjectsValue";
pub const IN_PROGRESS_TARGETS: &str = "inProgressTargetsValue";
pub const VIOLATIONS: &str = "violationsValue";
pub const BIRTHDAYS: &str = "birthdaysValue";
pub const RECENT_ACTIVITIES: &str = "recentActivitiesList";

// Dashboard chrome
pub const WELCOME_TITLE: &str = "welcomeTitle";
pub const AVATAR_CIRCLE: &str = "avatarCircle";
pub const VIEW_PROJECTS_BUTTON: &str = "viewProjectsBtn";
pub const VIEW_TARGETS_BUTTON: &str = "viewTargetsBtn";
pub const FEATURES_GRID: &str = "featuresGrid";
pub const QUICK_LINKS: &str = "quickLinksList";

// Sidebar
pub const SIDEBAR: &str = "sidebar";
pub const SIDEBAR_NAV: &str = "sidebarNav";
pub const SIDEBAR_TOGGLE: &str = "sidebarToggle";
pub const SIDEBAR_BACKDROP: &str = "sidebarBackdrop";
pub const SIDEBAR_LOGOUT: &str = "sidebarLogout";
pub const ROOT: &str = "html";
pub const BODY: &str = "body";

// Login page
pub const AUTH_LOADING: &str = "authLoading";
pub const OVERLAY_CONTINUE: &str = "overlayContinue";
pub const LOGIN_FORM: &str = "loginForm";
pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const TOGGLE_PASSWORD: &str = "togglePassword";
pub const ERROR_MESSAGE: &str = "errorMessage";
pub const LOGIN_BUTTON: &str = "loginBtn";
pub const LOGIN_BUTTON_TEXT: &str = "loginBtnText";
pub const LOGIN_BUTTON_SPINNER: &str = "loginBtnSpinner";
pub const YEAR: &str = "year";

/// Id of the live value slot inside a feature card
pub fn feature_value(title: &str) -> String {
    format!("feature-value:{}", title)
}

/// Id of the "View Details" button inside a feature card
pub fn feature_link(title: &str) -> String {
    format!("feature-link:{}", title)
}

/// Id of a sidebar navigation entry
pub fn nav_item(key: &str) -> String {
    format!("nav:{}", key)
}

/// Every static element of the dashboard page
pub fn dashboard_page() -> Vec<&'static str> {
    vec![
        ACTIVE_PROJECTS,
        IN_PROGRESS_TARGETS,
        VIOLATIONS,
        BIRTHDAYS,
        RECENT_ACTIVITIES,
        WELCOME_TITLE,
        AVATAR_CIRCLE,
        VIEW_PROJECTS_BUTTON,
        VIEW_TARGETS_BUTTON,
        FEATURES_GRID,
        QUICK_LINKS,
        SIDEBAR,
        SIDEBAR_NAV,
        SIDEBAR_TOGGLE,
        SIDEBAR_BACKDROP,
        SIDEBAR_LOGOUT,
        ROOT,
        BODY,
    ]
}

/// Every static element of the login page
pub fn login_page() -> Vec<&'static str> {
    vec![
        AUTH_LOADING,
        OVERLAY_CONTINUE,
        LOGIN_FORM,
        EMAIL,
        PASSWORD,
        TOGGLE_PASSWORD,
        ERROR_MESSAGE,
        LOGIN_BUTTON,
        LOGIN_BUTTON_TEXT,
        LOGIN_BUTTON_SPINNER,
        YEAR,
        ROOT,
        BODY,
    ]
}
