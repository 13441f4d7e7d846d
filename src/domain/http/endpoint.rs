use reqwest::Method;

/// REST endpoints of the garage backend used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEndpoint {
    Webhook,
    GarageSectors,
    Revenue,
    MonitoringDashboard,
    ActuatorHealth,
    MonitoringHealth,
}

impl ApiEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Webhook => "/webhook",
            Self::GarageSectors => "/garage/sectors",
            Self::Revenue => "/revenue",
            Self::MonitoringDashboard => "/monitoring/dashboard",
            Self::ActuatorHealth => "/actuator/health",
            Self::MonitoringHealth => "/monitoring/health",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::Webhook | Self::Revenue => Method::POST,
            _ => Method::GET,
        }
    }

    /// Joins the endpoint path onto `base_url`, tolerating a trailing slash on the base.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        assert_eq!(ApiEndpoint::Webhook.url("http://localhost:3003/api/"), "http://localhost:3003/api/webhook");
        assert_eq!(ApiEndpoint::GarageSectors.url("http://localhost:3003/api"), "http://localhost:3003/api/garage/sectors");
    }

    #[test]
    fn test_methods() {
        assert_eq!(ApiEndpoint::Webhook.method(), Method::POST);
        assert_eq!(ApiEndpoint::Revenue.method(), Method::POST);
        assert_eq!(ApiEndpoint::ActuatorHealth.method(), Method::GET);
        assert_eq!(ApiEndpoint::MonitoringDashboard.method(), Method::GET);
    }
}
