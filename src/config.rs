/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the metrics endpoint listens on
    pub metrics_port: u16,
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
    /// Self-driving demo sessions started at boot
    pub demo_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            metrics_port: 9090,
            max_sessions: 256,
            demo_sessions: 1,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("METRICS_PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.metrics_port = parsed;
                } else {
                    tracing::warn!("METRICS_PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid METRICS_PORT '{}', using default", port);
            }
        }

        if let Ok(max_sessions) = std::env::var("MAX_SESSIONS") {
            if let Ok(parsed) = max_sessions.parse::<usize>() {
                if parsed > 0 && parsed <= 100_000 {
                    config.max_sessions = parsed;
                } else {
                    tracing::warn!("MAX_SESSIONS must be 1-100000, using default");
                }
            } else {
                tracing::warn!("Invalid MAX_SESSIONS '{}', using default", max_sessions);
            }
        }

        if let Ok(demo) = std::env::var("DEMO_SESSIONS") {
            if let Ok(parsed) = demo.parse::<usize>() {
                if parsed <= 1000 {
                    config.demo_sessions = parsed;
                } else {
                    tracing::warn!("DEMO_SESSIONS must be <= 1000, using default");
                }
            } else {
                tracing::warn!("Invalid DEMO_SESSIONS '{}', using default", demo);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.metrics_port == 0 {
            return Err("metrics_port cannot be 0".to_string());
        }
        if self.max_sessions == 0 {
            return Err("max_sessions must be at least 1".to_string());
        }
        if self.demo_sessions > self.max_sessions {
            return Err("demo_sessions cannot exceed max_sessions".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.max_sessions, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default() {
        let config = ServerConfig::load_or_default();
        assert!(config.metrics_port > 0);
        assert!(config.max_sessions > 0);
    }

    #[test]
    fn test_validate_rejects_zero_sessions() {
        let config = ServerConfig {
            max_sessions: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_excess_demo_sessions() {
        let config = ServerConfig {
            max_sessions: 2,
            demo_sessions: 5,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
