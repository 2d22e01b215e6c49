/// Where the mock's stub server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub host: String,
    /// 0 picks a free ephemeral port on start.
    pub port: u16,
}

impl MockConfig {
    pub fn new() -> MockConfig {
        MockConfig::default()
    }

    pub fn with_port(mut self, port: u16) -> MockConfig {
        self.port = port;
        self
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        MockConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        }
    }
}
