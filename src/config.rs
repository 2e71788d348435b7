use crate::models::ticker::TickerMap;

pub const DEFAULT_PROVIDER_URL: &str = "https://query1.finance.yahoo.com";

pub struct Config {
    pub provider_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub tickers: TickerMap,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            request_timeout_secs: 30,
            // Yahoo 会拒绝没有浏览器 UA 的请求
            user_agent: "Mozilla/5.0".to_string(),
            tickers: TickerMap::default(),
        }
    }

    pub fn with_provider_url(mut self, url: &str) -> Self {
        self.provider_url = url.to_string();
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, agent: &str) -> Self {
        self.user_agent = agent.to_string();
        self
    }

    pub fn with_tickers(mut self, tickers: TickerMap) -> Self {
        self.tickers = tickers;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
