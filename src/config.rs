use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the remote recommendation service
    #[serde(default = "default_recommender_url")]
    pub recommender_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of results requested by the default (popularity) strategy
    #[serde(default = "default_default_top_k")]
    pub default_top_k: u32,

    /// Number of results requested by the demographic strategy
    #[serde(default = "default_demographic_top_k")]
    pub demographic_top_k: u32,

    /// Number of results requested by the curated strategy
    #[serde(default = "default_curated_top_k")]
    pub curated_top_k: u32,

    /// Initial lower age bound of the demographic filter
    #[serde(default = "default_min_age")]
    pub default_min_age: u32,

    /// Initial upper age bound of the demographic filter
    #[serde(default = "default_max_age")]
    pub default_max_age: u32,
}

fn default_recommender_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_default_top_k() -> u32 {
    5
}

fn default_demographic_top_k() -> u32 {
    10
}

fn default_curated_top_k() -> u32 {
    5
}

fn default_min_age() -> u32 {
    18
}

fn default_max_age() -> u32 {
    35
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit key/value pairs (keys in env-var form)
    pub fn from_pairs<I>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(pairs)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recommender_url: default_recommender_url(),
            host: default_host(),
            port: default_port(),
            default_top_k: default_default_top_k(),
            demographic_top_k: default_demographic_top_k(),
            curated_top_k: default_curated_top_k(),
            default_min_age: default_min_age(),
            default_max_age: default_max_age(),
        }
    }
}
