use cached::proc_macro::cached;
use config::{Config, File, FileFormat};
use futures_locks::RwLock;
use once_cell::sync::Lazy;
use serde::Deserialize;

static CONFIG_BUILDER: Lazy<RwLock<Config>> = Lazy::new(|| {
    RwLock::new({
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("../Redress.toml"),
            FileFormat::Toml,
        ));

        if std::path::Path::new("Redress.toml").exists() {
            builder = builder.add_source(File::new("Redress.toml", FileFormat::Toml));
        }

        builder.build().unwrap()
    })
});

#[derive(Deserialize, Debug, Clone)]
pub struct Database {
    pub mongodb: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Hosts {
    pub app: String,
    pub api: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiReview {
    /// Wallet addresses permitted to vote on reports
    pub reviewers: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Api {
    pub review: ApiReview,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PayoutTier {
    pub base: u64,
    pub recovered_percent: u64,
    pub cap: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FeaturesPayouts {
    pub high: PayoutTier,
    pub medium: PayoutTier,
    pub low: PayoutTier,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Features {
    pub payouts: FeaturesPayouts,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub database: Database,
    pub hosts: Hosts,
    pub api: Api,
    pub features: Features,
}

pub async fn init() {
    println!(
        ":: Redress Configuration ::\n\x1b[32m{:?}\x1b[0m",
        config().await
    );
}

pub async fn read() -> Config {
    CONFIG_BUILDER.read().await.clone()
}

#[cached(time = 30)]
pub async fn config() -> Settings {
    read().await.try_deserialize::<Settings>().unwrap()
}
