use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;

/// Load a configuration tree from `configuration.*` and the environment.
///
/// Environment keys use `prefix` and `__` as the nesting separator, so
/// `APP__GATEWAY__MERCHANT_ID` populates `gateway.merchant_id`. A `.env`
/// file in the working directory is read first when present.
pub fn load<T: DeserializeOwned>(prefix: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let config = Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(
            Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
