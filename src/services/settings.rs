use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use tracing::{info, warn};

use crate::entities::{prelude::*, site_setting};
use crate::error::AppResult;

/// Keys stored in `site_settings`. Anything else in the table is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
    SiteName,
    SiteDescription,
    ContactEmail,
    ContactPhone,
    ContactAddress,
    SocialInstagram,
    SocialFacebook,
    SocialTwitter,
    SocialLinkedin,
    SeoMetaTitle,
    SeoMetaDescription,
    SeoKeywords,
}

/// Every known setting; missing rows read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings(BTreeMap<SettingKey, String>);

impl SiteSettings {
    pub fn get(&self, key: SettingKey) -> &str {
        self.0.get(&key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    fn complete(mut self) -> Self {
        for key in SettingKey::iter() {
            self.0.entry(key).or_default();
        }
        self
    }
}

impl Serialize for SettingKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for SettingKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone)]
pub struct SettingsService {
    db: DatabaseConnection,
}

impl SettingsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_settings(&self) -> AppResult<SiteSettings> {
        let mut settings = SiteSettings::default();
        for row in SiteSetting::find().all(&self.db).await? {
            match row.key.parse::<SettingKey>() {
                Ok(key) => settings.set(key, row.value),
                Err(_) => warn!("Ignoring unknown site setting '{}'", row.key),
            }
        }
        Ok(settings.complete())
    }

    /// Upsert the given keys in a single statement.
    pub async fn save_settings(&self, values: Vec<(SettingKey, String)>) -> AppResult<SiteSettings> {
        if !values.is_empty() {
            let now = Utc::now();
            let count = values.len();
            let rows = values.into_iter().map(|(key, value)| site_setting::ActiveModel {
                key: Set(key.as_ref().to_string()),
                value: Set(value),
                updated_at: Set(now.into()),
            });

            SiteSetting::insert_many(rows)
                .on_conflict(
                    OnConflict::column(site_setting::Column::Key)
                        .update_columns([site_setting::Column::Value, site_setting::Column::UpdatedAt])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
            info!("Saved {} site settings", count);
        }

        self.get_settings().await
    }
}
