//! Read-only listings for owners and the platform admin.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{AccessFeedEntry, AccountError, AccountService, CompanyProfile, UserProfile};
use crate::repositories::{AccessLogRepository, CompanyRepository, UserRepository};

impl AccountService {
    pub async fn owner_list_users(&self, company_id: Uuid) -> Result<Vec<UserProfile>, AccountError> {
        Ok(UserRepository::new(&self.db)
            .list_by_company(company_id)
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    pub async fn master_list_users(&self) -> Result<Vec<UserProfile>, AccountError> {
        Ok(UserRepository::new(&self.db)
            .list_all()
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    pub async fn master_list_companies(&self) -> Result<Vec<CompanyProfile>, AccountError> {
        Ok(CompanyRepository::new(&self.db)
            .list()
            .await?
            .into_iter()
            .map(CompanyProfile::from)
            .collect())
    }

    /// Every recorded login across the platform, newest first.
    pub async fn master_access_feed(&self) -> Result<Vec<AccessFeedEntry>, AccountError> {
        let users: HashMap<Uuid, _> = UserRepository::new(&self.db)
            .list_all()
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let feed = AccessLogRepository::new(&self.db)
            .list_all()
            .await?
            .into_iter()
            .filter_map(|log| {
                let user = users.get(&log.user_id)?;
                Some(AccessFeedEntry {
                    user_id: user.id,
                    user_name: user.name.clone(),
                    user_email: user.email.clone(),
                    company_id: user.company_id,
                    timestamp: log.timestamp.with_timezone(&Utc),
                    user_agent: log.user_agent,
                    ip: log.ip,
                })
            })
            .collect();

        Ok(feed)
    }
}
