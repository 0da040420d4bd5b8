use anyhow::Context;
use serde::{Deserialize, Serialize};

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

/// One entry of the account's call log, as reported by Twilio.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CallSummary {
    pub sid: String,
    pub status: String,
    pub duration: Option<String>,
    #[serde(rename(serialize = "startTime"))]
    pub start_time: Option<String>,
    #[serde(rename(serialize = "endTime"))]
    pub end_time: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallPage {
    calls: Vec<CallSummary>,
}

/// Read-only client for the Twilio REST call log.
pub struct TwilioCalls {
    account_sid: String,
    auth_token: String,
    client: reqwest::Client,
}

impl TwilioCalls {
    pub fn new(account_sid: String, auth_token: String) -> Self {
        Self {
            account_sid,
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    /// `None` unless both the account SID and auth token are set.
    pub fn from_credentials(account_sid: &str, auth_token: &str) -> Option<Self> {
        if account_sid.is_empty() || auth_token.is_empty() {
            return None;
        }
        Some(Self::new(account_sid.to_string(), auth_token.to_string()))
    }

    /// Most recent calls first.
    pub async fn recent_calls(&self, limit: u32) -> anyhow::Result<Vec<CallSummary>> {
        let url = format!("{TWILIO_API}/Accounts/{}/Calls.json", self.account_sid);

        let page: CallPage = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .query(&[("PageSize", limit)])
            .send()
            .await
            .context("failed to fetch Twilio call log")?
            .error_for_status()
            .context("Twilio API returned error")?
            .json()
            .await
            .context("failed to parse Twilio call log")?;

        Ok(page.calls)
    }
}
