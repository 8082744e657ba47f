// src/fetch/portal.rs
use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::PortalConfig;
use crate::process::extract::has_table_body;

/// HTTP session against the enrollment portal.
pub struct PortalClient {
    client: Client,
    base: Url,
    cfg: PortalConfig,
}

impl PortalClient {
    pub fn new(cfg: &PortalConfig) -> Result<Self> {
        let base = Url::parse(&cfg.base_url)
            .with_context(|| format!("parsing portal base URL {}", cfg.base_url))?;

        let mut headers = header::HeaderMap::new();
        if let Some(cookie) = &cfg.session_cookie {
            let value = header::HeaderValue::from_str(cookie)
                .context("session cookie is not a valid header value")?;
            headers.insert(header::COOKIE, value);
        }

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout())
            .default_headers(headers)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base,
            cfg: cfg.clone(),
        })
    }

    pub fn report_url(&self) -> Result<Url> {
        let path = self
            .cfg
            .report_path
            .as_deref()
            .ok_or_else(|| anyhow!("portal.report_path is not configured"))?;
        self.base
            .join(path)
            .with_context(|| format!("joining report path {}", path))
    }

    /// Submit the login form when both a login path and credentials are configured.
    pub async fn login(&self) -> Result<()> {
        let (Some(path), Some((email, password))) =
            (self.cfg.login_path.as_deref(), self.cfg.credentials())
        else {
            debug!("no login form configured; relying on session cookie");
            return Ok(());
        };

        let url = self
            .base
            .join(path)
            .with_context(|| format!("joining login path {}", path))?;
        info!(url = %url, "logging in");
        self.client
            .post(url.clone())
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .with_context(|| format!("POST {}", url))?
            .error_for_status()?;
        Ok(())
    }

    /// Log in if configured, then fetch the report page until its table has loaded.
    pub async fn fetch_report(&self) -> Result<String> {
        self.login().await?;
        let url = self.report_url()?;
        info!(url = %url, "fetching report");
        fetch_with_retries(&self.client, &url, self.cfg.max_retries, self.cfg.retry_delay()).await
    }
}

/// GET `url` until the body contains a table body, at most `max_retries` times.
pub async fn fetch_with_retries(
    client: &Client,
    url: &Url,
    max_retries: usize,
    delay: Duration,
) -> Result<String> {
    let mut attempt = 0;
    loop {
        attempt += 1;

        let failure = match client.get(url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(html) if has_table_body(&html) => {
                    debug!(attempt, bytes = html.len(), "report page loaded");
                    return Ok(html);
                }
                Ok(_) => anyhow!("report table not loaded yet"),
                Err(e) => e.into(),
            },
            Ok(resp) => anyhow!("HTTP error: {}", resp.status()),
            Err(e) => e.into(),
        };

        if attempt >= max_retries {
            return Err(failure.context(format!("fetching {} failed after {} attempts", url, attempt)));
        }
        warn!(attempt, error = %failure, "report fetch failed; retrying");
        sleep(delay).await;
    }
}
